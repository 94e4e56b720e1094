//! Command dispatch and handlers for the Kakeibo shell.

use dialoguer::{theme::ColorfulTheme, Confirm};
use strsim::levenshtein;
use uuid::Uuid;

use crate::cli::{output, CliError, CliMode};
use crate::engine::{FundKind, Mode, PlanReport};
use crate::errors::PlanError;
use crate::plan::PlanState;
use crate::storage::SessionStore;

const COMMANDS: [&str; 11] = [
    "source", "receive", "amount", "mode", "fund", "status", "done", "reset", "session", "help",
    "exit",
];

const SUGGESTION_DISTANCE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

/// Shared shell runtime state: the live plan plus the session store.
pub(crate) struct ShellContext {
    plan: PlanState,
    store: SessionStore,
    mode: CliMode,
}

impl ShellContext {
    pub(crate) fn new(mode: CliMode) -> Result<Self, PlanError> {
        Ok(Self {
            plan: PlanState::new(),
            store: SessionStore::new_default()?,
            mode,
        })
    }

    fn interactive(&self) -> bool {
        self.mode == CliMode::Interactive
    }

    /// Resolves a 1-based list position into a source id.
    fn source_id(&self, token: &str) -> Option<Uuid> {
        let index: usize = token.parse().ok()?;
        if index == 0 {
            return None;
        }
        self.plan.sources().get(index - 1).map(|source| source.id)
    }
}

pub(crate) fn dispatch(
    context: &mut ShellContext,
    tokens: &[String],
) -> Result<LoopControl, CliError> {
    let command = tokens[0].as_str();
    let args = &tokens[1..];

    match command {
        "source" => handle_source(context, args),
        "receive" => handle_receive(context, args),
        "amount" => handle_amount(context, args),
        "mode" => handle_mode(context, args),
        "fund" => handle_fund(context, args),
        "status" => render_status(context),
        "done" => handle_done(context),
        "reset" => return handle_reset(context),
        "session" => handle_session(context, args),
        "help" => print_help(),
        "exit" | "quit" => return Ok(LoopControl::Exit),
        unknown => report_unknown(unknown),
    }

    Ok(LoopControl::Continue)
}

fn handle_source(context: &mut ShellContext, args: &[String]) {
    match args {
        [action, rest @ ..] if action == "add" && !rest.is_empty() => {
            let name = rest.join(" ");
            context.plan.add_source(name.as_str());
            output::success(format!("Source '{}' added.", name));
        }
        [action, index] if action == "remove" => {
            let Some(id) = context.source_id(index) else {
                output::warning(format!("No source at position {}.", index));
                return;
            };
            match context.plan.remove_source(id) {
                Ok(removed) => output::success(format!("Source '{}' removed.", removed.name)),
                Err(err) => output::warning(err.to_string()),
            }
        }
        [action] if action == "list" => render_sources(context),
        _ => output::warning("Usage: source add <name> | source remove <n> | source list"),
    }
}

fn handle_receive(context: &mut ShellContext, args: &[String]) {
    let (index, flag) = match args {
        [index] => (index, None),
        [index, flag] if flag == "on" || flag == "off" => (index, Some(flag == "on")),
        _ => {
            output::warning("Usage: receive <n> [on|off]");
            return;
        }
    };
    let Some(id) = context.source_id(index) else {
        output::warning(format!("No source at position {}.", index));
        return;
    };
    let result = match flag {
        Some(received) => context.plan.set_received(id, received).map(|_| received),
        None => context.plan.toggle_received(id),
    };
    match result {
        Ok(received) => {
            let state = if received { "received" } else { "not received" };
            output::success(format!("Source {} marked {}.", index, state));
        }
        Err(err) => output::warning(err.to_string()),
    }
}

fn handle_amount(context: &mut ShellContext, args: &[String]) {
    let [index, text] = args else {
        output::warning("Usage: amount <n> <text>");
        return;
    };
    let Some(id) = context.source_id(index) else {
        output::warning(format!("No source at position {}.", index));
        return;
    };
    match context.plan.set_amount(id, text.as_str()) {
        Ok(()) => output::success(format!("Amount for source {} set to '{}'.", index, text)),
        Err(err) => output::warning(err.to_string()),
    }
}

fn handle_mode(context: &mut ShellContext, args: &[String]) {
    let mode = match args {
        [token] if token == "amount" => Mode::Amount,
        [token] if token == "percent" => Mode::Percent,
        _ => {
            output::warning("Usage: mode amount|percent");
            return;
        }
    };
    context.plan.set_mode(mode);
    output::success(format!(
        "Allocation fields are now read as {} values.",
        mode.label()
    ));
}

fn handle_fund(context: &mut ShellContext, args: &[String]) {
    let [key, text] = args else {
        output::warning("Usage: fund ef|sf|spending|fun <text>");
        return;
    };
    let Some(kind) = fund_kind(key) else {
        output::warning(format!(
            "Unknown fund '{}'. Expected ef, sf, spending, or fun.",
            key
        ));
        return;
    };
    if context.plan.report().stage2_locked() {
        output::warning(
            "Allocation is locked: mark at least one income source received with a positive amount first.",
        );
        return;
    }
    context.plan.set_fund(kind, text.as_str());
    output::success(format!("{} set to '{}'.", kind.label(), text));
}

fn handle_done(context: &mut ShellContext) {
    match context.plan.finalize() {
        Ok(snapshot) => {
            output::section("Finalized allocation");
            for kind in FundKind::ALL {
                println!("  {:<15} {:>12.2}", kind.label(), snapshot.amounts.get(kind));
            }
            println!("  {:<15} {:>12.2}", "Total", snapshot.amounts.total());
            output::success(format!(
                "Plan finalized at {} with income {:.2}.",
                snapshot.finalized_at.format("%Y-%m-%d %H:%M:%S UTC"),
                snapshot.total_income
            ));
        }
        Err(PlanError::NotFinalizable(details)) => {
            output::warning(format!("Cannot finalize: {}", details));
        }
        Err(err) => output::error(err.to_string()),
    }
}

fn handle_reset(context: &mut ShellContext) -> Result<LoopControl, CliError> {
    if context.interactive() {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Reset the whole plan? Added sources are kept, everything else clears.")
            .default(false)
            .interact()
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))?;
        if !confirmed {
            output::info("Reset cancelled.");
            return Ok(LoopControl::Continue);
        }
    }
    context.plan.reset();
    output::success("Plan reset.");
    Ok(LoopControl::Continue)
}

fn handle_session(context: &mut ShellContext, args: &[String]) {
    match args {
        [action, name] if action == "save" => match context.store.save(name, &context.plan) {
            Ok(path) => output::success(format!("Session saved to {}.", path.display())),
            Err(err) => output::error(err.to_string()),
        },
        [action, name] if action == "load" => match context.store.load(name) {
            Ok(plan) => {
                context.plan = plan;
                output::success(format!("Session '{}' loaded.", name));
            }
            Err(err) => output::error(err.to_string()),
        },
        [action] if action == "list" => match context.store.list() {
            Ok(names) if names.is_empty() => output::info("No saved sessions."),
            Ok(names) => {
                output::section("Saved sessions");
                for name in names {
                    println!("  {}", name);
                }
            }
            Err(err) => output::error(err.to_string()),
        },
        _ => output::warning("Usage: session save <name> | session load <name> | session list"),
    }
}

fn render_sources(context: &ShellContext) {
    output::section("Income sources");
    if context.plan.sources().is_empty() {
        output::info("No income sources defined.");
        return;
    }
    for (position, source) in context.plan.sources().iter().enumerate() {
        let mark = if source.received { "x" } else { " " };
        let amount = if source.amount.is_empty() {
            "-"
        } else {
            source.amount.as_str()
        };
        println!(" {:>2}. [{}] {:<20} {}", position + 1, mark, source.name, amount);
    }
}

fn render_status(context: &ShellContext) {
    let report = context.plan.report();

    render_sources(context);
    output::info(format!("Total income: {:.2}", report.total_income));
    for finding in &report.stage1_findings {
        output::warning(finding.to_string());
    }

    output::section(format!(
        "Allocation ({} mode)",
        context.plan.mode().label()
    ));
    if report.stage2_locked() {
        for finding in &report.stage2_findings {
            output::warning(finding.to_string());
        }
    } else {
        render_allocation(context, &report);
    }

    if let Some(snapshot) = context.plan.finalized() {
        output::section("Finalized allocation");
        for kind in FundKind::ALL {
            println!("  {:<15} {:>12.2}", kind.label(), snapshot.amounts.get(kind));
        }
        output::info(format!(
            "Finalized at {} ({} mode).",
            snapshot.finalized_at.format("%Y-%m-%d %H:%M:%S UTC"),
            snapshot.mode.label()
        ));
    }
}

fn render_allocation(context: &ShellContext, report: &PlanReport) {
    for kind in FundKind::ALL {
        let input = context.plan.funds().get(kind);
        let input = if input.is_empty() { "-" } else { input };
        println!(
            "  {:<15} {:>12.2}  (input: {})",
            kind.label(),
            report.funds_as_amount.get(kind),
            input
        );
    }
    output::info(format!(
        "Allocated: {:.2}  Remaining: {:.2}",
        report.allocated_total, report.remaining
    ));
    for finding in &report.stage2_findings {
        output::warning(finding.to_string());
    }
    if report.can_finalize {
        output::success("Allocation is valid. Run `done` to finalize.");
    }
}

fn fund_kind(key: &str) -> Option<FundKind> {
    FundKind::ALL
        .into_iter()
        .find(|kind| kind.key() == key.to_lowercase())
}

fn report_unknown(command: &str) {
    match suggest_command(command) {
        Some(suggestion) => output::warning(format!(
            "Unknown command '{}'. Did you mean '{}'?",
            command, suggestion
        )),
        None => output::warning(format!(
            "Unknown command '{}'. Type `help` for the command list.",
            command
        )),
    }
}

fn suggest_command(input: &str) -> Option<&'static str> {
    COMMANDS
        .iter()
        .map(|candidate| (levenshtein(input, candidate), *candidate))
        .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}

fn print_help() {
    output::section("Commands");
    println!("  source add <name>           add an income source");
    println!("  source remove <n>           remove the source at position n");
    println!("  source list                 list income sources");
    println!("  receive <n> [on|off]        toggle or set the received flag");
    println!("  amount <n> <text>           set the amount text for source n");
    println!("  mode amount|percent         switch fund field interpretation");
    println!("  fund ef|sf|spending|fun <text>  set a fund field");
    println!("  status                      show totals, allocations, and findings");
    println!("  done                        finalize the current allocation");
    println!("  reset                       clear amounts, flags, funds, and mode");
    println!("  session save|load <name>    persist or restore a session");
    println!("  session list                list saved sessions");
    println!("  exit                        leave the shell");
}
