use std::io::{self, BufRead};

use rustyline::{error::ReadlineError, DefaultEditor};
use shell_words::split;

use crate::cli::commands::{dispatch, LoopControl, ShellContext};
use crate::cli::output::info as output_info;
use crate::cli::{output, CliError};

/// Setting this environment variable switches the CLI into script mode:
/// commands are read line-by-line from stdin with no prompt or editor.
pub const SCRIPT_ENV: &str = "KAKEIBO_CLI_SCRIPT";

const PROMPT: &str = "kakeibo> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = DefaultEditor::new()?;
    output_info("Kakeibo budgeting shell. Type `help` for commands.");

    loop {
        let line = editor.readline(PROMPT);

        match line {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                editor.add_history_entry(trimmed).ok();

                match handle_line(context, trimmed)? {
                    LoopControl::Continue => {}
                    LoopControl::Exit => break,
                }
            }
            Err(ReadlineError::Interrupted) => {
                output_info("Interrupted. Type `exit` to quit.");
            }
            Err(ReadlineError::Eof) => {
                output_info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match handle_line(context, trimmed)? {
            LoopControl::Continue => {}
            LoopControl::Exit => break,
        }
    }
    Ok(())
}

fn handle_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CliError> {
    let tokens = match split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(format!("Could not parse command: {}", err));
            return Ok(LoopControl::Continue);
        }
    };
    if tokens.is_empty() {
        return Ok(LoopControl::Continue);
    }
    dispatch(context, &tokens)
}
