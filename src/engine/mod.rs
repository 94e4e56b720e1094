//! Pure allocation engine for the two-stage Kakeibo workflow.
//!
//! Stage 1 aggregates declared income from received sources; stage 2 converts
//! the four fund fields into absolute amounts under the active [`Mode`] and
//! validates the aggregate. Every function here is total: malformed numeric
//! text degrades to zero instead of signaling an error.

mod findings;

use serde::{Deserialize, Serialize};

use crate::plan::IncomeSource;

pub use findings::{join_findings, Finding};

/// Tolerance for floating-point accumulation in threshold comparisons.
///
/// Shared by the stage-2 checks so the amount and percent paths cannot drift.
pub const EPSILON: f64 = 0.0001;

/// Parses free-text numeric input, clamping failures and negatives to zero.
///
/// Blank, unparsable, and negative text all yield `0.0`. This is a deliberate
/// silent-clamp policy: entry fields accept anything, and validation flags
/// non-positive amounts separately instead of rejecting keystrokes.
pub fn parse_or_zero(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .map(|value| value.max(0.0))
        .unwrap_or(0.0)
}

/// Global interpretation of the four fund fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Fields are absolute currency amounts.
    #[default]
    Amount,
    /// Fields are percentages of total income.
    Percent,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Amount => "amount",
            Mode::Percent => "percent",
        }
    }
}

/// The four fixed allocation buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundKind {
    EmergencyFund,
    SinkingFund,
    Spending,
    Fun,
}

impl FundKind {
    pub const ALL: [FundKind; 4] = [
        FundKind::EmergencyFund,
        FundKind::SinkingFund,
        FundKind::Spending,
        FundKind::Fun,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FundKind::EmergencyFund => "Emergency fund",
            FundKind::SinkingFund => "Sinking fund",
            FundKind::Spending => "Spending fund",
            FundKind::Fun => "Fun fund",
        }
    }

    /// Short key used by the CLI and serialized field names.
    pub fn key(&self) -> &'static str {
        match self {
            FundKind::EmergencyFund => "ef",
            FundKind::SinkingFund => "sf",
            FundKind::Spending => "spending",
            FundKind::Fun => "fun",
        }
    }
}

/// Raw fund field text, one entry per bucket, parsed on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundInputs {
    #[serde(default)]
    pub ef: String,
    #[serde(default)]
    pub sf: String,
    #[serde(default)]
    pub spending: String,
    #[serde(default)]
    pub fun: String,
}

impl FundInputs {
    pub fn get(&self, kind: FundKind) -> &str {
        match kind {
            FundKind::EmergencyFund => &self.ef,
            FundKind::SinkingFund => &self.sf,
            FundKind::Spending => &self.spending,
            FundKind::Fun => &self.fun,
        }
    }

    pub fn set(&mut self, kind: FundKind, text: impl Into<String>) {
        let slot = match kind {
            FundKind::EmergencyFund => &mut self.ef,
            FundKind::SinkingFund => &mut self.sf,
            FundKind::Spending => &mut self.spending,
            FundKind::Fun => &mut self.fun,
        };
        *slot = text.into();
    }

    pub fn clear(&mut self) {
        *self = FundInputs::default();
    }

    /// Sum of the raw fields parsed as percentages, used by the percent-mode
    /// aggregate check. Works on the field text, not the converted amounts.
    pub fn raw_percent_total(&self) -> f64 {
        FundKind::ALL
            .iter()
            .map(|kind| parse_or_zero(self.get(*kind)))
            .sum()
    }
}

/// The four fund fields converted to absolute currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FundAmounts {
    pub ef: f64,
    pub sf: f64,
    pub spending: f64,
    pub fun: f64,
}

impl FundAmounts {
    pub fn get(&self, kind: FundKind) -> f64 {
        match kind {
            FundKind::EmergencyFund => self.ef,
            FundKind::SinkingFund => self.sf,
            FundKind::Spending => self.spending,
            FundKind::Fun => self.fun,
        }
    }

    pub fn total(&self) -> f64 {
        self.ef + self.sf + self.spending + self.fun
    }
}

/// Sums parsed amounts over sources marked received.
///
/// Non-positive and unparsable amounts contribute zero, so the result is
/// always non-negative. Stage-1 validity coincides with a positive total.
pub fn compute_total_income(sources: &[IncomeSource]) -> f64 {
    sources
        .iter()
        .filter(|source| source.received)
        .map(|source| parse_or_zero(&source.amount))
        .fold(0.0, |total, amount| total + amount)
}

/// Converts the four fund fields into absolute amounts under `mode`.
///
/// Amount mode is the clamped identity on the parsed fields; percent mode
/// scales each field against `total_income`. No per-field upper clamp is
/// applied: a single field may exceed 100% or exceed income, and only the
/// aggregate is validated by [`validate_stage2`].
pub fn convert_allocations(funds: &FundInputs, mode: Mode, total_income: f64) -> FundAmounts {
    let convert = |kind: FundKind| {
        let parsed = parse_or_zero(funds.get(kind));
        match mode {
            Mode::Amount => parsed,
            Mode::Percent => total_income * parsed / 100.0,
        }
    };
    FundAmounts {
        ef: convert(FundKind::EmergencyFund),
        sf: convert(FundKind::SinkingFund),
        spending: convert(FundKind::Spending),
        fun: convert(FundKind::Fun),
    }
}

/// Validates the income stage, collecting every applicable finding.
///
/// The list-level finding (nothing received with a positive amount) comes
/// first, followed by one finding per received source whose amount parses to
/// zero or less, in source order. An empty list coincides with
/// `compute_total_income(sources) > 0`.
pub fn validate_stage1(sources: &[IncomeSource]) -> Vec<Finding> {
    let mut findings = Vec::new();
    let any_positive = sources
        .iter()
        .any(|source| source.received && parse_or_zero(&source.amount) > 0.0);
    if !any_positive {
        findings.push(Finding::MissingReceivedIncome);
    }
    for source in sources {
        if source.received && parse_or_zero(&source.amount) <= 0.0 {
            findings.push(Finding::NonPositiveSourceAmount {
                source: source.name.clone(),
            });
        }
    }
    findings
}

/// Validates the allocation stage.
///
/// An invalid stage 1 locks stage 2 outright and skips the aggregate checks.
/// Amount mode compares the converted total against income; percent mode
/// compares the sum of the raw percent fields against 100. Both checks use
/// [`EPSILON`] as tolerance.
pub fn validate_stage2(
    stage1_valid: bool,
    mode: Mode,
    funds: &FundInputs,
    allocated_total: f64,
    total_income: f64,
) -> Vec<Finding> {
    if !stage1_valid {
        return vec![Finding::Stage2Locked];
    }
    let mut findings = Vec::new();
    match mode {
        Mode::Amount => {
            if allocated_total > total_income + EPSILON {
                findings.push(Finding::AllocationExceedsIncome {
                    allocated: allocated_total,
                    income: total_income,
                });
            }
        }
        Mode::Percent => {
            let total = funds.raw_percent_total();
            if total > 100.0 + EPSILON {
                findings.push(Finding::PercentTotalExceeds100 { total });
            }
        }
    }
    findings
}

/// Everything the UI layer needs, derived from one committed input state.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanReport {
    pub total_income: f64,
    pub funds_as_amount: FundAmounts,
    pub allocated_total: f64,
    pub remaining: f64,
    pub stage1_findings: Vec<Finding>,
    pub stage2_findings: Vec<Finding>,
    pub can_finalize: bool,
}

impl PlanReport {
    pub fn stage1_valid(&self) -> bool {
        self.stage1_findings.is_empty()
    }

    pub fn stage2_locked(&self) -> bool {
        self.stage2_findings.contains(&Finding::Stage2Locked)
    }
}

/// Evaluates the full plan: totals, conversions, and both finding lists.
pub fn evaluate(sources: &[IncomeSource], funds: &FundInputs, mode: Mode) -> PlanReport {
    let total_income = compute_total_income(sources);
    let stage1_findings = validate_stage1(sources);
    let stage1_valid = stage1_findings.is_empty();
    let funds_as_amount = convert_allocations(funds, mode, total_income);
    let allocated_total = funds_as_amount.total();
    let stage2_findings =
        validate_stage2(stage1_valid, mode, funds, allocated_total, total_income);
    let can_finalize = stage1_valid && stage2_findings.is_empty();
    PlanReport {
        total_income,
        funds_as_amount,
        allocated_total,
        remaining: total_income - allocated_total,
        stage1_findings,
        stage2_findings,
        can_finalize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str, received: bool, amount: &str) -> IncomeSource {
        let mut source = IncomeSource::new(name);
        source.received = received;
        source.amount = amount.to_string();
        source
    }

    fn funds(ef: &str, sf: &str, spending: &str, fun: &str) -> FundInputs {
        FundInputs {
            ef: ef.into(),
            sf: sf.into(),
            spending: spending.into(),
            fun: fun.into(),
        }
    }

    #[test]
    fn parse_or_zero_clamps_garbage_and_negatives() {
        assert_eq!(parse_or_zero("1000"), 1000.0);
        assert_eq!(parse_or_zero("  42.5 "), 42.5);
        assert_eq!(parse_or_zero(""), 0.0);
        assert_eq!(parse_or_zero("abc"), 0.0);
        assert_eq!(parse_or_zero("-5"), 0.0);
        assert_eq!(parse_or_zero("12x"), 0.0);
    }

    #[test]
    fn total_income_ignores_unreceived_sources() {
        let sources = vec![source("Salary", true, "1000"), source("Bonus", false, "500")];
        assert_eq!(compute_total_income(&sources), 1000.0);
        assert!(validate_stage1(&sources).is_empty());
    }

    #[test]
    fn total_income_is_zero_when_nothing_received() {
        let sources = vec![source("Salary", false, "1000"), source("Bonus", false, "500")];
        assert_eq!(compute_total_income(&sources), 0.0);
        let findings = validate_stage1(&sources);
        assert_eq!(findings, vec![Finding::MissingReceivedIncome]);
    }

    #[test]
    fn non_numeric_received_amount_contributes_zero_and_is_flagged() {
        let sources = vec![source("Salary", true, "oops")];
        assert_eq!(compute_total_income(&sources), 0.0);
        let findings = validate_stage1(&sources);
        assert_eq!(
            findings,
            vec![
                Finding::MissingReceivedIncome,
                Finding::NonPositiveSourceAmount {
                    source: "Salary".into()
                },
            ]
        );
    }

    #[test]
    fn stage1_collects_every_applicable_finding() {
        let sources = vec![
            source("Salary", true, "1000"),
            source("Bonus", true, "0"),
            source("Other", true, "-3"),
        ];
        let findings = validate_stage1(&sources);
        assert_eq!(
            findings,
            vec![
                Finding::NonPositiveSourceAmount {
                    source: "Bonus".into()
                },
                Finding::NonPositiveSourceAmount {
                    source: "Other".into()
                },
            ]
        );
    }

    #[test]
    fn amount_mode_conversion_is_clamped_identity() {
        let inputs = funds("300", "-10", "abc", "50");
        let amounts = convert_allocations(&inputs, Mode::Amount, 1000.0);
        assert_eq!(amounts.ef, 300.0);
        assert_eq!(amounts.sf, 0.0);
        assert_eq!(amounts.spending, 0.0);
        assert_eq!(amounts.fun, 50.0);
    }

    #[test]
    fn percent_mode_scales_against_income() {
        let inputs = funds("30", "20", "40", "10");
        let amounts = convert_allocations(&inputs, Mode::Percent, 1000.0);
        assert_eq!(amounts.ef, 300.0);
        assert_eq!(amounts.sf, 200.0);
        assert_eq!(amounts.spending, 400.0);
        assert_eq!(amounts.fun, 100.0);
        assert_eq!(amounts.total(), 1000.0);
    }

    #[test]
    fn mode_switch_rereads_text_without_unit_conversion() {
        // "30" typed under percent means 300 of a 1000 income; re-read under
        // amount mode it is literally 30. The stored text never changes.
        let inputs = funds("30", "", "", "");
        let as_percent = convert_allocations(&inputs, Mode::Percent, 1000.0);
        assert_eq!(as_percent.ef, 300.0);
        let as_amount = convert_allocations(&inputs, Mode::Amount, 1000.0);
        assert_eq!(as_amount.ef, 30.0);
        assert_eq!(inputs.ef, "30");
    }

    #[test]
    fn single_percent_field_may_exceed_100() {
        let inputs = funds("150", "", "", "");
        let amounts = convert_allocations(&inputs, Mode::Percent, 1000.0);
        assert_eq!(amounts.ef, 1500.0);
        let findings = validate_stage2(true, Mode::Percent, &inputs, amounts.total(), 1000.0);
        assert_eq!(
            findings,
            vec![Finding::PercentTotalExceeds100 { total: 150.0 }]
        );
    }

    #[test]
    fn stage2_locked_when_stage1_invalid() {
        let inputs = funds("300", "200", "400", "50");
        let findings = validate_stage2(false, Mode::Amount, &inputs, 950.0, 0.0);
        assert_eq!(findings, vec![Finding::Stage2Locked]);
    }

    #[test]
    fn amount_mode_allocation_within_income_passes() {
        let sources = vec![source("Salary", true, "1000")];
        let inputs = funds("300", "200", "400", "50");
        let report = evaluate(&sources, &inputs, Mode::Amount);
        assert_eq!(report.total_income, 1000.0);
        assert_eq!(report.allocated_total, 950.0);
        assert_eq!(report.remaining, 50.0);
        assert!(report.stage2_findings.is_empty());
        assert!(report.can_finalize);
    }

    #[test]
    fn amount_mode_overallocation_is_flagged() {
        let sources = vec![source("Salary", true, "1000")];
        let inputs = funds("600", "200", "400", "50");
        let report = evaluate(&sources, &inputs, Mode::Amount);
        assert_eq!(
            report.stage2_findings,
            vec![Finding::AllocationExceedsIncome {
                allocated: 1250.0,
                income: 1000.0
            }]
        );
        assert!(!report.can_finalize);
    }

    #[test]
    fn percent_mode_sum_over_100_is_flagged() {
        let sources = vec![source("Salary", true, "1000")];
        let inputs = funds("30", "30", "30", "20");
        let report = evaluate(&sources, &inputs, Mode::Percent);
        assert_eq!(
            report.stage2_findings,
            vec![Finding::PercentTotalExceeds100 { total: 110.0 }]
        );
        assert!(!report.can_finalize);
    }

    #[test]
    fn epsilon_absorbs_accumulated_rounding() {
        let sources = vec![source("Salary", true, "0.3")];
        // 0.1 + 0.1 + 0.1 > 0.3 in f64, but within tolerance.
        let inputs = funds("0.1", "0.1", "0.1", "");
        let report = evaluate(&sources, &inputs, Mode::Amount);
        assert!(report.stage2_findings.is_empty());
    }

    #[test]
    fn zero_income_locks_stage2_regardless_of_fields() {
        let sources = vec![source("Salary", false, "1000")];
        let inputs = funds("300", "200", "400", "50");
        let report = evaluate(&sources, &inputs, Mode::Amount);
        assert_eq!(report.total_income, 0.0);
        assert_eq!(report.stage2_findings, vec![Finding::Stage2Locked]);
        assert!(report.stage2_locked());
        assert!(!report.can_finalize);
    }

    #[test]
    fn findings_render_human_readable_strings() {
        let finding = Finding::NonPositiveSourceAmount {
            source: "Bonus".into(),
        };
        assert_eq!(
            finding.to_string(),
            "Received source 'Bonus' needs an amount greater than zero"
        );
        let joined = join_findings(&[Finding::Stage2Locked]);
        assert!(joined.contains("locked"));
    }
}
