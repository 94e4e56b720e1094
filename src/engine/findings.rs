use std::fmt;

use serde::{Deserialize, Serialize};

/// A soft validation finding produced by one of the two plan stages.
///
/// Findings are collected and displayed for user correction; they are never
/// raised as errors and never abort a computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Finding {
    /// No income source is marked received with a positive amount.
    MissingReceivedIncome,
    /// A received source whose amount parses to zero or less.
    NonPositiveSourceAmount { source: String },
    /// Amount mode: the four funds together exceed total income.
    AllocationExceedsIncome { allocated: f64, income: f64 },
    /// Percent mode: the four raw percent fields sum past 100.
    PercentTotalExceeds100 { total: f64 },
    /// Stage 2 is read-only until stage 1 is valid.
    Stage2Locked,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::MissingReceivedIncome => write!(
                f,
                "At least one income source must be received with an amount greater than zero"
            ),
            Finding::NonPositiveSourceAmount { source } => write!(
                f,
                "Received source '{}' needs an amount greater than zero",
                source
            ),
            Finding::AllocationExceedsIncome { allocated, income } => write!(
                f,
                "Allocated total {:.2} exceeds total income {:.2}",
                allocated, income
            ),
            Finding::PercentTotalExceeds100 { total } => {
                write!(f, "Fund percentages sum to {:.2}%, over the 100% limit", total)
            }
            Finding::Stage2Locked => write!(
                f,
                "Allocation is locked until income has been saved with a positive total"
            ),
        }
    }
}

/// Joins findings into a single display string, one per sentence.
pub fn join_findings(findings: &[Finding]) -> String {
    findings
        .iter()
        .map(Finding::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
