use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::{self, join_findings, FundAmounts, FundInputs, FundKind, Mode, PlanReport};
use crate::errors::PlanError;
use crate::plan::IncomeSource;

/// Source names seeded into a fresh plan, matching the default entry rows.
pub const SEED_SOURCES: [&str; 3] = ["Salary", "Side hustle", "Other"];

/// Immutable record of a finalized allocation, kept for display until the
/// income inputs change again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedSnapshot {
    pub amounts: FundAmounts,
    pub total_income: f64,
    pub mode: Mode,
    pub finalized_at: DateTime<Utc>,
}

/// The whole session state: income sources, fund fields, mode, and the
/// optional finalized snapshot.
///
/// Mutations go through the reducer methods below so that every stage-1 edit
/// invalidates a previous finalization. Derived values are never stored; call
/// [`PlanState::report`] to recompute them from the committed inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanState {
    sources: Vec<IncomeSource>,
    #[serde(default)]
    funds: FundInputs,
    #[serde(default)]
    mode: Mode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    finalized: Option<FinalizedSnapshot>,
}

impl PlanState {
    /// Creates a plan seeded with the default income sources.
    pub fn new() -> Self {
        Self {
            sources: SEED_SOURCES.iter().copied().map(IncomeSource::new).collect(),
            funds: FundInputs::default(),
            mode: Mode::Amount,
            finalized: None,
        }
    }

    pub fn sources(&self) -> &[IncomeSource] {
        &self.sources
    }

    pub fn funds(&self) -> &FundInputs {
        &self.funds
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn finalized(&self) -> Option<&FinalizedSnapshot> {
        self.finalized.as_ref()
    }

    /// Recomputes every derived aggregate and both finding lists.
    pub fn report(&self) -> PlanReport {
        engine::evaluate(&self.sources, &self.funds, self.mode)
    }

    pub fn add_source(&mut self, name: impl Into<String>) -> Uuid {
        let source = IncomeSource::new(name);
        let id = source.id;
        tracing::debug!(source = %source.name, %id, "income source added");
        self.sources.push(source);
        self.touch_stage1();
        id
    }

    pub fn remove_source(&mut self, id: Uuid) -> Result<IncomeSource, PlanError> {
        let index = self
            .sources
            .iter()
            .position(|source| source.id == id)
            .ok_or(PlanError::UnknownSource(id))?;
        let removed = self.sources.remove(index);
        tracing::debug!(source = %removed.name, %id, "income source removed");
        self.touch_stage1();
        Ok(removed)
    }

    pub fn set_received(&mut self, id: Uuid, received: bool) -> Result<(), PlanError> {
        self.source_mut(id)?.received = received;
        self.touch_stage1();
        Ok(())
    }

    /// Flips the received flag and returns its new value.
    pub fn toggle_received(&mut self, id: Uuid) -> Result<bool, PlanError> {
        let source = self.source_mut(id)?;
        source.received = !source.received;
        let received = source.received;
        self.touch_stage1();
        Ok(received)
    }

    pub fn set_amount(&mut self, id: Uuid, text: impl Into<String>) -> Result<(), PlanError> {
        self.source_mut(id)?.amount = text.into();
        self.touch_stage1();
        Ok(())
    }

    /// Re-interprets the stored fund text under a new mode. The text itself
    /// is never rewritten.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            tracing::debug!(mode = mode.label(), "allocation mode switched");
        }
        self.mode = mode;
    }

    pub fn set_fund(&mut self, kind: FundKind, text: impl Into<String>) {
        self.funds.set(kind, text);
    }

    /// Clears amounts and flags on every source (added ones included, but
    /// none are removed), blanks the funds, and returns the mode to amount.
    pub fn reset(&mut self) {
        for source in &mut self.sources {
            source.clear();
        }
        self.funds.clear();
        self.mode = Mode::Amount;
        self.finalized = None;
        tracing::info!("plan reset");
    }

    /// Snapshots the converted amounts when both stages validate.
    pub fn finalize(&mut self) -> Result<FinalizedSnapshot, PlanError> {
        let report = self.report();
        if !report.can_finalize {
            let mut findings = report.stage1_findings;
            findings.extend(report.stage2_findings);
            return Err(PlanError::NotFinalizable(join_findings(&findings)));
        }
        let snapshot = FinalizedSnapshot {
            amounts: report.funds_as_amount,
            total_income: report.total_income,
            mode: self.mode,
            finalized_at: Utc::now(),
        };
        tracing::info!(
            total_income = report.total_income,
            allocated = report.allocated_total,
            "plan finalized"
        );
        self.finalized = Some(snapshot.clone());
        Ok(snapshot)
    }

    fn source_mut(&mut self, id: Uuid) -> Result<&mut IncomeSource, PlanError> {
        self.sources
            .iter_mut()
            .find(|source| source.id == id)
            .ok_or(PlanError::UnknownSource(id))
    }

    /// Stage-1 inputs changed: any finalized snapshot is stale now.
    fn touch_stage1(&mut self) {
        if self.finalized.take().is_some() {
            tracing::debug!("finalized snapshot cleared by income edit");
        }
    }
}

impl Default for PlanState {
    fn default() -> Self {
        Self::new()
    }
}
