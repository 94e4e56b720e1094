//! Serializable plan state and its reducer-style mutations.

mod source;
mod state;

pub use source::IncomeSource;
pub use state::{FinalizedSnapshot, PlanState, SEED_SOURCES};
