use thiserror::Error;
use uuid::Uuid;

/// Error type that captures plan and session failures.
///
/// Validation findings are deliberately not represented here: they are soft,
/// collected per stage, and rendered for correction rather than propagated.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Unknown income source: {0}")]
    UnknownSource(Uuid),
    #[error("Plan cannot be finalized: {0}")]
    NotFinalizable(String),
    #[error("Session error: {0}")]
    Session(String),
}
