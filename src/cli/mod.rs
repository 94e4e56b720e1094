//! Interactive shell and script-mode CLI driving the two-stage workflow.

mod commands;
pub mod output;
mod shell;

pub use shell::{run_cli, CliMode};

use thiserror::Error;

/// Errors that abort the CLI loop. Command-level problems (bad indices,
/// malformed arguments, validation findings) are reported as warnings and
/// never surface here.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error(transparent)]
    Plan(#[from] crate::errors::PlanError),
}
