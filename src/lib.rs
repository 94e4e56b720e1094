#![doc(test(attr(deny(warnings))))]

//! Kakeibo Core provides the two-stage budgeting engine behind the Kakeibo
//! workflow: declaring received income sources, then allocating that income
//! across four fixed funds, with session persistence and an interactive CLI.

pub mod cli;
pub mod engine;
pub mod errors;
pub mod plan;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Kakeibo Core tracing initialized.");
    });
}
