#![doc(test(attr(deny(warnings))))]

//! Pocket Ledger keeps period-bucketed budgeting state (monthly income,
//! per-category budgets, a global transaction log) and derives the summaries
//! a budgeting dashboard renders.

pub mod cli;
pub mod config;
pub mod errors;
pub mod ledger;
pub mod paths;
pub mod storage;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("pocket_ledger=info".parse().unwrap());
        fmt().with_env_filter(filter).init();
        tracing::info!("Pocket Ledger tracing initialized.");
    });
}
