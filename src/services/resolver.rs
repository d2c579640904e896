//! Run-status resolution over a complete batch of loaded suites.

use tracing::info;

use crate::models::{LoadedSuite, RunStatus, SuiteStatus};

/// Decide whether each suite runs or is skipped.
///
/// When any suite in the batch asks for `only`, every other suite is skipped.
/// The decision needs the whole batch, so this runs after loading completes.
pub fn resolve_run_status<R>(mut suites: Vec<LoadedSuite<R>>) -> Vec<LoadedSuite<R>> {
    let has_only = suites
        .iter()
        .any(|suite| suite.info.status == SuiteStatus::Only);

    if has_only {
        info!("Suites marked 'only' found, skipping all other suites");
    }

    for suite in &mut suites {
        suite.info.run_status = if has_only && suite.info.status != SuiteStatus::Only {
            RunStatus::Skip
        } else {
            RunStatus::Normal
        };
    }

    suites
}
