//! Result aggregation: turn a finished unit into its result record.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::UnitError;
use crate::models::{RunStatus, SuiteInfo, TestResult, TestStatus};

/// When a unit started and how long it took.
#[derive(Debug, Clone, Copy)]
pub struct UnitTiming {
    pub start_time: DateTime<Utc>,
    pub duration_ms: i64,
}

/// Build the result record for a unit.
pub fn handle_result(
    suite: &SuiteInfo,
    unit_name: &str,
    error: Option<UnitError>,
    timing: UnitTiming,
) -> TestResult {
    let status = match (&error, suite.run_status) {
        (Some(_), _) => TestStatus::Failed,
        (None, RunStatus::Skip) => TestStatus::Skipped,
        (None, RunStatus::Normal) => TestStatus::Succeed,
    };

    TestResult {
        suite_name: suite.name.clone(),
        file_path: suite.file_path.clone(),
        unit_name: unit_name.to_string(),
        status,
        error: error.map(Arc::new),
        start_time: timing.start_time,
        duration_ms: timing.duration_ms,
    }
}
