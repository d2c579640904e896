//! Run summary model.

use serde::Serialize;

use super::test_result::{TestResult, TestStatus};

/// Outcome counts for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Count of emitted results
    pub total: usize,
    /// Count of succeeded units
    pub succeed: usize,
    /// Count of failed units
    pub failed: usize,
    /// Count of skipped units
    pub skipped: usize,
    /// Total duration in milliseconds
    pub duration_ms: i64,
}

impl RunSummary {
    /// Count one result.
    pub fn record(&mut self, result: &TestResult) {
        self.total += 1;
        self.duration_ms += result.duration_ms;
        match result.status {
            TestStatus::Succeed => self.succeed += 1,
            TestStatus::Failed => self.failed += 1,
            TestStatus::Skipped => self.skipped += 1,
            TestStatus::Unknown => {}
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl<'a> FromIterator<&'a TestResult> for RunSummary {
    fn from_iter<I: IntoIterator<Item = &'a TestResult>>(iter: I) -> Self {
        let mut summary = RunSummary::default();
        for result in iter {
            summary.record(result);
        }
        summary
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} units: {} succeed, {} failed, {} skipped ({}ms)",
            self.total, self.succeed, self.failed, self.skipped, self.duration_ms
        )
    }
}
