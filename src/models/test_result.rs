//! Test result model representing the outcome of one unit.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::error::UnitError;

/// Unit outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Succeed,
    Failed,
    Skipped,
    #[default]
    Unknown,
}

impl TestStatus {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeed => "succeed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result record emitted once per unit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Name of the owning suite
    pub suite_name: String,
    /// Source identity of the owning suite
    pub file_path: PathBuf,
    /// Payload name, or its 1-based position
    pub unit_name: String,
    pub status: TestStatus,
    /// Cause of failure, present iff `status` is `Failed`
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_error"
    )]
    pub error: Option<Arc<UnitError>>,
    /// Unit start time
    pub start_time: DateTime<Utc>,
    /// Time spent dispatching and asserting, in milliseconds
    pub duration_ms: i64,
}

impl TestResult {
    pub fn is_failed(&self) -> bool {
        self.status == TestStatus::Failed
    }
}

fn serialize_error<S: Serializer>(
    error: &Option<Arc<UnitError>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.serialize_str(&error.to_string()),
        None => serializer.serialize_none(),
    }
}
