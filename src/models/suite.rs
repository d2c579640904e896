//! Suite models: the authored definition, the loaded suite and the unit it expands into.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::payload::UnitPayload;

/// Suite defaults applied by the loader.
pub mod defaults {
    pub const METHOD: &str = "GET";
    pub const TIMEOUT_MS: u64 = 60 * 1000;
    pub const BAIL: bool = false;
}

/// Authored run request of a suite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuiteStatus {
    #[default]
    Normal,
    Skip,
    Only,
}

impl SuiteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Skip => "skip",
            Self::Only => "only",
        }
    }
}

impl std::fmt::Display for SuiteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolved run decision of a loaded suite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Normal,
    Skip,
}

/// Payload of a suite: one unit or an ordered list of units.
#[derive(Debug)]
pub enum Payload<R = Value> {
    Single(UnitPayload<R>),
    List(Vec<UnitPayload<R>>),
}

/// Suite as authored by the test writer.
#[derive(Debug)]
pub struct SuiteDefinition<R = Value> {
    pub name: String,
    pub url: String,
    pub method: Option<String>,
    /// Milliseconds
    pub timeout: Option<u64>,
    /// Stop the remaining units of this suite after the first failure
    pub bail: Option<bool>,
    pub status: Option<SuiteStatus>,
    pub payload: Option<Payload<R>>,
}

impl<R> SuiteDefinition<R> {
    /// Create a suite without payload; everything else takes its default.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        SuiteDefinition {
            name: name.into(),
            url: url.into(),
            method: None,
            timeout: None,
            bail: None,
            status: None,
            payload: None,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = Some(timeout_ms);
        self
    }

    pub fn with_bail(mut self, bail: bool) -> Self {
        self.bail = Some(bail);
        self
    }

    pub fn with_status(mut self, status: SuiteStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_payload(mut self, payload: UnitPayload<R>) -> Self {
        self.payload = Some(Payload::Single(payload));
        self
    }

    pub fn with_payloads(mut self, payloads: Vec<UnitPayload<R>>) -> Self {
        self.payload = Some(Payload::List(payloads));
        self
    }
}

/// Everything about a loaded suite except its payload.
///
/// Shared by every unit the suite expands into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteInfo {
    pub name: String,
    pub url: String,
    pub method: String,
    pub timeout: Duration,
    pub bail: bool,
    pub status: SuiteStatus,
    /// Source identity of the suite
    pub file_path: PathBuf,
    /// Set once by the run-status resolver
    pub run_status: RunStatus,
}

/// Suite with defaults applied, ready for run-status resolution.
#[derive(Debug)]
pub struct LoadedSuite<R = Value> {
    pub info: SuiteInfo,
    pub payload: Option<Payload<R>>,
}

impl<R> LoadedSuite<R> {
    /// Materialize defaults over an authored definition.
    pub fn from_definition(definition: SuiteDefinition<R>, file_path: PathBuf) -> Self {
        let info = SuiteInfo {
            name: definition.name,
            url: definition.url,
            method: definition
                .method
                .unwrap_or_else(|| defaults::METHOD.to_string()),
            timeout: Duration::from_millis(definition.timeout.unwrap_or(defaults::TIMEOUT_MS)),
            bail: definition.bail.unwrap_or(defaults::BAIL),
            status: definition.status.unwrap_or_default(),
            file_path,
            run_status: RunStatus::Normal,
        };

        LoadedSuite {
            info,
            payload: definition.payload,
        }
    }
}

/// A suite specialized to exactly one payload.
#[derive(Debug)]
pub struct RunUnit<R = Value> {
    pub suite: Arc<SuiteInfo>,
    pub payload: UnitPayload<R>,
    /// 1-based position within the suite payload
    pub position: usize,
}

impl<R> RunUnit<R> {
    /// Payload name, or the position when the payload has none.
    pub fn unit_name(&self) -> String {
        self.payload
            .name
            .clone()
            .unwrap_or_else(|| self.position.to_string())
    }
}
