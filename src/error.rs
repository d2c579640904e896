//! Error types for the test runner.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.
//! Errors are split by where they are contained: `RunError` ends a run, `UnitError`
//! is caught at the unit boundary and reported in a `TestResult`.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Boxed error returned by user callbacks and asynchronous streams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that abort the whole run before any unit executes.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The root path could not be inspected
    #[error("Failed to read suite path {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Walking the suite directory failed
    #[error("Failed to walk directory: {0}")]
    Walk(String),

    /// A suite file could not be loaded
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Errors raised while resolving a suite path into a suite definition.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Nothing could be resolved for the path
    #[error("Cannot resolve suite module {}", path.display())]
    Unresolved { path: PathBuf },

    /// The resolved file could not be read
    #[error("Failed to read suite file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The resolved module does not expose a suite-shaped value
    #[error("Suite module {} has no usable suite export: {reason}", path.display())]
    NoSuiteExport { path: PathBuf, reason: String },
}

/// Errors contained within a single unit's dispatch-and-assert pipeline.
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    /// Required suite fields are missing or empty
    #[error("Invalid suite: {0}")]
    Validation(String),

    /// The suite declares no payload
    #[error("Invalid payload. suite name: {0}")]
    MissingPayload(String),

    /// The callback slot holds something that cannot be invoked
    #[error("Callback is not a function: {0}")]
    CallbackNotCallable(String),

    /// Deep-equality comparison failed
    #[error(transparent)]
    Assertion(#[from] AssertionError),

    /// The callback returned or completed with an error
    #[error("Callback failed: {0}")]
    Callback(#[source] BoxError),

    /// The expectation stream emitted an error
    #[error("Invalid expect stream: {0}")]
    ExpectStream(#[source] BoxError),

    /// The request data stream failed or produced no value
    #[error("Invalid request data: {0}")]
    RequestData(String),

    /// The HTTP call failed
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors reported by the HTTP transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Invalid request header '{0}'")]
    InvalidHeader(String),

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("Request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u128 },

    #[error("Request to {url} returned HTTP {status}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Deep-equality mismatch between a response and an expected value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionError {
    pub expected: String,
    pub actual: String,
}

impl AssertionError {
    /// Build a mismatch report from the two compared values.
    pub fn mismatch<T: fmt::Debug>(expected: &T, actual: &T) -> Self {
        AssertionError {
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        }
    }
}

impl fmt::Display for AssertionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Expected values to be strictly deep-equal:\n  expected: {}\n  actual:   {}",
            self.expected, self.actual
        )
    }
}

impl std::error::Error for AssertionError {}

/// Convenience type alias for Results with RunError.
pub type RunResult<T> = Result<T, RunError>;
