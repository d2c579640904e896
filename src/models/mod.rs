//! Domain models for the test runner.

pub mod payload;
pub mod run_summary;
pub mod suite;
pub mod test_result;

// Re-export commonly used types
pub use payload::{Callback, Expectation, RequestArgs, RequestData, ResponseBody, UnitPayload};
pub use run_summary::RunSummary;
pub use suite::{LoadedSuite, Payload, RunStatus, RunUnit, SuiteDefinition, SuiteInfo, SuiteStatus};
pub use test_result::{TestResult, TestStatus};
