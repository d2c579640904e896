//! Declarative HTTP API test runner.
//!
//! Suites are discovered under a directory (or given as a single file), loaded
//! with bounded concurrency, filtered by `only`/`skip` status and run unit by
//! unit. Each unit issues one request and checks the response against its
//! expectations and callback.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::{ConfigHandle, ConfigPatch, RunnerConfig};
pub use error::{RunError, RunResult, UnitError};
pub use models::{RunSummary, SuiteDefinition, TestResult, TestStatus, UnitPayload};
pub use services::{FileSuiteSource, HttpRunner, RegistrySuiteSource, Runner};
