//! Runner E2E test suite.
//!
//! Drives `Runner::start` over suite trees on disk with programmatic suites and
//! a scripted in-memory transport.
//!
//! Run with: cargo test --test runner_e2e
