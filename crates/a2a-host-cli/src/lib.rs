//! Black-box check client for a running A2A host agent service.
//!
//! Runs the health, root-info, chat and streaming checks and produces a
//! [`Report`] whose exit code is non-zero when any check fails.

pub mod checks;
pub mod client;
pub mod report;

pub use checks::{run_suite, SuiteOptions, CHAT_CHECKS};
pub use client::{ClientError, HostClient};
pub use report::{CheckResult, Outcome, Report};
