//! Build summary and failure taxonomy

mod build_summary;
mod failure;

pub use build_summary::{BuildSummary, SUMMARY_SCHEMA_ID, SUMMARY_SCHEMA_VERSION};
pub use failure::{ExitCode, FailureKind, Status};
