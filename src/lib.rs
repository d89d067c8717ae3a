//! OpenTX firmware build front-end
//!
//! Resolves a board profile and user overrides into cmake options (see the
//! `fw-options` crate), then drives cmake/make and validates the produced
//! firmware against the board's size budget.

pub mod artifact;
pub mod config;
pub mod invoke;
pub mod pipeline;
pub mod source;
pub mod summary;

pub use config::{BuildSettings, ConfigError, EffectiveSettings};
pub use invoke::{CommandRunner, CommandSpec, ProcessRunner};
pub use pipeline::{BuildError, BuildReport, Pipeline};
pub use summary::{BuildSummary, ExitCode, FailureKind, Status};

pub use fw_options::{resolve_and_merge, BoardProfile, Resolution, ResolveError, ResolveRequest};
