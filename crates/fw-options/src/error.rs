//! Resolution error types.

use serde::{Deserialize, Serialize};

/// Fatal errors raised while resolving a build configuration.
///
/// All of these are detected before any external build step runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No board identifier was supplied.
    #[error("target board name is not specified")]
    MissingBoard,

    /// The `TRANSLATIONS` override names an unsupported language.
    #[error("invalid language ({value}) specified; valid languages are: {valid}")]
    InvalidLanguage { value: String, valid: String },

    /// An override token is not of the form `NAME=VALUE`.
    #[error("malformed override `{token}`: expected NAME=VALUE")]
    MalformedOverride { token: String },
}

/// Coarse category of a [`ResolveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Precondition,
    Validation,
    Parse,
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::MissingBoard => ErrorKind::Precondition,
            ResolveError::InvalidLanguage { .. } => ErrorKind::Validation,
            ResolveError::MalformedOverride { .. } => ErrorKind::Parse,
        }
    }
}
