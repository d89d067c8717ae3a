//! Failure taxonomy and stable exit codes

use fw_options::{ErrorKind, ResolveError};
use serde::{Deserialize, Serialize};

/// Build status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Firmware built and within budget
    Success,
    /// A build step or the artifact check failed
    Failed,
    /// The configuration was rejected before any build step ran
    Rejected,
}

impl Status {
    pub fn is_failure(&self) -> bool {
        !matches!(self, Status::Success)
    }
}

/// Failure kind - categorizes the cause of failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// No board identifier was supplied
    MissingBoard,
    /// Unsupported translation language
    InvalidLanguage,
    /// Malformed override token
    InvalidOverride,
    /// Settings file or settings value rejected
    InvalidConfig,
    /// Source tree missing or unreadable
    SourceNotFound,
    /// Configure step failed
    Configure,
    /// Clean or build step failed
    Build,
    /// Artifact larger than the board's size budget
    TooLarge,
    /// Artifact missing or could not be moved
    Artifacts,
    /// Other filesystem failure
    Io,
}

impl FailureKind {
    /// Get the stable exit code for this failure kind
    pub fn exit_code(&self) -> ExitCode {
        match self {
            FailureKind::MissingBoard => ExitCode::MissingBoard,
            FailureKind::InvalidLanguage => ExitCode::InvalidLanguage,
            FailureKind::InvalidOverride | FailureKind::InvalidConfig => ExitCode::InvalidConfig,
            FailureKind::SourceNotFound => ExitCode::SourceNotFound,
            FailureKind::Configure | FailureKind::Build => ExitCode::BuildFailed,
            FailureKind::TooLarge => ExitCode::TooLarge,
            FailureKind::Artifacts | FailureKind::Io => ExitCode::Io,
        }
    }

    /// Status reported for this failure
    pub fn status(&self) -> Status {
        match self {
            FailureKind::MissingBoard
            | FailureKind::InvalidLanguage
            | FailureKind::InvalidOverride
            | FailureKind::InvalidConfig => Status::Rejected,
            _ => Status::Failed,
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            FailureKind::MissingBoard => "Target board name is not specified",
            FailureKind::InvalidLanguage => "Invalid translation language",
            FailureKind::InvalidOverride => "Malformed override flag",
            FailureKind::InvalidConfig => "Invalid build settings",
            FailureKind::SourceNotFound => "Firmware source not found",
            FailureKind::Configure => "cmake configuration failed",
            FailureKind::Build => "make compilation failed",
            FailureKind::TooLarge => "Firmware is too large for radio",
            FailureKind::Artifacts => "Artifact processing failed",
            FailureKind::Io => "Filesystem error",
        }
    }
}

impl From<&ResolveError> for FailureKind {
    fn from(err: &ResolveError) -> Self {
        match err.kind() {
            ErrorKind::Precondition => FailureKind::MissingBoard,
            ErrorKind::Validation => FailureKind::InvalidLanguage,
            ErrorKind::Parse => FailureKind::InvalidOverride,
        }
    }
}

/// Stable process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    /// Firmware exceeds the size budget
    TooLarge = 1,
    /// Configure or build step failed
    BuildFailed = 2,
    /// Source tree not found
    SourceNotFound = 4,
    /// Board identifier missing
    MissingBoard = 5,
    /// Translation language not supported
    InvalidLanguage = 6,
    /// Malformed override or settings
    InvalidConfig = 7,
    /// Filesystem or artifact handling error
    Io = 8,
}

impl ExitCode {
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(ExitCode::Success),
            1 => Some(ExitCode::TooLarge),
            2 => Some(ExitCode::BuildFailed),
            4 => Some(ExitCode::SourceNotFound),
            5 => Some(ExitCode::MissingBoard),
            6 => Some(ExitCode::InvalidLanguage),
            7 => Some(ExitCode::InvalidConfig),
            8 => Some(ExitCode::Io),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }
}

impl Default for ExitCode {
    fn default() -> Self {
        ExitCode::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_distinct_for_resolution_failures() {
        let codes = [
            FailureKind::MissingBoard.exit_code(),
            FailureKind::InvalidLanguage.exit_code(),
            FailureKind::InvalidOverride.exit_code(),
            ExitCode::Success,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_exit_code_roundtrip() {
        for code in [0, 1, 2, 4, 5, 6, 7, 8] {
            assert_eq!(ExitCode::from_i32(code).unwrap().as_i32(), code);
        }
        assert_eq!(ExitCode::from_i32(3), None);
    }

    #[test]
    fn test_resolve_error_mapping() {
        assert_eq!(
            FailureKind::from(&ResolveError::MissingBoard),
            FailureKind::MissingBoard
        );
        let lang = ResolveError::InvalidLanguage {
            value: "XX".into(),
            valid: "EN".into(),
        };
        assert_eq!(FailureKind::from(&lang).exit_code().as_i32(), 6);
        let token = ResolveError::MalformedOverride { token: "X".into() };
        assert_eq!(FailureKind::from(&token), FailureKind::InvalidOverride);
    }

    #[test]
    fn test_status_for_kind() {
        assert_eq!(FailureKind::InvalidLanguage.status(), Status::Rejected);
        assert_eq!(FailureKind::TooLarge.status(), Status::Failed);
        assert!(Status::Rejected.is_failure());
        assert!(!Status::Success.is_failure());
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&FailureKind::TooLarge).unwrap();
        assert_eq!(json, "\"TOO_LARGE\"");
    }
}
