//! Build summary (summary.json)

use chrono::{DateTime, Utc};
use fw_options::{Language, OptionMap, Resolution};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

use super::failure::{ExitCode, FailureKind, Status};

/// Schema version for summary.json
pub const SUMMARY_SCHEMA_VERSION: u32 = 1;

/// Schema identifier for summary.json
pub const SUMMARY_SCHEMA_ID: &str = "fw-build/summary@1";

/// Machine-readable record of one build invocation
#[derive(Debug, Clone, Serialize)]
pub struct BuildSummary {
    pub schema_version: u32,
    pub schema_id: String,
    pub created_at: DateTime<Utc>,

    pub status: Status,
    pub exit_code: i32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,

    /// Error message for failed or rejected builds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Board identifier as requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_board: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_board_revision: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<OptionMap>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_options: Option<OptionMap>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_sha256: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_budget_bytes: Option<u64>,

    pub duration_ms: u64,
}

impl BuildSummary {
    fn base(status: Status, exit_code: ExitCode, duration_ms: u64) -> Self {
        Self {
            schema_version: SUMMARY_SCHEMA_VERSION,
            schema_id: SUMMARY_SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            status,
            exit_code: exit_code.as_i32(),
            failure_kind: None,
            error: None,
            board: None,
            effective_board: None,
            effective_board_revision: None,
            language: None,
            options: None,
            extra_options: None,
            firmware_version: None,
            artifact_path: None,
            artifact_sha256: None,
            size_bytes: None,
            size_budget_bytes: None,
            duration_ms,
        }
    }

    /// Summary for a successful build
    pub fn success(resolution: &Resolution, duration_ms: u64) -> Self {
        Self::base(Status::Success, ExitCode::Success, duration_ms).with_resolution(resolution)
    }

    /// Summary for a failed or rejected build
    pub fn failure(kind: FailureKind, error: impl ToString, duration_ms: u64) -> Self {
        let mut summary = Self::base(kind.status(), kind.exit_code(), duration_ms);
        summary.failure_kind = Some(kind);
        summary.error = Some(error.to_string());
        summary
    }

    /// Record the resolved configuration
    pub fn with_resolution(mut self, resolution: &Resolution) -> Self {
        self.board = Some(resolution.board.clone());
        self.effective_board = resolution.merged.effective_board.clone();
        self.effective_board_revision = resolution.merged.effective_board_revision.clone();
        self.language = resolution.translation_language();
        self.options = Some(resolution.merged.final_options.clone());
        self.extra_options = Some(resolution.merged.extra_options.clone());
        self.size_budget_bytes = resolution.size_budget_bytes;
        self
    }

    /// Record the installed artifact
    pub fn with_artifact(
        mut self,
        path: &Path,
        sha256: String,
        size_bytes: u64,
        firmware_version: Option<String>,
    ) -> Self {
        self.artifact_path = Some(path.to_string_lossy().to_string());
        self.artifact_sha256 = Some(sha256);
        self.size_bytes = Some(size_bytes);
        self.firmware_version = firmware_version;
        self
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from_i32(self.exit_code).unwrap_or(ExitCode::Io)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fw_options::{resolve_and_merge, ResolveRequest};

    #[test]
    fn test_success_summary() {
        let request = ResolveRequest::from_flags(Some("x7"), "TRANSLATIONS=fr").unwrap();
        let resolution = resolve_and_merge(&request).unwrap();
        let summary = BuildSummary::success(&resolution, 1500).with_artifact(
            Path::new("/opentx/opentx-x7-fr.bin"),
            "ab".repeat(32),
            300_000,
            None,
        );

        assert_eq!(summary.status, Status::Success);
        assert_eq!(summary.exit_code(), ExitCode::Success);

        let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(json["schema_id"], SUMMARY_SCHEMA_ID);
        assert_eq!(json["effective_board"], "X7");
        assert_eq!(json["language"], "FR");
        assert_eq!(json["size_budget_bytes"], 524_288);
        assert_eq!(json["extra_options"]["TRANSLATIONS"], "fr");
        assert!(json.get("failure_kind").is_none());
    }

    #[test]
    fn test_failure_summary() {
        let summary = BuildSummary::failure(FailureKind::MissingBoard, "no board", 0);

        assert_eq!(summary.status, Status::Rejected);
        assert_eq!(summary.exit_code, 5);

        let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(json["failure_kind"], "MISSING_BOARD");
        assert_eq!(json["error"], "no board");
        assert!(json.get("options").is_none());
    }
}
