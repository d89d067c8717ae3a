//! Build pipeline orchestration
//!
//! Runs one firmware build end to end:
//! - Resolve board profile and merge overrides (all fatal checks happen here)
//! - Check and stage the source tree
//! - Configure, clean and build via the external toolchain
//! - Name, install and size-check the artifact
//!
//! Nothing touches the filesystem or spawns a process until resolution has
//! succeeded, so a configuration error can never leave a half-finished build.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use fw_options::{resolve_and_merge, Resolution, ResolveError, ResolveRequest};
use thiserror::Error;
use tracing::{info, warn};

use crate::artifact::{compute_sha256, install_artifact, read_firmware_version, ArtifactName, SizeCheck};
use crate::config::{BuildSettings, ConfigError};
use crate::invoke::{build_command, clean_command, configure_command, CommandRunner, CommandSpec};
use crate::source::{check_source, copy_tree, ExcludeRules, SourceError};
use crate::summary::{BuildSummary, ExitCode, FailureKind};

/// Pipeline errors
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("cmake configuration failed (exit status {})", describe_status(.code))]
    ConfigureFailed { code: Option<i32> },

    #[error("make {step} failed (exit status {})", describe_status(.code))]
    BuildFailed { step: String, code: Option<i32> },

    #[error("build produced no firmware at {0}")]
    ArtifactMissing(PathBuf),

    /// Raised after the artifact is installed; `report` describes it.
    #[error("firmware is too large for radio: {size_bytes} bytes exceeds budget of {budget_bytes} bytes")]
    TooLarge {
        size_bytes: u64,
        budget_bytes: u64,
        report: Box<BuildReport>,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

fn describe_status(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "killed by signal".to_string())
}

impl BuildError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            BuildError::Resolve(e) => FailureKind::from(e),
            BuildError::Config(_) => FailureKind::InvalidConfig,
            BuildError::Source(SourceError::NotFound(_)) => FailureKind::SourceNotFound,
            BuildError::Source(SourceError::ExcludeError(_) | SourceError::Overlap { .. }) => {
                FailureKind::InvalidConfig
            }
            BuildError::Source(_) => FailureKind::Io,
            BuildError::Spawn { .. } | BuildError::ConfigureFailed { .. } => FailureKind::Configure,
            BuildError::BuildFailed { .. } => FailureKind::Build,
            BuildError::ArtifactMissing(_) => FailureKind::Artifacts,
            BuildError::TooLarge { .. } => FailureKind::TooLarge,
            BuildError::Io(_) => FailureKind::Io,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        self.failure_kind().exit_code()
    }

    /// Failure summary carrying whatever was known when the build stopped.
    ///
    /// `resolution` is the configuration resolved before the failing step, if
    /// resolution got that far. An oversized build also reports its artifact.
    pub fn to_summary(&self, resolution: Option<&Resolution>, duration_ms: u64) -> BuildSummary {
        let summary = BuildSummary::failure(self.failure_kind(), self, duration_ms);
        match self {
            BuildError::TooLarge { report, .. } => summary
                .with_resolution(&report.resolution)
                .with_artifact(
                    &report.artifact_path,
                    report.artifact_sha256.clone(),
                    report.size.size_bytes,
                    report.firmware_version.clone(),
                ),
            _ => match resolution {
                Some(resolution) => summary.with_resolution(resolution),
                None => summary,
            },
        }
    }
}

/// Result of a successful build
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub resolution: Resolution,
    pub artifact_path: PathBuf,
    pub artifact_sha256: String,
    pub firmware_version: Option<String>,
    pub size: SizeCheck,
    pub duration: Duration,
}

impl BuildReport {
    pub fn to_summary(&self) -> BuildSummary {
        BuildSummary::success(&self.resolution, duration_ms(self.duration)).with_artifact(
            &self.artifact_path,
            self.artifact_sha256.clone(),
            self.size.size_bytes,
            self.firmware_version.clone(),
        )
    }
}

pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Resolve the configured board and overrides, logging what the merge did.
pub fn resolve(settings: &BuildSettings) -> Result<Resolution, BuildError> {
    let request = ResolveRequest::from_flags(
        settings.board.as_deref(),
        settings.flags.as_deref().unwrap_or(""),
    )?;

    match request.board.as_deref() {
        Some(board) => info!(board, "resolving board profile"),
        None => info!("no board specified"),
    }
    if request.overrides.is_empty() {
        info!("no additional cmake flags specified");
    }

    let resolution = resolve_and_merge(&request)?;
    log_resolution(&resolution);
    Ok(resolution)
}

fn log_resolution(resolution: &Resolution) {
    for notice in &resolution.merged.notices {
        info!("{}", notice);
    }
    if let Some(language) = resolution.translation_language() {
        info!(%language, "translation language");
    }
    for warning in resolution_warnings(resolution) {
        warn!(board = %resolution.board, "{}", warning);
    }
}

/// Conditions worth a warning: fallback to generic defaults and an unknown
/// size budget. Merge notices are informational only.
fn resolution_warnings(resolution: &Resolution) -> Vec<String> {
    let mut warnings = Vec::new();
    if resolution.is_fallback() {
        warnings.push(
            "unknown board; firmware will be built with generic defaults and any specified cmake flags"
                .to_string(),
        );
    }
    if resolution.size_budget_bytes.is_none() {
        warnings.push(format!(
            "no size budget known for {}; firmware size will not be validated",
            resolution.board_label()
        ));
    }
    warnings
}

/// One-shot firmware build
pub struct Pipeline<R: CommandRunner> {
    settings: BuildSettings,
    runner: R,
}

impl<R: CommandRunner> Pipeline<R> {
    pub fn new(settings: BuildSettings, runner: R) -> Self {
        Self { settings, runner }
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Run the whole build.
    pub fn run(&mut self) -> Result<BuildReport, BuildError> {
        let resolution = resolve(&self.settings)?;
        self.build(resolution)
    }

    /// Run the build steps for an already-validated resolution.
    pub fn build(&mut self, resolution: Resolution) -> Result<BuildReport, BuildError> {
        let paths = self.settings.paths.clone();
        check_source(&paths.source_dir)?;

        let start = Instant::now();

        info!(
            from = %paths.source_dir.display(),
            to = %paths.work_dir.display(),
            "copying source tree"
        );
        let exclude = ExcludeRules::new(self.settings.source.exclude.as_slice()).map_err(SourceError::from)?;
        let stats = copy_tree(&paths.source_dir, &paths.work_dir, &exclude)?;
        info!(files = stats.files, bytes = stats.bytes, skipped = stats.skipped, "source copied");

        std::fs::create_dir_all(&paths.build_dir)?;

        let configure = configure_command(&self.settings, &resolution);
        match self.execute(&configure)? {
            Some(0) => {}
            code => return Err(BuildError::ConfigureFailed { code }),
        }

        if let Some(clean) = clean_command(&self.settings) {
            self.run_make_step("clean", &clean)?;
        }
        let target = self.settings.build.target.clone();
        self.run_make_step(&target, &build_command(&self.settings))?;

        let duration = start.elapsed();

        let firmware = paths.build_dir.join(&self.settings.build.firmware_file);
        if !firmware.is_file() {
            return Err(BuildError::ArtifactMissing(firmware));
        }

        let firmware_version =
            read_firmware_version(&paths.build_dir.join(&self.settings.build.stamp_file))?;
        let name = ArtifactName::for_resolution(
            &self.settings.output.product_name,
            &self.settings.output.extension,
            &resolution,
            firmware_version.clone(),
        );
        let artifact_path = paths.output_dir.join(name.file_name());
        let size_bytes = install_artifact(&firmware, &artifact_path)?;
        let artifact_sha256 = compute_sha256(&artifact_path)?;

        info!(seconds = duration.as_secs_f64(), "build completed");
        info!(path = %artifact_path.display(), "firmware file");

        let size = SizeCheck::new(size_bytes, resolution.size_budget_bytes);
        if size.is_checked() {
            info!("{}", size.describe());
        } else {
            warn!("unable to validate firmware image size; {}", size.describe());
        }

        let report = BuildReport {
            resolution,
            artifact_path,
            artifact_sha256,
            firmware_version,
            size,
            duration,
        };

        if let (true, Some(budget_bytes)) = (size.exceeds_budget(), size.budget_bytes) {
            return Err(BuildError::TooLarge {
                size_bytes,
                budget_bytes,
                report: Box::new(report),
            });
        }

        Ok(report)
    }

    fn run_make_step(&mut self, step: &str, command: &CommandSpec) -> Result<(), BuildError> {
        match self.execute(command)? {
            Some(0) => Ok(()),
            code => Err(BuildError::BuildFailed {
                step: step.to_string(),
                code,
            }),
        }
    }

    fn execute(&mut self, command: &CommandSpec) -> Result<Option<i32>, BuildError> {
        info!(cwd = %command.cwd.display(), "{}", command.display_line());
        self.runner.run(command).map_err(|source| BuildError::Spawn {
            program: command.program.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EffectiveSettings;

    fn settings(board: Option<&str>, flags: Option<&str>) -> BuildSettings {
        let mut s = EffectiveSettings::build(None, |_| None, None).unwrap().settings;
        s.board = board.map(str::to_string);
        s.flags = flags.map(str::to_string);
        s
    }

    #[test]
    fn test_resolve_from_settings() {
        let resolution = resolve(&settings(Some("x9d+"), Some("LUA=YES"))).unwrap();
        assert_eq!(resolution.merged.final_options.get("LUA"), Some("YES"));
    }

    #[test]
    fn test_resolve_errors_map_to_exit_codes() {
        let missing = resolve(&settings(None, None)).unwrap_err();
        assert_eq!(missing.exit_code(), ExitCode::MissingBoard);

        let lang = resolve(&settings(Some("x7"), Some("TRANSLATIONS=XX"))).unwrap_err();
        assert_eq!(lang.exit_code(), ExitCode::InvalidLanguage);

        let parse = resolve(&settings(Some("x7"), Some("LUA"))).unwrap_err();
        assert_eq!(parse.exit_code(), ExitCode::InvalidConfig);
    }

    fn oversized(board: &str) -> BuildError {
        let resolution = resolve(&settings(Some(board), None)).unwrap();
        let budget_bytes = resolution.size_budget_bytes.unwrap();
        let size = SizeCheck::new(budget_bytes + 1, Some(budget_bytes));
        BuildError::TooLarge {
            size_bytes: size.size_bytes,
            budget_bytes,
            report: Box::new(BuildReport {
                resolution,
                artifact_path: PathBuf::from("/opentx/opentx-sky9x.bin"),
                artifact_sha256: "00".repeat(32),
                firmware_version: None,
                size,
                duration: Duration::from_secs(1),
            }),
        }
    }

    #[test]
    fn test_build_error_kinds() {
        assert_eq!(
            BuildError::ConfigureFailed { code: Some(1) }.exit_code(),
            ExitCode::BuildFailed
        );
        assert_eq!(oversized("sky9x").exit_code(), ExitCode::TooLarge);
        assert_eq!(
            BuildError::Source(SourceError::NotFound(PathBuf::from("/x"))).exit_code(),
            ExitCode::SourceNotFound
        );
    }

    #[test]
    fn test_settings_source_errors_are_config_errors() {
        let glob = ExcludeRules::new(&["a[b"]).unwrap_err();
        assert_eq!(
            BuildError::Source(SourceError::from(glob)).exit_code(),
            ExitCode::InvalidConfig
        );

        let overlap = SourceError::Overlap {
            source_dir: PathBuf::from("/opentx"),
            work: PathBuf::from("/"),
        };
        assert_eq!(BuildError::Source(overlap).exit_code(), ExitCode::InvalidConfig);

        let io = SourceError::IoError(io::Error::new(io::ErrorKind::Other, "disk"));
        assert_eq!(BuildError::Source(io).exit_code(), ExitCode::Io);
    }

    #[test]
    fn test_too_large_summary_keeps_artifact() {
        let summary = oversized("sky9x").to_summary(None, 10);

        assert_eq!(summary.exit_code(), ExitCode::TooLarge);
        assert_eq!(summary.board.as_deref(), Some("sky9x"));
        assert_eq!(summary.size_budget_bytes, Some(262_144));
        assert_eq!(summary.size_bytes, Some(262_145));
        assert_eq!(summary.artifact_path.as_deref(), Some("/opentx/opentx-sky9x.bin"));
    }

    #[test]
    fn test_failure_summary_with_resolution() {
        let resolution = resolve(&settings(Some("x7"), Some("TRANSLATIONS=de"))).unwrap();
        let err = BuildError::ConfigureFailed { code: Some(1) };

        let summary = err.to_summary(Some(&resolution), 5);
        assert_eq!(summary.board.as_deref(), Some("x7"));
        assert_eq!(summary.effective_board.as_deref(), Some("X7"));
        assert!(summary.options.is_some());
        assert!(summary.artifact_path.is_none());

        let bare = BuildError::Resolve(ResolveError::MissingBoard).to_summary(None, 0);
        assert!(bare.board.is_none());
        assert!(bare.options.is_none());
    }

    #[test]
    fn test_matching_override_is_not_a_warning() {
        let resolution = resolve(&settings(Some("x9d+"), Some("GVARS=YES"))).unwrap();
        assert!(!resolution.merged.notices.is_empty());
        assert!(resolution_warnings(&resolution).is_empty());
    }

    #[test]
    fn test_fallback_and_unknown_budget_warn() {
        let resolution = resolve(&settings(Some("homebrew"), None)).unwrap();
        let warnings = resolution_warnings(&resolution);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("unknown board"));
        assert!(warnings[1].contains("no size budget"));
    }

    #[test]
    fn test_error_messages() {
        let err = BuildError::BuildFailed {
            step: "firmware".into(),
            code: None,
        };
        assert_eq!(err.to_string(), "make firmware failed (exit status killed by signal)");
        let err = BuildError::ConfigureFailed { code: Some(2) };
        assert_eq!(err.to_string(), "cmake configuration failed (exit status 2)");
    }
}
