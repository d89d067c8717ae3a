//! Effective build settings with full provenance
//!
//! The effective settings capture the merged layers, the typed view the
//! pipeline consumes, and where each contributing layer came from.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;
use crate::source::{paths_overlap, ExcludeRules};

/// Settings file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "fw-build.toml";

/// Environment variable naming the target board
pub const ENV_BOARD: &str = "BOARD_NAME";

/// Environment variable holding whitespace-separated `NAME=VALUE` overrides
pub const ENV_FLAGS: &str = "CMAKE_FLAGS";

/// Origin of a settings layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    File,
    Env,
    Cli,
}

/// A contributing settings layer with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (file layer only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (file layer only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Directory layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathSettings {
    pub source_dir: PathBuf,
    pub work_dir: PathBuf,
    pub build_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// Artifact naming
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputSettings {
    pub product_name: String,
    pub extension: String,
}

/// External toolchain invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSettings {
    pub jobs: u32,
    pub clean: bool,
    pub configure_program: String,
    pub make_program: String,
    pub target: String,
    pub firmware_file: String,
    pub stamp_file: String,
}

/// Source tree copy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceSettings {
    pub exclude: Vec<String>,
}

/// Typed view of the merged settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildSettings {
    /// Nominal board identifier
    #[serde(default)]
    pub board: Option<String>,

    /// Raw override flags (`NAME=VALUE ...`)
    #[serde(default)]
    pub flags: Option<String>,

    pub paths: PathSettings,
    pub output: OutputSettings,
    pub build: ToolSettings,
    pub source: SourceSettings,
}

/// Effective settings with provenance
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveSettings {
    /// The merged settings object
    pub config: Value,

    /// Typed settings deserialized from `config`
    pub settings: BuildSettings,

    /// Contributing layers in precedence order
    pub sources: Vec<ConfigSource>,
}

impl EffectiveSettings {
    /// Build effective settings from layers.
    ///
    /// `env` resolves environment variables; pass `|k| std::env::var(k).ok()`
    /// in production and a fixed map in tests.
    pub fn build<F>(
        config_path: Option<&Path>,
        env: F,
        cli_overrides: Option<Value>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut layers = Vec::new();
        let mut sources = Vec::new();

        // Layer 1: Built-in defaults
        layers.push(BuiltinDefaults::default().to_value());
        sources.push(ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        });

        // Layer 2: Settings file
        if let Some(path) = config_path {
            let (value, digest) = Self::load_toml_file(path)?;
            layers.push(value);
            sources.push(ConfigSource {
                origin: ConfigOrigin::File,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        // Layer 3: Environment
        let mut env_layer = serde_json::Map::new();
        if let Some(board) = env(ENV_BOARD) {
            env_layer.insert("board".to_string(), Value::String(board));
        }
        if let Some(flags) = env(ENV_FLAGS) {
            env_layer.insert("flags".to_string(), Value::String(flags));
        }
        if !env_layer.is_empty() {
            layers.push(Value::Object(env_layer));
            sources.push(ConfigSource {
                origin: ConfigOrigin::Env,
                path: None,
                digest: None,
            });
        }

        // Layer 4: CLI overrides
        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);
        let settings: BuildSettings = serde_json::from_value(merged.clone())
            .map_err(|e| ConfigError::ParseError(format!("invalid settings: {}", e)))?;
        Self::validate(&settings)?;

        Ok(Self {
            config: merged,
            settings,
            sources,
        })
    }

    /// Pick the settings file: an explicit path must exist, the default one may not.
    pub fn locate_config(explicit: Option<PathBuf>) -> Result<Option<PathBuf>, ConfigError> {
        match explicit {
            Some(path) if path.exists() => Ok(Some(path)),
            Some(path) => Err(ConfigError::IoError(format!(
                "settings file not found: {}",
                path.display()
            ))),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                Ok(default.exists().then_some(default))
            }
        }
    }

    /// Load and parse a TOML file, returning the value and digest
    fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let bytes = fs::read(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;

        let toml_value: toml::Value = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

        Ok((Self::toml_to_json(toml_value), digest))
    }

    /// Convert TOML Value to JSON Value
    fn toml_to_json(toml: toml::Value) -> Value {
        match toml {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Number(i.into()),
            toml::Value::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Self::toml_to_json).collect())
            }
            toml::Value::Table(table) => Value::Object(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Self::toml_to_json(v)))
                    .collect(),
            ),
        }
    }

    fn validate(settings: &BuildSettings) -> Result<(), ConfigError> {
        if settings.build.jobs == 0 {
            return Err(ConfigError::ValidationError(
                "build.jobs must be at least 1".to_string(),
            ));
        }

        let required = [
            ("build.configure_program", &settings.build.configure_program),
            ("build.make_program", &settings.build.make_program),
            ("build.target", &settings.build.target),
            ("build.firmware_file", &settings.build.firmware_file),
            ("output.product_name", &settings.output.product_name),
            ("output.extension", &settings.output.extension),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{} must not be empty",
                    name
                )));
            }
        }

        // work_dir is wiped before every copy.
        if paths_overlap(&settings.paths.work_dir, &settings.paths.source_dir) {
            return Err(ConfigError::ValidationError(format!(
                "paths.work_dir ({}) must not contain or lie inside paths.source_dir ({})",
                settings.paths.work_dir.display(),
                settings.paths.source_dir.display()
            )));
        }

        ExcludeRules::new(settings.source.exclude.as_slice())
            .map_err(|e| ConfigError::ValidationError(format!("source.exclude: {}", e)))?;

        Ok(())
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get a merged value by path (dot-separated)
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.config;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
