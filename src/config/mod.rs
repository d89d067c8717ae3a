//! Build settings merge system
//!
//! Implements the 4-layer settings merge:
//! 1. Built-in defaults (container layout of the firmware build image)
//! 2. Settings file (`fw-build.toml` or `--config`)
//! 3. Environment (`BOARD_NAME`, `CMAKE_FLAGS`)
//! 4. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::BuiltinDefaults;
pub use effective::{
    BuildSettings, ConfigError, ConfigOrigin, ConfigSource, EffectiveSettings, OutputSettings,
    PathSettings, SourceSettings, ToolSettings, DEFAULT_CONFIG_FILE, ENV_BOARD, ENV_FLAGS,
};
pub use merge::{deep_merge, merge_layers};
