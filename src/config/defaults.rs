//! Built-in build settings (layer 1)
//!
//! Matches the directory layout of the firmware build container: sources
//! mounted at `/opentx`, a scratch copy in `/tmp/opentx`, and an out-of-tree
//! build directory at `/build`.

use serde::{Deserialize, Serialize};

/// Built-in default settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Mounted firmware source tree (default: "/opentx")
    pub source_dir: String,

    /// Scratch copy of the source tree (default: "/tmp/opentx")
    pub work_dir: String,

    /// Out-of-tree build directory (default: "/build")
    pub build_dir: String,

    /// Where the renamed artifact is written (default: "/opentx")
    pub output_dir: String,

    /// Artifact name prefix (default: "opentx")
    pub product_name: String,

    /// Artifact extension (default: "bin")
    pub extension: String,

    /// Parallel make jobs (default: 2)
    pub jobs: u32,

    /// Run `make clean` before building (default: true)
    pub clean: bool,

    pub configure_program: String,
    pub make_program: String,

    /// Make target producing the firmware (default: "firmware")
    pub build_target: String,

    /// Binary produced in the build directory (default: "firmware.bin")
    pub firmware_file: String,

    /// Header carrying the firmware version, relative to the build directory
    pub stamp_file: String,

    /// Glob patterns skipped when copying the source tree
    pub exclude: Vec<String>,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            source_dir: "/opentx".to_string(),
            work_dir: "/tmp/opentx".to_string(),
            build_dir: "/build".to_string(),
            output_dir: "/opentx".to_string(),
            product_name: "opentx".to_string(),
            extension: "bin".to_string(),
            jobs: 2,
            clean: true,
            configure_program: "cmake".to_string(),
            make_program: "make".to_string(),
            build_target: "firmware".to_string(),
            firmware_file: "firmware.bin".to_string(),
            stamp_file: "radio/src/stamp.h".to_string(),
            exclude: vec![".git".to_string()],
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "paths": {
                "source_dir": self.source_dir,
                "work_dir": self.work_dir,
                "build_dir": self.build_dir,
                "output_dir": self.output_dir
            },
            "output": {
                "product_name": self.product_name,
                "extension": self.extension
            },
            "build": {
                "jobs": self.jobs,
                "clean": self.clean,
                "configure_program": self.configure_program,
                "make_program": self.make_program,
                "target": self.build_target,
                "firmware_file": self.firmware_file,
                "stamp_file": self.stamp_file
            },
            "source": {
                "exclude": self.exclude
            }
        })
    }
}
