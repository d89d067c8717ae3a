//! Artifact file naming and firmware version discovery.

use fw_options::{Language, Resolution};
use std::fs;
use std::io;
use std::path::Path;

const VERSION_DEFINE: &str = "#define VERSION ";

/// Components of the output file name:
/// `<product>-<board>[-<version>][-<language>].<extension>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactName {
    pub product: String,
    pub board: String,
    pub version: Option<String>,
    pub language: Option<Language>,
    pub extension: String,
}

impl ArtifactName {
    /// Name an artifact for a resolved configuration.
    pub fn for_resolution(
        product: &str,
        extension: &str,
        resolution: &Resolution,
        version: Option<String>,
    ) -> Self {
        Self {
            product: product.to_string(),
            board: resolution.board_label(),
            version,
            language: resolution.translation_language(),
            extension: extension.to_string(),
        }
    }

    pub fn file_name(&self) -> String {
        let mut name = format!("{}-{}", self.product, self.board.to_ascii_lowercase());
        if let Some(version) = self.version.as_deref().filter(|v| !v.is_empty()) {
            name.push('-');
            name.push_str(version);
        }
        if let Some(language) = self.language {
            name.push('-');
            name.push_str(&language.file_suffix());
        }
        let extension = self.extension.trim_start_matches('.');
        if !extension.is_empty() {
            name.push('.');
            name.push_str(extension);
        }
        name
    }
}

impl std::fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Extract the firmware version from the build's stamp header.
///
/// Returns `None` when the header is missing or has no `VERSION` define.
pub fn read_firmware_version(stamp_file: &Path) -> io::Result<Option<String>> {
    let contents = match fs::read_to_string(stamp_file) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    Ok(parse_version(&contents))
}

fn parse_version(contents: &str) -> Option<String> {
    contents
        .lines()
        .filter(|line| line.contains(VERSION_DEFINE))
        .filter_map(|line| line.split_whitespace().nth(2))
        .map(|token| token.replace('"', ""))
        .find(|version| !version.is_empty())
}
