//! Exclusion rules for the source tree copy.
//!
//! A pattern containing `/` is anchored at the source root and matched
//! against the whole relative path. A pattern without `/` is matched against
//! the file name alone, so `.git` or `*.o` apply at any depth.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ExcludeError {
    #[error("invalid exclude pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("failed to compile exclude patterns: {0}")]
    Build(#[from] globset::Error),
}

#[derive(Debug)]
pub struct ExcludeRules {
    anchored: GlobSet,
    by_name: GlobSet,
    patterns: Vec<String>,
}

impl ExcludeRules {
    /// Compile exclude patterns. Blank patterns are ignored.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ExcludeError> {
        let mut anchored = GlobSetBuilder::new();
        let mut by_name = GlobSetBuilder::new();
        let mut kept = Vec::new();

        for pattern in patterns.iter().map(|p| p.as_ref().trim()) {
            if pattern.is_empty() {
                continue;
            }
            let glob = Glob::new(pattern.trim_start_matches('/')).map_err(|source| {
                ExcludeError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                }
            })?;
            if pattern.contains('/') {
                anchored.add(glob);
            } else {
                by_name.add(glob);
            }
            kept.push(pattern.to_string());
        }

        Ok(Self {
            anchored: anchored.build()?,
            by_name: by_name.build()?,
            patterns: kept,
        })
    }

    /// True if `rel_path` (relative to the source root) should not be copied.
    pub fn is_excluded(&self, rel_path: &Path) -> bool {
        if self.anchored.is_match(rel_path) {
            return true;
        }
        rel_path
            .file_name()
            .map(|name| self.by_name.is_match(name))
            .unwrap_or(false)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}
