//! Override merging.
//!
//! Merge semantics:
//! - Override of a default key: value replaced in place (position kept)
//! - Unknown key: appended to the extras, in override order
//! - `TRANSLATIONS`: validated against the supported languages first

use serde::Serialize;

use crate::board::{is_identity_key, BOARD_FAMILY_KEY, BOARD_REVISION_KEY};
use crate::error::ResolveError;
use crate::language::Language;
use crate::options::{OptionMap, OverrideSet};

/// Reserved override naming the firmware translation language.
pub const TRANSLATIONS_KEY: &str = "TRANSLATIONS";

/// Informational record of what an override did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MergeNotice {
    /// A default value was replaced.
    Overridden {
        key: String,
        from: String,
        to: String,
    },
    /// The override repeated the default value.
    MatchesDefault { key: String, value: String },
    /// The key is not a board default and is passed through as an extra.
    Added { key: String, value: String },
}

impl std::fmt::Display for MergeNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeNotice::Overridden { key, from, to } => {
                write!(f, "Overriding default flag: {key}={from} => {key}={to}")
            }
            MergeNotice::MatchesDefault { key, value } => {
                write!(f, "Override for default flag matches default value: {key}={value}")
            }
            MergeNotice::Added { key, value } => {
                write!(f, "Adding additional flag: {key}={value}")
            }
        }
    }
}

/// Result of merging overrides into a board's defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedConfiguration {
    /// Board defaults with overrides applied, in default order.
    pub final_options: OptionMap,

    /// Overrides with no matching default, in override order.
    pub extra_options: OptionMap,

    /// Canonical translation language, if one was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation_language: Option<Language>,

    /// Post-merge `PCB` value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_board: Option<String>,

    /// Post-merge `PCBREV` value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_board_revision: Option<String>,

    /// What each override did, in override order.
    pub notices: Vec<MergeNotice>,
}

impl MergedConfiguration {
    /// Configure-tool arguments: defaults first, then extras.
    ///
    /// The source directory argument is left to the caller.
    pub fn configure_args(&self) -> Vec<String> {
        let mut args = self.final_options.to_define_args();
        args.extend(self.extra_options.to_define_args());
        args
    }

    /// Look up an option in the final options, then the extras.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.final_options
            .get(key)
            .or_else(|| self.extra_options.get(key))
    }
}

/// Merge `overrides` into a copy of `defaults`.
///
/// The defaults are never mutated. Fails before merging anything if the
/// `TRANSLATIONS` override names an unsupported language.
pub fn merge(
    defaults: &OptionMap,
    overrides: &OverrideSet,
) -> Result<MergedConfiguration, ResolveError> {
    let translation_language = validate_language(overrides)?;

    let mut final_options = defaults.clone();
    let mut extra_options = OptionMap::new();
    let mut notices = Vec::new();

    for (key, value) in overrides.iter() {
        match final_options.get(key).map(str::to_owned) {
            Some(default) if default == value => {
                if !is_identity_key(key) {
                    notices.push(MergeNotice::MatchesDefault {
                        key: key.to_string(),
                        value: default,
                    });
                }
            }
            Some(default) => {
                final_options.insert(key, value);
                notices.push(MergeNotice::Overridden {
                    key: key.to_string(),
                    from: default,
                    to: value.to_string(),
                });
            }
            None => {
                extra_options.insert(key, value);
                notices.push(MergeNotice::Added {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }
    }

    let lookup = |key: &str| {
        final_options
            .get(key)
            .or_else(|| extra_options.get(key))
            .map(str::to_owned)
    };
    let effective_board = lookup(BOARD_FAMILY_KEY);
    let effective_board_revision = lookup(BOARD_REVISION_KEY);

    Ok(MergedConfiguration {
        final_options,
        extra_options,
        translation_language,
        effective_board,
        effective_board_revision,
        notices,
    })
}

fn validate_language(overrides: &OverrideSet) -> Result<Option<Language>, ResolveError> {
    match overrides.get(TRANSLATIONS_KEY) {
        None => Ok(None),
        Some(value) => Language::parse(value)
            .map(Some)
            .ok_or_else(|| ResolveError::InvalidLanguage {
                value: value.to_string(),
                valid: Language::supported_list(),
            }),
    }
}
