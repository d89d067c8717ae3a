//! Build option resolution for OpenTX firmware builds.
//!
//! Turns a board identifier plus free-form `NAME=VALUE` overrides into the
//! final, ordered set of configure options. Resolution is pure: it performs
//! no I/O and reports informational events as [`MergeNotice`]s instead of
//! logging them.

mod board;
mod error;
mod language;
mod merge;
mod options;

pub use board::{
    is_identity_key, BoardProfile, BoardSpec, BOARDS, BOARD_FAMILY_KEY, BOARD_REVISION_KEY,
    GENERIC_BOARD_ID,
};
pub use error::{ErrorKind, ResolveError};
pub use language::Language;
pub use merge::{merge, MergeNotice, MergedConfiguration, TRANSLATIONS_KEY};
pub use options::{OptionMap, OverrideSet};

use serde::Serialize;

/// Typed input to [`resolve_and_merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveRequest {
    /// Nominal board identifier. `None` or blank is a fatal error.
    pub board: Option<String>,

    /// Overrides in the order they were supplied.
    pub overrides: OverrideSet,
}

impl ResolveRequest {
    pub fn new(board: impl Into<String>, overrides: OverrideSet) -> Self {
        Self {
            board: Some(board.into()),
            overrides,
        }
    }

    /// Build a request from a board name and a raw flag string.
    pub fn from_flags(board: Option<&str>, flags: &str) -> Result<Self, ResolveError> {
        Ok(Self {
            board: board.map(str::to_owned),
            overrides: OverrideSet::parse(flags)?,
        })
    }
}

/// A fully resolved build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Board identifier as requested.
    pub board: String,

    /// Profile selected from the nominal board identifier.
    pub profile: BoardProfile,

    /// Known profile matching the post-merge `PCB` / `PCBREV`, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_profile: Option<BoardProfile>,

    pub merged: MergedConfiguration,

    /// Size budget of the effective profile; `None` means unchecked.
    pub size_budget_bytes: Option<u64>,
}

impl Resolution {
    /// True when the nominal board was not recognized.
    pub fn is_fallback(&self) -> bool {
        !self.profile.known
    }

    /// Board name used in artifact file names.
    ///
    /// Prefers the key of the profile matching the effective identity, then
    /// `pcb[-pcbrev]`, then the nominal board identifier.
    pub fn board_label(&self) -> String {
        if let Some(profile) = &self.effective_profile {
            return profile.board_id.clone();
        }
        match (&self.merged.effective_board, &self.merged.effective_board_revision) {
            (Some(pcb), Some(rev)) => format!("{}-{}", pcb, rev).to_ascii_lowercase(),
            (Some(pcb), None) => pcb.to_ascii_lowercase(),
            (None, _) => self.board.trim().to_ascii_lowercase(),
        }
    }

    pub fn configure_args(&self) -> Vec<String> {
        self.merged.configure_args()
    }

    pub fn translation_language(&self) -> Option<Language> {
        self.merged.translation_language
    }
}

/// Resolve the board profile and merge the overrides into it.
///
/// Every fatal condition is reported here, before any build step runs:
/// a missing board, an unsupported language and (via [`OverrideSet::parse`])
/// malformed override tokens.
pub fn resolve_and_merge(request: &ResolveRequest) -> Result<Resolution, ResolveError> {
    let board = match request.board.as_deref().map(str::trim) {
        Some(b) if !b.is_empty() => b.to_string(),
        _ => return Err(ResolveError::MissingBoard),
    };

    let profile = BoardProfile::resolve(&board);
    let merged = merge(&profile.default_options, &request.overrides)?;

    let effective_profile = merged.effective_board.as_deref().and_then(|pcb| {
        BoardProfile::by_identity(pcb, merged.effective_board_revision.as_deref())
    });
    let size_budget_bytes = effective_profile
        .as_ref()
        .and_then(|p| p.size_budget_bytes);

    Ok(Resolution {
        board,
        profile,
        effective_profile,
        merged,
        size_budget_bytes,
    })
}
