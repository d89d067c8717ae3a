//! Supported firmware translation languages.

use serde::{Deserialize, Serialize};

/// A translation language accepted by the firmware build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    En,
    Fr,
    Se,
    It,
    Cz,
    De,
    Pt,
    Es,
    Pl,
    Nl,
}

impl Language {
    /// Every supported language, in the order they are listed to users.
    pub const ALL: [Language; 10] = [
        Language::En,
        Language::Fr,
        Language::Se,
        Language::It,
        Language::Cz,
        Language::De,
        Language::Pt,
        Language::Es,
        Language::Pl,
        Language::Nl,
    ];

    /// Case-insensitive lookup of a language code.
    pub fn parse(code: &str) -> Option<Language> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(code))
    }

    /// Canonical upper-case code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "EN",
            Language::Fr => "FR",
            Language::Se => "SE",
            Language::It => "IT",
            Language::Cz => "CZ",
            Language::De => "DE",
            Language::Pt => "PT",
            Language::Es => "ES",
            Language::Pl => "PL",
            Language::Nl => "NL",
        }
    }

    /// Lower-case form used in artifact file names.
    pub fn file_suffix(&self) -> String {
        self.code().to_ascii_lowercase()
    }

    /// Space-separated list of all codes, for error messages.
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(Language::code)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
