//! Board profiles.
//!
//! Each supported radio is described declaratively by a [`BoardSpec`]: its
//! identity options (`PCB`, optionally `PCBREV`), board-specific settings,
//! the feature defaults of its family and a firmware size budget. Lookups
//! materialize an owned [`BoardProfile`] so callers never share the table.

use serde::Serialize;

use crate::options::OptionMap;

/// Option naming the board family passed to the configure tool.
pub const BOARD_FAMILY_KEY: &str = "PCB";

/// Option naming the board revision passed to the configure tool.
pub const BOARD_REVISION_KEY: &str = "PCBREV";

/// Board key reported for the generic fallback profile when none is given.
pub const GENERIC_BOARD_ID: &str = "generic";

const KIB_256: u64 = 65536 * 4;
const KIB_512: u64 = 65536 * 8;
const MIB_2: u64 = 2 * 1024 * 1024;

type Options = &'static [(&'static str, &'static str)];

/// Static description of one supported board.
#[derive(Debug)]
pub struct BoardSpec {
    pub key: &'static str,
    pub pcb: &'static str,
    pub pcbrev: Option<&'static str>,
    /// Board-specific options emitted right after the identity.
    pub board_options: Options,
    pub family: Options,
    pub size_budget: Option<u64>,
}

const GENERIC: Options = &[
    ("GUI", "YES"),
    ("GVARS", "YES"),
    ("HELI", "YES"),
    ("LUA", "NO"),
    ("LUA_COMPILER", "YES"),
    ("MULTIMODULE", "YES"),
    ("PPM_CENTER_ADJUSTABLE", "YES"),
    ("PPM_UNIT", "US"),
    ("RAS", "YES"),
    ("DISABLE_COMPANION", "YES"),
    ("CMAKE_BUILD_TYPE", "Release"),
];

const SKY9X: Options = &[
    ("GVARS", "YES"),
    ("HELI", "YES"),
    ("MULTIMODULE", "YES"),
    ("PPM_CENTER_ADJUSTABLE", "YES"),
    ("PPM_UNIT", "US"),
    ("RAS", "YES"),
    ("DISABLE_COMPANION", "YES"),
    ("CMAKE_BUILD_TYPE", "Release"),
];

const AR9X: Options = &[
    ("GVARS", "YES"),
    ("HELI", "YES"),
    ("PPM_CENTER_ADJUSTABLE", "YES"),
    ("PPM_UNIT", "US"),
    ("DISABLE_COMPANION", "YES"),
    ("CMAKE_BUILD_TYPE", "Release"),
];

const TARANIS_X9LITE: Options = &[
    ("GUI", "YES"),
    ("GVARS", "YES"),
    ("HELI", "NO"),
    ("LUA", "NO"),
    ("LUA_COMPILER", "YES"),
    ("MULTIMODULE", "YES"),
    ("PPM_CENTER_ADJUSTABLE", "YES"),
    ("PPM_UNIT", "US"),
    ("RAS", "YES"),
    ("DISABLE_COMPANION", "YES"),
    ("CMAKE_BUILD_TYPE", "Release"),
];

const TARANIS_X9D: Options = &[
    ("GUI", "YES"),
    ("GVARS", "YES"),
    ("HELI", "YES"),
    ("HAPTIC", "YES"),
    ("LUA", "NO"),
    ("LUA_COMPILER", "YES"),
    ("MULTIMODULE", "YES"),
    ("PPM_CENTER_ADJUSTABLE", "YES"),
    ("PPM_UNIT", "US"),
    ("RAS", "YES"),
    ("DISABLE_COMPANION", "YES"),
    ("CMAKE_BUILD_TYPE", "Release"),
];

const TARANIS_X9DP: Options = GENERIC;

const TARANIS_XLITE: Options = &[
    ("GUI", "YES"),
    ("GVARS", "YES"),
    ("HELI", "YES"),
    ("LUA", "NO"),
    ("LUA_COMPILER", "YES"),
    ("MULTIMODULE", "NO"),
    ("PPM_CENTER_ADJUSTABLE", "YES"),
    ("PPM_UNIT", "US"),
    ("RAS", "YES"),
    ("DISABLE_COMPANION", "YES"),
    ("CMAKE_BUILD_TYPE", "Release"),
];

const TARANIS_XLITES: Options = &[
    ("GUI", "YES"),
    ("GVARS", "YES"),
    ("HELI", "YES"),
    ("LUA", "YES"),
    ("LUA_COMPILER", "YES"),
    ("MULTIMODULE", "YES"),
    ("PPM_CENTER_ADJUSTABLE", "YES"),
    ("PPM_UNIT", "US"),
    ("RAS", "YES"),
    ("DISABLE_COMPANION", "YES"),
    ("CMAKE_BUILD_TYPE", "Release"),
];

const TARANIS_X9E: Options = &[
    ("GUI", "YES"),
    ("GVARS", "YES"),
    ("HELI", "YES"),
    ("LUA", "YES"),
    ("LUA_COMPILER", "YES"),
    ("MULTIMODULE", "YES"),
    ("PPM_CENTER_ADJUSTABLE", "YES"),
    ("PPM_UNIT", "US"),
    ("RAS", "YES"),
    ("DISABLE_COMPANION", "YES"),
    ("CMAKE_BUILD_TYPE", "Release"),
];

const HORUS: Options = &[
    ("GVARS", "YES"),
    ("HELI", "YES"),
    ("LUA", "YES"),
    ("LUA_COMPILER", "YES"),
    ("MULTIMODULE", "YES"),
    ("PPM_CENTER_ADJUSTABLE", "YES"),
    ("PPM_UNIT", "US"),
    ("RAS", "YES"),
    ("DISABLE_COMPANION", "YES"),
    ("CMAKE_BUILD_TYPE", "Release"),
];

const JUMPER_T12: Options = &[
    ("GUI", "YES"),
    ("GVARS", "YES"),
    ("HELI", "YES"),
    ("LCD_DUAL_BUFFER", "YES"),
    ("LUA", "YES"),
    ("LUA_COMPILER", "YES"),
    ("MULTIMODULE", "YES"),
    ("PPM_CENTER_ADJUSTABLE", "YES"),
    ("PPM_UNIT", "US"),
    ("RAS", "YES"),
    ("DISABLE_COMPANION", "YES"),
    ("CMAKE_BUILD_TYPE", "Release"),
];

const JUMPER_T16: Options = &[
    ("JUMPER_RELEASE", "YES"),
    ("GUI", "YES"),
    ("GVARS", "YES"),
    ("HELI", "YES"),
    ("LUA", "YES"),
    ("LUA_COMPILER", "YES"),
    ("MULTIMODULE", "YES"),
    ("PPM_CENTER_ADJUSTABLE", "YES"),
    ("PPM_UNIT", "US"),
    ("RAS", "YES"),
    ("DISABLE_COMPANION", "YES"),
    ("CMAKE_BUILD_TYPE", "Release"),
    ("HARDWARE_INTERNAL_MODULE", "OFF"),
    ("INTERNAL_MODULE_MULTI", "YES"),
];

const JUMPER_T18: Options = &[
    ("JUMPER_RELEASE", "YES"),
    ("GUI", "YES"),
    ("GVARS", "YES"),
    ("HELI", "YES"),
    ("LUA", "YES"),
    ("LUA_COMPILER", "YES"),
    ("MULTIMODULE", "YES"),
    ("PPM_CENTER_ADJUSTABLE", "YES"),
    ("PPM_UNIT", "US"),
    ("RAS", "YES"),
    ("DISABLE_COMPANION", "YES"),
    ("CMAKE_BUILD_TYPE", "Release"),
    ("INTERNAL_MODULE_MULTI", "YES"),
];

const RADIOMASTER_TX16S: Options = &[
    ("GUI", "YES"),
    ("GVARS", "YES"),
    ("HELI", "YES"),
    ("LUA", "YES"),
    ("LUA_COMPILER", "YES"),
    ("MULTIMODULE", "YES"),
    ("PPM_CENTER_ADJUSTABLE", "YES"),
    ("PPM_UNIT", "US"),
    ("RAS", "YES"),
    ("DISABLE_COMPANION", "YES"),
    ("CMAKE_BUILD_TYPE", "Release"),
    ("INTERNAL_MODULE_MULTI", "YES"),
];

const fn board(
    key: &'static str,
    pcb: &'static str,
    pcbrev: Option<&'static str>,
    board_options: Options,
    family: Options,
    size_budget: u64,
) -> BoardSpec {
    BoardSpec {
        key,
        pcb,
        pcbrev,
        board_options,
        family,
        size_budget: Some(size_budget),
    }
}

/// Every supported board, keyed by its lower-case board name.
pub static BOARDS: &[BoardSpec] = &[
    board("sky9x", "SKY9X", None, &[], SKY9X, KIB_256),
    board("9xrpro", "9XRPRO", None, &[("SDCARD", "YES")], SKY9X, KIB_256),
    board("ar9x", "AR9X", None, &[("SDCARD", "YES")], AR9X, KIB_256),
    board("x9lite", "X9LITE", None, &[], TARANIS_X9LITE, KIB_512),
    board("x9lites", "X9LITES", None, &[], TARANIS_X9LITE, KIB_512),
    board("x7", "X7", Some("X7"), &[], TARANIS_X9DP, KIB_512),
    board("x7access", "X7", Some("ACCESS"), &[], TARANIS_X9DP, KIB_512),
    board("xlite", "XLITE", None, &[], TARANIS_XLITE, KIB_512),
    board("xlites", "XLITES", None, &[], TARANIS_XLITES, KIB_512),
    board("x9d", "X9D", None, &[], TARANIS_X9D, KIB_512),
    board("x9d+", "X9D+", None, &[], TARANIS_X9DP, KIB_512),
    board("x9d+2019", "X9D+", Some("2019"), &[], TARANIS_X9DP, KIB_512),
    board("x9e", "X9E", None, &[], TARANIS_X9E, KIB_512),
    board("x10", "X10", None, &[], HORUS, MIB_2),
    board("x10express", "X10", Some("EXPRESS"), &[], HORUS, MIB_2),
    board("x12s", "X12S", None, &[], HORUS, MIB_2),
    board("t12", "X7", Some("T12"), &[], JUMPER_T12, KIB_512),
    board("t16", "X10", Some("T16"), &[], JUMPER_T16, MIB_2),
    board("tx16s", "X10", Some("TX16S"), &[], RADIOMASTER_TX16S, MIB_2),
    board("t18", "X10", Some("T18"), &[], JUMPER_T18, MIB_2),
];

impl BoardSpec {
    fn default_options(&self) -> OptionMap {
        let mut options = OptionMap::new();
        options.insert(BOARD_FAMILY_KEY, self.pcb);
        if let Some(rev) = self.pcbrev {
            options.insert(BOARD_REVISION_KEY, rev);
        }
        for (k, v) in self.board_options.iter().chain(self.family.iter()) {
            options.insert(*k, *v);
        }
        options
    }

    fn matches_identity(&self, pcb: &str, pcbrev: Option<&str>) -> bool {
        let rev_matches = match (self.pcbrev, pcbrev) {
            (None, None) => true,
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        };
        self.pcb.eq_ignore_ascii_case(pcb) && rev_matches
    }

    fn to_profile(&self) -> BoardProfile {
        BoardProfile {
            board_id: self.key.to_string(),
            default_options: self.default_options(),
            size_budget_bytes: self.size_budget,
            known: true,
        }
    }
}

/// The default option set and size budget for one board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardProfile {
    /// Board key as resolved (lower-case for known boards).
    pub board_id: String,

    /// Default options in emission order.
    pub default_options: OptionMap,

    /// Maximum firmware size in bytes; `None` when no budget is known.
    pub size_budget_bytes: Option<u64>,

    /// False for the generic fallback profile.
    pub known: bool,
}

impl BoardProfile {
    /// Resolve a board identifier, falling back to the generic profile.
    ///
    /// Matching is case-insensitive. An unknown identifier is not an error:
    /// the generic profile is returned with `known == false`.
    pub fn resolve(board_id: &str) -> BoardProfile {
        Self::lookup(board_id).unwrap_or_else(|| Self::generic(board_id))
    }

    /// Look up a known board by identifier.
    pub fn lookup(board_id: &str) -> Option<BoardProfile> {
        let key = board_id.trim().to_ascii_lowercase();
        BOARDS
            .iter()
            .find(|spec| spec.key == key)
            .map(BoardSpec::to_profile)
    }

    /// Find the known board whose identity matches `PCB` / `PCBREV`.
    pub fn by_identity(pcb: &str, pcbrev: Option<&str>) -> Option<BoardProfile> {
        BOARDS
            .iter()
            .find(|spec| spec.matches_identity(pcb, pcbrev))
            .map(BoardSpec::to_profile)
    }

    /// The board-agnostic fallback profile.
    pub fn generic(board_id: &str) -> BoardProfile {
        let board_id = if board_id.trim().is_empty() {
            GENERIC_BOARD_ID.to_string()
        } else {
            board_id.trim().to_string()
        };
        BoardProfile {
            board_id,
            default_options: GENERIC.iter().copied().collect(),
            size_budget_bytes: None,
            known: false,
        }
    }

    /// All known boards in table order.
    pub fn all() -> impl Iterator<Item = BoardProfile> {
        BOARDS.iter().map(BoardSpec::to_profile)
    }

    pub fn pcb(&self) -> Option<&str> {
        self.default_options.get(BOARD_FAMILY_KEY)
    }

    pub fn pcbrev(&self) -> Option<&str> {
        self.default_options.get(BOARD_REVISION_KEY)
    }
}

/// True for the options that name the board itself.
pub fn is_identity_key(key: &str) -> bool {
    key == BOARD_FAMILY_KEY || key == BOARD_REVISION_KEY
}
