//! Board resolution and option merge scenarios
//!
//! End-to-end checks of `resolve_and_merge` through the public crate API,
//! including the cmake argument list handed to the configure step.

use fw_build::config::EffectiveSettings;
use fw_build::invoke::configure_command;
use fw_build::pipeline::resolve;
use fw_build::{resolve_and_merge, BoardProfile, ExitCode, ResolveError, ResolveRequest};
use fw_options::{Language, MergeNotice, OverrideSet};

fn request(board: &str, flags: &str) -> ResolveRequest {
    ResolveRequest::from_flags(Some(board), flags).unwrap()
}

// =============================================================================
// Override merging
// =============================================================================

#[test]
fn test_x9dp_overrides_and_extras() {
    let resolution = resolve_and_merge(&request("x9d+", "LUA=YES GVARS=NO CUSTOMFLAG=1")).unwrap();
    let merged = &resolution.merged;

    assert_eq!(merged.final_options.get("LUA"), Some("YES"));
    assert_eq!(merged.final_options.get("GVARS"), Some("NO"));
    assert!(!merged.final_options.contains_key("CUSTOMFLAG"));
    assert_eq!(merged.extra_options.get("CUSTOMFLAG"), Some("1"));

    assert_eq!(
        merged.notices,
        vec![
            MergeNotice::Overridden {
                key: "LUA".into(),
                from: "NO".into(),
                to: "YES".into(),
            },
            MergeNotice::Overridden {
                key: "GVARS".into(),
                from: "YES".into(),
                to: "NO".into(),
            },
            MergeNotice::Added {
                key: "CUSTOMFLAG".into(),
                value: "1".into(),
            },
        ]
    );

    let args = resolution.configure_args();
    assert_eq!(args[0], "-DPCB=X9D+");
    assert_eq!(args.last().map(String::as_str), Some("-DCUSTOMFLAG=1"));
    // Defaults keep their position even when overridden.
    let lua = args.iter().position(|a| a == "-DLUA=YES").unwrap();
    let gui = args.iter().position(|a| a == "-DGUI=YES").unwrap();
    assert!(gui < lua);
}

#[test]
fn test_override_matching_default_is_reported() {
    let resolution = resolve_and_merge(&request("x9d+", "GVARS=YES PCB=X9D+")).unwrap();

    assert_eq!(
        resolution.merged.notices,
        vec![MergeNotice::MatchesDefault {
            key: "GVARS".into(),
            value: "YES".into(),
        }]
    );
    assert_eq!(resolution.merged.final_options, resolution.profile.default_options);
}

#[test]
fn test_identity_override_changes_effective_board() {
    let resolution = resolve_and_merge(&request("t16", "PCB=X7")).unwrap();

    assert_eq!(resolution.profile.board_id, "t16");
    assert_eq!(resolution.merged.final_options.get("PCB"), Some("X7"));
    assert_eq!(resolution.merged.effective_board.as_deref(), Some("X7"));
    assert_eq!(resolution.merged.effective_board_revision.as_deref(), Some("T16"));
    assert!(resolution.effective_profile.is_none());
    assert_eq!(resolution.size_budget_bytes, None);
    assert_eq!(resolution.board_label(), "x7-t16");
}

#[test]
fn test_identity_override_to_known_board_uses_its_budget() {
    let resolution = resolve_and_merge(&request("x10", "PCB=X9E")).unwrap();

    assert_eq!(resolution.board_label(), "x9e");
    assert_eq!(resolution.size_budget_bytes, Some(512 * 1024));
}

#[test]
fn test_translations_canonicalized() {
    let resolution = resolve_and_merge(&request("x7", "TRANSLATIONS=fr")).unwrap();

    assert_eq!(resolution.translation_language(), Some(Language::Fr));
    assert_eq!(resolution.merged.extra_options.get("TRANSLATIONS"), Some("fr"));
    assert!(resolution
        .configure_args()
        .contains(&"-DTRANSLATIONS=fr".to_string()));
}

#[test]
fn test_unsupported_translation_rejected() {
    let err = resolve_and_merge(&request("x7", "TRANSLATIONS=XX")).unwrap_err();

    match &err {
        ResolveError::InvalidLanguage { value, valid } => {
            assert_eq!(value, "XX");
            assert!(valid.contains("EN"));
            assert!(valid.contains("NL"));
        }
        other => panic!("expected InvalidLanguage, got {:?}", other),
    }
}

#[test]
fn test_duplicate_override_last_wins() {
    let resolution = resolve_and_merge(&request("x9e", "CUSTOM=1 LUA=NO CUSTOM=2")).unwrap();

    assert_eq!(resolution.merged.extra_options.get("CUSTOM"), Some("2"));
    assert_eq!(resolution.merged.extra_options.len(), 1);
    assert_eq!(resolution.merged.final_options.get("LUA"), Some("NO"));
}

#[test]
fn test_malformed_override_rejected() {
    for flags in ["LUA", "=YES", "A=B=C"] {
        let err = ResolveRequest::from_flags(Some("x7"), flags).unwrap_err();
        assert!(
            matches!(err, ResolveError::MalformedOverride { .. }),
            "{}: {:?}",
            flags,
            err
        );
    }
}

// =============================================================================
// Board resolution
// =============================================================================

#[test]
fn test_missing_board() {
    let request = ResolveRequest::from_flags(None, "LUA=YES").unwrap();
    assert_eq!(resolve_and_merge(&request), Err(ResolveError::MissingBoard));

    assert_eq!(
        resolve_and_merge(&ResolveRequest::new("", OverrideSet::new())),
        Err(ResolveError::MissingBoard)
    );
}

#[test]
fn test_unknown_board_falls_back_to_generic() {
    let resolution = resolve_and_merge(&request("my-custom-radio", "PCB=X9D+")).unwrap();

    assert!(resolution.is_fallback());
    assert_eq!(
        resolution.profile.default_options,
        BoardProfile::generic("my-custom-radio").default_options
    );
    assert_eq!(resolution.merged.extra_options.get("PCB"), Some("X9D+"));
    assert_eq!(resolution.merged.effective_board.as_deref(), Some("X9D+"));
    assert_eq!(resolution.board_label(), "x9d+");
    assert_eq!(resolution.size_budget_bytes, Some(512 * 1024));
}

#[test]
fn test_board_lookup_case_insensitive() {
    let upper = resolve_and_merge(&request("X9D+", "")).unwrap();
    let lower = resolve_and_merge(&request("x9d+", "")).unwrap();

    assert!(!upper.is_fallback());
    assert_eq!(upper.merged.final_options, lower.merged.final_options);
}

#[test]
fn test_every_known_board_without_overrides_yields_defaults() {
    for profile in BoardProfile::all() {
        let resolution = resolve_and_merge(&request(&profile.board_id, "")).unwrap();

        assert_eq!(
            resolution.merged.final_options, profile.default_options,
            "{}",
            profile.board_id
        );
        assert!(resolution.merged.extra_options.is_empty());
        assert!(resolution.merged.notices.is_empty());
        assert_eq!(resolution.board_label(), profile.board_id);
        assert_eq!(resolution.size_budget_bytes, profile.size_budget_bytes);
    }
}

#[test]
fn test_budgets_by_family() {
    let budget = |board: &str| BoardProfile::lookup(board).unwrap().size_budget_bytes;

    assert_eq!(budget("sky9x"), Some(256 * 1024));
    assert_eq!(budget("x9lite"), Some(512 * 1024));
    assert_eq!(budget("x12s"), Some(2 * 1024 * 1024));
    assert_eq!(budget("tx16s"), Some(2 * 1024 * 1024));
}

// =============================================================================
// Settings-driven resolution
// =============================================================================

#[test]
fn test_resolution_from_environment_layer() {
    let effective = EffectiveSettings::build(
        None,
        |key| match key {
            "BOARD_NAME" => Some("x9d+".to_string()),
            "CMAKE_FLAGS" => Some("LUA=YES CUSTOMFLAG=1".to_string()),
            _ => None,
        },
        None,
    )
    .unwrap();

    let resolution = resolve(&effective.settings).unwrap();
    let command = configure_command(&effective.settings, &resolution);

    assert_eq!(command.program, "cmake");
    assert_eq!(command.args[0], "-DPCB=X9D+");
    assert!(command.args.contains(&"-DLUA=YES".to_string()));
    assert_eq!(command.args[command.args.len() - 2], "-DCUSTOMFLAG=1");
    assert_eq!(command.args[command.args.len() - 1], "/tmp/opentx");
}

#[test]
fn test_cli_layer_overrides_environment() {
    let effective = EffectiveSettings::build(
        None,
        |key| match key {
            "BOARD_NAME" => Some("x7".to_string()),
            _ => None,
        },
        Some(serde_json::json!({"board": "x12s", "flags": "TRANSLATIONS=de"})),
    )
    .unwrap();

    let resolution = resolve(&effective.settings).unwrap();
    assert_eq!(resolution.board, "x12s");
    assert_eq!(resolution.translation_language(), Some(Language::De));
}

#[test]
fn test_resolution_errors_map_to_exit_codes() {
    let exit = |board: Option<&str>, flags: Option<&str>| {
        let mut settings = EffectiveSettings::build(None, |_| None, None)
            .unwrap()
            .settings;
        settings.board = board.map(str::to_string);
        settings.flags = flags.map(str::to_string);
        resolve(&settings).unwrap_err().exit_code()
    };

    assert_eq!(exit(None, None), ExitCode::MissingBoard);
    assert_eq!(exit(Some("x7"), Some("TRANSLATIONS=XX")), ExitCode::InvalidLanguage);
    assert_eq!(exit(Some("x7"), Some("NOVALUE")), ExitCode::InvalidConfig);
}
