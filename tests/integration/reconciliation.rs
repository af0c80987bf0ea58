//! Reconciling a config file against the declared schema.

use snipconf::config::{ConfigStore, ConfigValue};
use snipconf::error::ConfError;

use crate::common::fixtures::{general_store, mixed_store, Workspace};
use crate::common::init_test_logging;

#[test]
fn missing_keys_are_filled_and_written_back() {
    init_test_logging();
    let ws = Workspace::new();
    let path = ws.write("settings.cfg", "HOTKEY = F5\n");
    let mut store = general_store();

    let report = store.load_and_update(&path).unwrap();
    assert_eq!(report.filled, vec!["save_screenshot".to_string()]);
    assert!(report.rewritten);
    assert_eq!(store.get_str("HOTKEY").unwrap(), "F5");

    let text = ws.read("settings.cfg");
    assert!(text.contains("HOTKEY = F5\n"));
    assert!(text.contains("save_screenshot = False\n"));
}

#[test]
fn undeclared_keys_are_dropped_from_store_and_file() {
    init_test_logging();
    let ws = Workspace::new();
    let path = ws.write(
        "settings.cfg",
        "HOTKEY = F1\nsave_screenshot = True\nLEGACY_OPTION = 7\n",
    );
    let mut store = general_store();

    let report = store.load_and_update(&path).unwrap();
    assert_eq!(report.dropped, vec!["LEGACY_OPTION".to_string()]);
    assert!(report.rewritten);
    assert!(matches!(
        store.get("LEGACY_OPTION"),
        Err(ConfError::UnknownKey { .. })
    ));
    assert!(store.get_bool("save_screenshot").unwrap());
    assert!(!ws.read("settings.cfg").contains("LEGACY_OPTION"));
}

#[test]
fn boolean_text_is_true_only_for_exact_true() {
    let ws = Workspace::new();
    let mut store = mixed_store();

    let path = ws.write("settings.cfg", "HOTKEY_ENABLED = false\n");
    store.load_and_update(&path).unwrap();
    assert!(!store.get_bool("HOTKEY_ENABLED").unwrap());

    ws.write("settings.cfg", "HOTKEY_ENABLED = yes\n");
    store.load_and_update(&path).unwrap();
    assert!(!store.get_bool("HOTKEY_ENABLED").unwrap());

    ws.write("settings.cfg", "HOTKEY_ENABLED = True\n");
    store.load_and_update(&path).unwrap();
    assert!(store.get_bool("HOTKEY_ENABLED").unwrap());
}

#[test]
fn stray_lines_are_discarded() {
    let ws = Workspace::new();
    let path = ws.write(
        "settings.cfg",
        "# a comment\nthis line means nothing\nHOTKEY = F2\nsave_screenshot = False\n",
    );
    let mut store = general_store();

    let report = store.load_and_update(&path).unwrap();
    assert_eq!(report.stray_lines, vec![2]);
    assert!(report.rewritten);
    assert!(!ws.read("settings.cfg").contains("means nothing"));
    assert_eq!(store.get_str("HOTKEY").unwrap(), "F2");
}

#[test]
fn unparseable_number_fails_and_leaves_file_alone() {
    let ws = Workspace::new();
    let original = "COUNT = lots\n";
    let path = ws.write("settings.cfg", original);
    let mut store = mixed_store();

    let err = store.load_and_update(&path).unwrap_err();
    assert!(matches!(
        &err,
        ConfError::Coercion { key, kind: "int", .. } if key == "COUNT"
    ));
    assert!(err.is_user_recoverable());
    assert_eq!(ws.read("settings.cfg"), original);
    assert_eq!(store.get_int("COUNT").unwrap(), 1);
}

#[test]
fn repeated_key_keeps_last_value() {
    let ws = Workspace::new();
    let path = ws.write(
        "settings.cfg",
        "HOTKEY = F1\nHOTKEY = F9\nsave_screenshot = False\n",
    );
    let mut store = general_store();
    store.load_and_update(&path).unwrap();
    assert_eq!(store.get_str("HOTKEY").unwrap(), "F9");
}

#[test]
fn declaring_after_build_requires_rebuild() {
    let ws = Workspace::new();
    let mut store = general_store();
    store
        .add_section("Extra")
        .add_entry("RETRIES", 3, "")
        .unwrap();
    assert!(matches!(
        store.load_and_update(ws.path("settings.cfg")),
        Err(ConfError::NotBuilt)
    ));

    store.build();
    store.load_and_update(ws.path("settings.cfg")).unwrap();
    assert_eq!(store.get_int("RETRIES").unwrap(), 3);
}

#[test]
fn duplicate_declaration_is_rejected() {
    let mut store = ConfigStore::new();
    store.add_section("A").add_entry("KEY", 1, "").unwrap();
    let err = store
        .add_section("B")
        .add_entry("KEY", "x", "")
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(err, ConfError::DuplicateKey { .. }));
    store.build();
    assert_eq!(store.get("KEY").unwrap(), &ConfigValue::from(1));
}
