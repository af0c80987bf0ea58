//! Declaring stores from YAML and TOML schema files.

use snipconf::config::load_schema;
use snipconf::error::ConfError;
use snipconf::snippet::Value;

use crate::common::fixtures::{general_store, Workspace};
use crate::common::init_test_logging;

#[test]
fn toml_schema_matches_code_declared_store() {
    init_test_logging();
    let ws = Workspace::new();
    let schema = load_schema(ws.general_schema()).unwrap();
    let store = schema.into_store().unwrap();

    assert_eq!(store.get_str("HOTKEY").unwrap(), "F1");
    let add = store.get_snippet("add").unwrap();
    assert_eq!(add.call(&[2.into(), 3.into()]).unwrap(), Value::Int(5));

    // The "General" section renders exactly as the code-declared one.
    let from_file = store.serialize();
    let from_code = general_store().serialize();
    assert!(from_file.starts_with(&from_code));
    assert!(from_file.contains(concat!(
        "# adds two numbers (PARAMS: a, b)\n",
        "add = \"\"\"return a + b\"\"\"\n",
    )));
}

#[test]
fn yaml_schema_loads_and_reconciles() {
    let ws = Workspace::new();
    let schema_path = ws.write(
        "schema.yaml",
        r#"
sections:
  - name: Network
    entries:
      - key: PORT
        default: 8080
        comment: listen port
      - key: scale
        snippet: |-
          factor = 2
          return x * factor
        params: [x]
"#,
    );
    let mut store = load_schema(&schema_path).unwrap().into_store().unwrap();
    let cfg = ws.write("net.cfg", "PORT = 9000\n");

    let report = store.load_and_update(&cfg).unwrap();
    assert_eq!(report.filled, vec!["scale".to_string()]);
    assert_eq!(store.get_int("PORT").unwrap(), 9000);
    let scale = store.get_snippet("scale").unwrap();
    assert_eq!(scale.call(&[Value::Float(1.5)]).unwrap(), Value::Float(3.0));
    assert!(ws
        .read("net.cfg")
        .contains("scale = \"\"\"factor = 2\nreturn x * factor\"\"\"\n"));
}

#[test]
fn duplicate_key_in_schema_file_is_rejected() {
    let ws = Workspace::new();
    let schema_path = ws.write(
        "schema.toml",
        r#"
[[section]]
name = "A"
[[section.entry]]
key = "X"
default = 1

[[section]]
name = "B"
[[section.entry]]
key = "X"
default = 2
"#,
    );
    let err = load_schema(&schema_path).unwrap().into_store().unwrap_err();
    assert!(matches!(
        &err,
        ConfError::DuplicateKey { key, section } if key == "X" && section == "A"
    ));
}

#[test]
fn missing_schema_file_is_an_io_error() {
    let ws = Workspace::new();
    let err = load_schema(ws.path("nope.toml")).unwrap_err();
    assert!(matches!(err, ConfError::Io { .. }));
}
