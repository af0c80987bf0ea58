//! Snippets inside config files.

use snipconf::config::ConfigStore;
use snipconf::error::ConfError;
use snipconf::snippet::{Snippet, SnippetError, Value};

use crate::common::fixtures::{mixed_store, Workspace};
use crate::common::init_test_logging;

fn add_store() -> ConfigStore {
    let mut store = ConfigStore::new();
    store
        .add_section("Formulas")
        .add_entry(
            "add",
            Snippet::new("return a + b", &["a", "b"]).unwrap(),
            "adds two numbers",
        )
        .unwrap();
    store.build();
    store
}

#[test]
fn assignments_inside_a_snippet_are_not_entries() {
    init_test_logging();
    let ws = Workspace::new();
    let path = ws.write(
        "settings.cfg",
        "SNIPPET = \"\"\"x = 1\ny = 2\nreturn x + y\"\"\"\nCOUNT = 3\n",
    );
    let mut store = mixed_store();

    let report = store.load_and_update(&path).unwrap();
    assert!(report.dropped.is_empty(), "y must not be read as a key");
    assert_eq!(store.get_int("COUNT").unwrap(), 3);
    let snippet = store.get_snippet("SNIPPET").unwrap();
    assert_eq!(snippet.call(&[]).unwrap(), Value::Int(3));

    // The multi-line body is written back verbatim.
    assert!(ws
        .read("settings.cfg")
        .contains("SNIPPET = \"\"\"x = 1\ny = 2\nreturn x + y\"\"\"\n"));
}

#[test]
fn default_snippet_is_callable() {
    let store = add_store();
    let add = store.get_snippet("add").unwrap();
    assert_eq!(add.call(&[2.into(), 3.into()]).unwrap(), Value::Int(5));
}

#[test]
fn edited_snippet_keeps_declared_params() {
    let ws = Workspace::new();
    let path = ws.write("settings.cfg", "add = \"\"\"return a * b\"\"\"\n");
    let mut store = add_store();
    store.load_and_update(&path).unwrap();

    let add = store.get_snippet("add").unwrap();
    assert_eq!(add.params(), ["a", "b"]);
    assert_eq!(add.call(&[4.into(), 5.into()]).unwrap(), Value::Int(20));
    assert!(ws
        .read("settings.cfg")
        .contains("# adds two numbers (PARAMS: a, b)\nadd = \"\"\"return a * b\"\"\"\n"));
}

#[test]
fn snippet_that_does_not_compile_names_its_key() {
    let ws = Workspace::new();
    let path = ws.write("settings.cfg", "add = \"\"\"return a +\"\"\"\n");
    let mut store = add_store();

    let err = store.load_and_update(&path).unwrap_err();
    assert!(matches!(&err, ConfError::Compile { key, .. } if key == "add"));
    assert!(err.suggestion().is_some());
}

#[test]
fn unterminated_snippet_is_a_parse_error() {
    let ws = Workspace::new();
    let path = ws.write("settings.cfg", "\n\nadd = \"\"\"return a\n");
    let mut store = add_store();

    let err = store.load_and_update(&path).unwrap_err();
    assert!(matches!(err, ConfError::Parse { line: 3, .. }));
}

#[test]
fn wrong_argument_count_is_reported() {
    let store = add_store();
    let add = store.get_snippet("add").unwrap();
    assert!(matches!(
        add.call(&[1.into()]),
        Err(SnippetError::Arity {
            expected: 2,
            actual: 1,
            ..
        })
    ));
}

#[test]
fn runtime_errors_surface_through_the_store_error() {
    let mut store = ConfigStore::new();
    store
        .add_section("Formulas")
        .add_entry(
            "ratio",
            Snippet::new("return a / b", &["a", "b"]).unwrap(),
            "",
        )
        .unwrap();
    store.build();

    let run = || -> snipconf::error::Result<Value> {
        Ok(store.get_snippet("ratio")?.call(&[1.into(), 0.into()])?)
    };
    assert!(matches!(
        run(),
        Err(ConfError::Snippet(SnippetError::DivisionByZero { .. }))
    ));
}

#[test]
fn deeply_nested_snippet_is_a_compile_error() {
    let ws = Workspace::new();
    let depth = 100_000;
    let body = format!("return {}a{}", "(".repeat(depth), ")".repeat(depth));
    let path = ws.write("settings.cfg", &format!("add = \"\"\"{body}\"\"\"\n"));
    let mut store = add_store();

    let err = store.load_and_update(&path).unwrap_err();
    assert!(matches!(
        &err,
        ConfError::Compile { key, source: SnippetError::Syntax { .. } } if key == "add"
    ));
    assert_eq!(store.get_snippet("add").unwrap().body(), "return a + b");
}

#[test]
fn oversized_string_repeat_fails_cleanly() {
    let snippet = Snippet::new("return s * n", &["s", "n"]).unwrap();
    assert!(matches!(
        snippet.call(&["ab".into(), Value::Int(i64::MAX)]),
        Err(SnippetError::Overflow { .. })
    ));
}
