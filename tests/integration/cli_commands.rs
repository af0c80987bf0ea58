//! End-to-end tests of the `snipconf` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use snipconf::config::BANNER_RULE;

use crate::common::cli::CliRunner;
use crate::common::fixtures::Workspace;

fn snipconf() -> Command {
    let mut cmd = Command::cargo_bin("snipconf").expect("binary built");
    cmd.env_remove("SNIPCONF_SCHEMA")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn load_creates_config_and_lists_values() {
    let ws = Workspace::new();
    let cli = CliRunner::new().with_schema(&ws.general_schema());
    let cfg = ws.path("settings.cfg");
    let cfg_arg = cfg.display().to_string();

    cli.run(&["load", &cfg_arg])
        .assert_success()
        .assert_stdout_contains("Created")
        .assert_stdout_matches(r"HOTKEY\s+=\s+F1")
        .assert_stdout_matches(r"save_screenshot\s+=\s+False");
    assert!(ws.read("settings.cfg").contains("# hotkey (DEFAULT: F1)"));
}

#[test]
fn load_robot_reports_filled_keys() {
    let ws = Workspace::new();
    let cli = CliRunner::new().with_schema(&ws.general_schema());
    let cfg = ws.write("settings.cfg", "HOTKEY = F3\nold_key = 1\n");
    let cfg_arg = cfg.display().to_string();

    let result = cli.run_robot(&["load", &cfg_arg]);
    result
        .assert_success()
        .assert_json_field("/report/created", &json!(false))
        .assert_json_field("/report/rewritten", &json!(true))
        .assert_json_field("/report/dropped", &json!(["old_key"]))
        .assert_json_field("/values/0/key", &json!("HOTKEY"))
        .assert_json_field("/values/0/value", &json!("F3"));

    let filled = result.json()["report"]["filled"].clone();
    assert_eq!(filled, json!(["save_screenshot", "add"]));
}

#[test]
fn get_prints_one_value() {
    let ws = Workspace::new();
    let cli = CliRunner::new().with_schema(&ws.general_schema());
    let cfg = ws.write("settings.cfg", "save_screenshot = True\n");
    let cfg_arg = cfg.display().to_string();

    cli.run_robot(&["get", &cfg_arg, "save_screenshot"])
        .assert_success()
        .assert_json_field("/kind", &json!("bool"))
        .assert_json_field("/value", &json!(true));
}

#[test]
fn call_runs_snippet_with_literal_args() {
    let ws = Workspace::new();
    let cli = CliRunner::new().with_schema(&ws.general_schema());
    let cfg_arg = ws.path("settings.cfg").display().to_string();

    cli.run_robot(&["call", &cfg_arg, "add", "2", "3"])
        .assert_success()
        .assert_json_field("/result", &json!(5))
        .assert_json_field("/type", &json!("int"));

    cli.run(&["call", &cfg_arg, "add", "'snip'", "conf"])
        .assert_success()
        .assert_stdout_contains("snipconf");
}

#[test]
fn unknown_key_fails_with_hint() {
    let ws = Workspace::new();
    let cli = CliRunner::new().with_schema(&ws.general_schema());
    let cfg_arg = ws.path("settings.cfg").display().to_string();

    cli.run(&["get", &cfg_arg, "NOPE"])
        .assert_failure()
        .assert_stderr_contains("Error: Unknown configuration key: NOPE")
        .assert_stderr_contains("Hint:");
}

#[test]
fn robot_errors_are_json_on_stderr() {
    let ws = Workspace::new();
    let cli = CliRunner::new().with_schema(&ws.general_schema());
    let cfg = ws.write("settings.cfg", "add = \"\"\"return a +\n");
    let cfg_arg = cfg.display().to_string();

    let result = cli.run_robot(&["load", &cfg_arg]);
    result.assert_failure();
    let err = result.stderr_json();
    assert_eq!(err["error"], json!(true));
    assert_eq!(err["recoverable"], json!(true));
    assert!(err["message"].as_str().unwrap().contains("settings.cfg:1"));
}

#[test]
fn render_prints_defaults_without_touching_disk() {
    let ws = Workspace::new();
    let schema = ws.general_schema();

    snipconf()
        .arg("--schema")
        .arg(&schema)
        .arg("render")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!(
            "{BANNER_RULE}\n# General\n"
        )))
        .stdout(predicate::str::contains("HOTKEY = F1\n"));
    assert!(!ws.path("settings.cfg").exists());
}

#[test]
fn commands_needing_a_schema_fail_without_one() {
    snipconf()
        .arg("render")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No schema given"))
        .stderr(predicate::str::contains("SNIPCONF_SCHEMA"));
}

#[test]
fn check_snippet_reports_compile_errors() {
    snipconf()
        .args(["check-snippet", "--params", "a,b", "return a + b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("params: a, b"));

    snipconf()
        .args(["check-snippet", "--params", "a", "return a + c"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'c'"));
}

#[test]
fn version_and_completions() {
    CliRunner::new()
        .run_robot(&["version"])
        .assert_success()
        .assert_json_field("/version", &json!(env!("CARGO_PKG_VERSION")));

    snipconf()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("snipconf"));
}
