//! Bundled scenarios replayed through the library and the binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use dragsort_harness::{Scenario, StepResult, run_scenario};
use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::tempdir;

fn harness_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_dragsort-harness"))
}

fn scenarios_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios")
}

fn bundled_scenarios() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = fs::read_dir(scenarios_dir())
        .expect("scenarios dir")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext == "toml" || ext == "json")
        })
        .collect();
    paths.sort();
    paths
}

fn harness(args: &[&str]) -> Output {
    Command::new(harness_bin())
        .args(args)
        .env("DRAGSORT_LOG", "off")
        .output()
        .expect("spawn harness")
}

#[test]
fn every_bundled_scenario_meets_its_expectations() {
    let paths = bundled_scenarios();
    assert!(paths.len() >= 4, "bundled scenarios missing: {paths:?}");
    for path in paths {
        let scenario = Scenario::load(&path).expect("scenario loads");
        let outcome = run_scenario(&scenario, &scenario.config).expect("scenario runs");
        assert!(
            outcome.mismatches(&scenario.expect).is_empty(),
            "{} produced {:?}",
            path.display(),
            outcome.lists
        );
        assert_eq!(outcome.lists, outcome.rendered, "{}", path.display());
    }
}

#[test]
fn isolated_groups_scenario_reports_the_rejected_scalar_drag() {
    let scenario = Scenario::load(scenarios_dir().join("isolated_groups.json")).expect("loads");
    let outcome = run_scenario(&scenario, &scenario.config).expect("runs");
    let rejected: Vec<usize> = outcome
        .steps
        .iter()
        .filter(|report| matches!(report.result, StepResult::Rejected { .. }))
        .map(|report| report.step)
        .collect();
    assert_eq!(rejected, vec![2]);
}

#[test]
fn binary_check_succeeds_on_bundled_scenario() {
    let path = scenarios_dir().join("forward_drag.toml");
    let output = harness(&["check", path.to_str().expect("utf-8 path")]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(String::from_utf8_lossy(&output.stdout), "ok: 1 list(s) match\n");
}

#[test]
fn binary_run_json_prints_final_order() {
    let path = scenarios_dir().join("backward_drag.toml");
    let output = harness(&["run", "--json", path.to_str().expect("utf-8 path")]);
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(value["lists"]["todo"], serde_json::json!(["C", "A", "B"]));
}

#[test]
fn binary_check_exits_one_on_mismatch() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("wrong.toml");
    fs::write(
        &path,
        r#"
[lists]
todo = ["A", "B", "C"]

[[steps]]
drag = { list = "todo", from = 0, over = [2] }

[expect]
todo = ["A", "B", "C"]
"#,
    )
    .expect("write scenario");
    let output = harness(&["check", path.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "todo: expected [A, B, C], got [B, C, A]\n"
    );
}

#[test]
fn binary_reports_unreadable_scenario_with_exit_two() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("missing.toml");
    let output = harness(&["run", missing.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read"));
}

#[test]
fn binary_json_errors_when_log_json_is_set() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{"lists": {}}"#).expect("write scenario");
    let output = harness(&["--log-json", "run", path.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(2));
    let line = String::from_utf8_lossy(&output.stderr);
    let value: Value = serde_json::from_str(line.trim()).expect("json error line");
    assert_eq!(value["status"], "error");
    assert_eq!(value["exit_code"], 2);
}

#[test]
fn policy_override_does_not_change_single_gesture_result() {
    let path = scenarios_dir().join("forward_drag.toml");
    for policy in ["retain", "clear-on-end"] {
        let output = harness(&[
            "run",
            "--json",
            "--policy",
            policy,
            path.to_str().expect("utf-8 path"),
        ]);
        assert!(output.status.success(), "policy {policy}");
        let value: Value = serde_json::from_slice(&output.stdout).expect("json stdout");
        assert_eq!(value["lists"]["todo"], serde_json::json!(["B", "C", "A", "D"]));
    }
}
