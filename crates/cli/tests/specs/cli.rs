// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use assert_cmd::Command;
use tempfile::tempdir;

fn mend(state_dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("mend").expect("mend binary built");
    cmd.env_remove("MEND_API_KEY");
    cmd.arg("--state-dir").arg(state_dir);
    cmd
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn run_drives_a_react_task_to_done() {
    let dir = tempdir().unwrap();

    let output = mend(dir.path())
        .args(["run", "--task", "t1", "--template", "react", "--instruction", "add division"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout_of(&output).contains("done"));

    // State survives into a second invocation
    let output = mend(dir.path()).args(["status", "t1"]).output().unwrap();
    assert!(output.status.success());
    let text = stdout_of(&output);
    assert!(text.contains("done"), "status output: {text}");
}

#[test]
fn events_are_ordered_and_replayable() {
    let dir = tempdir().unwrap();

    let output = mend(dir.path())
        .args(["run", "--task", "t1", "--template", "flask", "--instruction", "add sum endpoint"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let output = mend(dir.path()).args(["events", "t1"]).output().unwrap();
    assert!(output.status.success());
    let text = stdout_of(&output);
    let order = ["created", "planning", "coding", "patching", "testing", "done"];
    let mut last = 0;
    for stage in order {
        let pos = text.find(stage).unwrap_or_else(|| panic!("missing stage {stage}"));
        assert!(pos >= last, "stage {stage} out of order");
        last = pos;
    }

    // events --json emits one JSON object per line
    let output = mend(dir.path())
        .args(["--format", "json", "events", "t1"])
        .output()
        .unwrap();
    for line in stdout_of(&output).lines() {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["task_id"], "t1");
    }
}

#[test]
fn replay_matches_the_original_event_stream() {
    let dir = tempdir().unwrap();

    let output = mend(dir.path())
        .args(["run", "--task", "t1", "--template", "express", "--instruction", "add health check"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let status = mend(dir.path())
        .args(["--format", "json", "status", "t1"])
        .output()
        .unwrap();
    let task: serde_json::Value =
        serde_json::from_slice(&status.stdout).expect("status emits JSON");
    let run_id = task["run_id"].as_str().unwrap().to_string();

    let first = mend(dir.path()).args(["replay", "t1", &run_id]).output().unwrap();
    let second = mend(dir.path()).args(["replay", "t1", &run_id]).output().unwrap();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn unknown_template_fails_fast() {
    let dir = tempdir().unwrap();

    let output = mend(dir.path())
        .args(["run", "--task", "t1", "--template", "django", "--instruction", "x"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("template not found"));

    // Nothing was recorded for the rejected submission
    let output = mend(dir.path()).args(["events", "t1"]).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn health_reports_store_state() {
    let dir = tempdir().unwrap();

    let output = mend(dir.path())
        .args(["run", "--task", "t1", "--template", "react", "--instruction", "add division"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let output = mend(dir.path())
        .args(["--format", "json", "health"])
        .output()
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["status"], "ok");
    assert_eq!(value["tasks"], 1);
    assert_eq!(value["active"], 0);
    assert!(value["wal_seq"].as_u64().unwrap() >= 6);
}

#[test]
fn metrics_accumulate_across_runs() {
    let dir = tempdir().unwrap();

    for task in ["a", "b"] {
        let output = mend(dir.path())
            .args(["run", "--task", task, "--template", "react", "--instruction", "add division"])
            .output()
            .unwrap();
        assert!(output.status.success());
    }

    let output = mend(dir.path())
        .args(["--format", "json", "metrics"])
        .output()
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["total_tasks"], 2);
    assert_eq!(value["successful_tasks"], 2);
}
