// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn exec_result_success_requires_zero_exit_and_no_kill() {
    let ok = ExecResult {
        exit_code: 0,
        stdout: String::new(),
        stderr: String::new(),
        duration_ms: 5,
        killed: false,
    };
    assert!(ok.success());

    let killed = ExecResult { killed: true, ..ok.clone() };
    assert!(!killed.success());

    let nonzero = ExecResult { exit_code: 1, ..ok };
    assert!(!nonzero.success());
}

#[test]
fn test_run_pass_detection() {
    let run = TestRunResult {
        passed: 2,
        failed: 0,
        stdout: String::new(),
        stderr: String::new(),
        duration_ms: 1,
    };
    assert!(run.all_passed());
    assert_eq!(run.total(), 2);
}

#[test]
fn report_pass_requires_passed_status_and_zero_failures() {
    let pass = TestReport {
        summary: "ok".to_string(),
        passed: 2,
        failed: 0,
        status: TestStatus::Passed,
    };
    assert!(pass.is_pass());

    let partial = TestReport { status: TestStatus::Partial, ..pass.clone() };
    assert!(!partial.is_pass());

    let inconsistent = TestReport { failed: 1, ..pass };
    assert!(!inconsistent.is_pass());
}

#[test]
fn plan_serde_omits_missing_estimate() {
    let plan = Plan {
        steps: vec!["add divide".to_string()],
        files_to_modify: vec!["src/calculator.js".to_string()],
        estimated_time: None,
    };
    let json = serde_json::to_string(&plan).unwrap();
    assert!(!json.contains("estimated_time"));
    let parsed: Plan = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, plan);
}
