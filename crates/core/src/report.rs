// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage payload value types: plans, command results, and test reports.

use serde::{Deserialize, Serialize};

/// A plan produced by the planner role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<String>,
    pub files_to_modify: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
}

/// Result of executing one gated command in the sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
    /// True when a resource ceiling (wall clock) killed the process.
    pub killed: bool,
}

impl ExecResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.killed
    }
}

/// Result of evaluating the template's test suite in the sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRunResult {
    pub passed: u32,
    pub failed: u32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl TestRunResult {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn total(&self) -> u32 {
        self.passed + self.failed
    }
}

/// Overall status of a test report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Passed,
    Failed,
    Partial,
}

crate::simple_display! {
    TestStatus {
        Passed => "passed",
        Failed => "failed",
        Partial => "partial",
    }
}

/// Structured report produced by the tester role from a test run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestReport {
    pub summary: String,
    pub passed: u32,
    pub failed: u32,
    pub status: TestStatus,
}

impl TestReport {
    /// All asserted acceptance criteria pass.
    pub fn is_pass(&self) -> bool {
        self.status == TestStatus::Passed && self.failed == 0
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
