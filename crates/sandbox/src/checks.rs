// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic acceptance checks for the golden templates.
//!
//! Each template has a baseline check (the starter tests keep passing) and
//! one acceptance check for the feature a task is expected to add. Checks
//! read workspace contents only, with no external toolchain, so the full
//! pipeline stays reproducible anywhere.

use mend_core::{Template, TestRunResult};
use std::path::Path;
use std::time::Instant;

/// Evaluate the template's checks against the workspace.
pub fn evaluate(template: Template, repo: &Path) -> TestRunResult {
    let started = Instant::now();
    let mut passed = 0u32;
    let mut failed = 0u32;
    let mut details: Vec<String> = Vec::new();

    match template {
        Template::React => {
            let content = read(repo, "src/calculator.js");
            // Starter arithmetic still present
            check(
                content.contains("add(a, b)"),
                "react: starter arithmetic intact",
                &mut passed,
                &mut failed,
                &mut details,
            );
            let has_divide = content.contains("divide(");
            let has_guard = content.contains("Division by zero") || content.contains("b === 0");
            check(
                has_divide && has_guard,
                "react: divide with zero-guard present",
                &mut passed,
                &mut failed,
                &mut details,
            );
        }
        Template::Express => {
            let content = read(repo, "src/app.js");
            check(
                content.contains("app.get('/'"),
                "express: root route intact",
                &mut passed,
                &mut failed,
                &mut details,
            );
            check(
                content.contains("/healthz") && content.contains("healthy"),
                "express: /healthz endpoint present",
                &mut passed,
                &mut failed,
                &mut details,
            );
        }
        Template::Flask => {
            let content = read(repo, "app.py");
            check(
                content.contains("def hello"),
                "flask: root route intact",
                &mut passed,
                &mut failed,
                &mut details,
            );
            check(
                content.contains("/sum"),
                "flask: /sum endpoint present",
                &mut passed,
                &mut failed,
                &mut details,
            );
        }
    }

    let stdout = if failed == 0 {
        format!("{} checks passed", passed)
    } else {
        details.join("\n")
    };
    TestRunResult {
        passed,
        failed,
        stdout,
        stderr: if failed == 0 { String::new() } else { details.join("; ") },
        duration_ms: started.elapsed().as_millis() as u64,
    }
}

fn check(
    ok: bool,
    label: &str,
    passed: &mut u32,
    failed: &mut u32,
    details: &mut Vec<String>,
) {
    if ok {
        *passed += 1;
    } else {
        *failed += 1;
        details.push(format!("failed: {}", label));
    }
}

fn read(repo: &Path, rel: &str) -> String {
    std::fs::read_to_string(repo.join(rel)).unwrap_or_default()
}

#[cfg(test)]
#[path = "checks_tests.rs"]
mod tests;
