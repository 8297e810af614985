// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canned per-template responses.
//!
//! Shared by the stub adapter (offline default) and the gateway's fallback
//! path, so validation exhaustion always lands on a response that parses.

use mend_core::{Plan, Template, TestReport, TestRunResult, TestStatus};

/// Files the roles are told about for each template.
pub fn relevant_files(template: Template) -> &'static [&'static str] {
    match template {
        Template::React => &["src/calculator.js", "src/calculator.test.js"],
        Template::Express => &["src/app.js", "src/app.test.js"],
        Template::Flask => &["app.py", "test_app.py"],
    }
}

/// Recover the template from a prompt context (`TEMPLATE: <name>` line).
/// Defaults to react when absent; the stub must always answer something.
pub fn template_from_context(context: &str) -> Template {
    context
        .lines()
        .find_map(|line| line.strip_prefix("TEMPLATE: "))
        .and_then(|name| Template::parse(name.trim()))
        .unwrap_or(Template::React)
}

/// Typed fallback plan for a role call that exhausted its retries.
pub fn fallback_plan(template: Template) -> Plan {
    let (steps, files) = match template {
        Template::React => (
            vec![
                "Add a divide method to the calculator",
                "Guard against division by zero",
                "Cover the new method with tests",
            ],
            relevant_files(template),
        ),
        Template::Express => (
            vec![
                "Add a /healthz endpoint",
                "Return a healthy status payload",
                "Cover the endpoint with tests",
            ],
            relevant_files(template),
        ),
        Template::Flask => (
            vec![
                "Add a /sum endpoint",
                "Sum the posted numbers",
                "Cover the endpoint with tests",
            ],
            relevant_files(template),
        ),
    };
    Plan {
        steps: steps.into_iter().map(String::from).collect(),
        files_to_modify: files.iter().map(|s| s.to_string()).collect(),
        estimated_time: Some("5 minutes".to_string()),
    }
}

/// Planner response as the raw JSON the service would produce.
pub fn plan_response(template: Template) -> String {
    let plan = fallback_plan(template);
    serde_json::json!({
        "steps": plan.steps,
        "files_to_modify": plan.files_to_modify,
        "estimated_time": plan.estimated_time,
    })
    .to_string()
}

/// Coder response: a unified diff against the starter template, terminated
/// by the COMMIT marker line.
pub fn patch_response(template: Template) -> String {
    match template {
        Template::React => r#"--- a/src/calculator.js
+++ b/src/calculator.js
@@ -9,2 +9,9 @@

+  divide(a, b) {
+    if (b === 0) {
+      throw new Error('Division by zero');
+    }
+    return a / b;
+  }
+
   multiply(a, b) {
COMMIT: Add division function with divide-by-zero guard
"#
        .to_string(),
        Template::Express => r#"--- a/src/app.js
+++ b/src/app.js
@@ -10,2 +10,7 @@

+app.get('/healthz', (req, res) => {
+  res.json({ status: 'healthy' });
+});
+
 app.listen(port, () => {
COMMIT: Add health check endpoint
"#
        .to_string(),
        Template::Flask => r#"--- a/app.py
+++ b/app.py
@@ -8,2 +8,8 @@

+@app.route('/sum', methods=['POST'])
+def sum_numbers():
+    data = request.get_json()
+    result = sum(data.get('numbers', []))
+    return jsonify({'sum': result})
+
 if __name__ == '__main__':
COMMIT: Add sum endpoint
"#
        .to_string(),
    }
}

/// Typed fallback report derived from the actual run.
pub fn fallback_report(run: &TestRunResult) -> TestReport {
    let status = if run.failed == 0 {
        TestStatus::Passed
    } else if run.passed > 0 {
        TestStatus::Partial
    } else {
        TestStatus::Failed
    };
    TestReport {
        summary: format!("{} passed, {} failed", run.passed, run.failed),
        passed: run.passed,
        failed: run.failed,
        status,
    }
}

/// Tester response echoing the pass/fail counts found in the context
/// (`PASSED: n` / `FAILED: n` lines).
pub fn report_response(context: &str) -> String {
    let passed = count_from(context, "PASSED: ");
    let failed = count_from(context, "FAILED: ");
    let run = TestRunResult {
        passed,
        failed,
        stdout: String::new(),
        stderr: String::new(),
        duration_ms: 0,
    };
    let report = fallback_report(&run);
    serde_json::json!({
        "summary": report.summary,
        "passed": report.passed,
        "failed": report.failed,
        "status": report.status,
    })
    .to_string()
}

fn count_from(context: &str, prefix: &str) -> u32 {
    context
        .lines()
        .find_map(|line| line.strip_prefix(prefix))
        .and_then(|n| n.trim().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "stub_tests.rs"]
mod tests;
