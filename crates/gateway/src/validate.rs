// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Strict validation of completion responses, per role.
//!
//! Plan and report responses must be structured JSON (with a salvage pass
//! that extracts the outermost braces from chatty output); coder responses
//! must be a unified diff terminated by a `COMMIT:` marker line. A
//! validation failure carries the reason so a corrective retry can quote it
//! back to the service.

use mend_core::{Plan, TestReport, TestStatus};

/// Validate a planner response.
pub fn plan(raw: &str) -> Result<Plan, String> {
    let value = extract_json(raw).ok_or("response is not a JSON object")?;
    let steps = string_array(&value, "steps")?;
    let files = string_array(&value, "files_to_modify")?;
    if steps.is_empty() {
        return Err("steps must not be empty".to_string());
    }
    Ok(Plan {
        steps,
        files_to_modify: files,
        estimated_time: value
            .get("estimated_time")
            .and_then(|v| v.as_str())
            .map(String::from),
    })
}

/// Validate a coder response: unified diff + commit marker.
pub fn patch(raw: &str) -> Result<String, String> {
    let text = strip_fences(raw);
    let has_old = text.lines().any(|l| l.starts_with("--- "));
    let has_new = text.lines().any(|l| l.starts_with("+++ "));
    let has_hunk = text.lines().any(|l| l.starts_with("@@"));
    if !has_old || !has_new || !has_hunk {
        return Err("response is not a unified diff".to_string());
    }
    if !text.lines().any(|l| l.starts_with("COMMIT:")) {
        return Err("diff is missing the COMMIT: marker line".to_string());
    }
    Ok(text)
}

/// Validate a tester response.
pub fn report(raw: &str) -> Result<TestReport, String> {
    let value = extract_json(raw).ok_or("response is not a JSON object")?;
    let summary = value
        .get("summary")
        .and_then(|v| v.as_str())
        .ok_or("missing summary")?
        .to_string();
    let status = match value.get("status").and_then(|v| v.as_str()) {
        Some("passed") => TestStatus::Passed,
        Some("failed") => TestStatus::Failed,
        Some("partial") => TestStatus::Partial,
        Some(other) => return Err(format!("unknown status: {}", other)),
        None => return Err("missing status".to_string()),
    };
    Ok(TestReport {
        summary,
        passed: count(&value, "passed"),
        failed: count(&value, "failed"),
        status,
    })
}

/// Parse the whole response as JSON, or salvage the outermost `{...}` span
/// from chatty output.
fn extract_json(raw: &str) -> Option<serde_json::Value> {
    let trimmed = strip_fences(raw);
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&trimmed) {
        return value.is_object().then_some(value);
    }
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&trimmed[start..=end]).ok()
}

/// Drop markdown code fences that chat services like to wrap output in.
fn strip_fences(raw: &str) -> String {
    raw.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn string_array(value: &serde_json::Value, key: &str) -> Result<Vec<String>, String> {
    let array = value
        .get(key)
        .and_then(|v| v.as_array())
        .ok_or_else(|| format!("missing array field: {}", key))?;
    Ok(array
        .iter()
        .filter_map(|v| v.as_str())
        .map(String::from)
        .collect())
}

fn count(value: &serde_json::Value, key: &str) -> u32 {
    value.get(key).and_then(|v| v.as_u64()).unwrap_or(0) as u32
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
