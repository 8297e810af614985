// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn diff_stats_net_change_can_be_negative() {
    let stats = DiffStats::new(2, 5, 1);
    assert_eq!(stats.net_change, -3);
    assert_eq!(stats.changed(), 7);
}

#[test]
fn rejected_result_has_no_applied_files() {
    let result = PatchResult::rejected(RejectReason::TooLarge {
        changed: 80,
        limit: 50,
    });
    assert!(!result.applied);
    assert!(result.applied_files.is_empty());
    assert_eq!(result.diff_stats, DiffStats::default());
    assert!(result.rejected_reason.is_some());
}

#[test]
fn reject_reason_display() {
    let protected = RejectReason::ProtectedFile {
        path: "package.json".to_string(),
    };
    assert_eq!(
        protected.to_string(),
        "patch deletes protected file: package.json"
    );

    let too_large = RejectReason::TooLarge {
        changed: 80,
        limit: 50,
    };
    assert_eq!(
        too_large.to_string(),
        "patch too large: 80 changed lines (limit 50)"
    );
}

#[test]
fn patch_result_serde_round_trip() {
    let result = PatchResult::applied(
        vec!["src/calculator.js".to_string()],
        DiffStats::new(6, 0, 1),
    );
    let json = serde_json::to_string(&result).unwrap();
    let parsed: PatchResult = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, result);
    // rejected_reason is omitted when not set
    assert!(!json.contains("rejected_reason"));
}
