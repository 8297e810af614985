// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn run_id_has_prefix() {
    let id = RunId::generate();
    assert!(id.as_str().starts_with("run-"));
}

#[test]
fn run_ids_are_unique() {
    let a = RunId::generate();
    let b = RunId::generate();
    assert_ne!(a, b);
}

#[test]
fn task_id_round_trips_caller_string() {
    let id = TaskId::from_string("t1");
    assert_eq!(id.as_str(), "t1");
    assert_eq!(id.to_string(), "t1");
    assert_eq!(id, "t1");
}

#[test]
fn task_id_serde_is_transparent() {
    let id = TaskId::from_string("my-task");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"my-task\"");

    let parsed: TaskId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn short_truncates() {
    assert_eq!(short("abcdef", 3), "abc");
    assert_eq!(short("ab", 3), "ab");
    assert_eq!(short("", 3), "");
}

#[test]
fn empty_id_detected() {
    assert!(TaskId::from_string("").is_empty());
    assert!(!RunId::generate().is_empty());
}
