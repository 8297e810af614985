// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use mend_core::{RunId, Stage, StageData, TaskEvent, TaskId};
use tempfile::tempdir;

fn test_event(task: &str) -> TaskEvent {
    TaskEvent::new(
        TaskId::from_string(task),
        RunId::from_string("run-test"),
        0,
        1_000,
        "cancelled",
        StageData::Cancelled { during: Stage::Coding },
    )
}

#[test]
fn open_creates_file_and_parent_dir() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("events.wal");

    let wal = Wal::open(&path).unwrap();

    assert!(path.exists());
    assert_eq!(wal.write_seq(), 0);
}

#[test]
fn append_returns_monotonic_seq() {
    let dir = tempdir().unwrap();
    let mut wal = Wal::open(&dir.path().join("events.wal")).unwrap();

    assert_eq!(wal.append(&test_event("t1")).unwrap(), 1);
    assert_eq!(wal.append(&test_event("t2")).unwrap(), 2);
    assert_eq!(wal.write_seq(), 2);
}

#[test]
fn flush_makes_entries_readable() {
    let dir = tempdir().unwrap();
    let mut wal = Wal::open(&dir.path().join("events.wal")).unwrap();

    wal.append(&test_event("t1")).unwrap();
    wal.append(&test_event("t2")).unwrap();
    wal.flush().unwrap();

    let entries = wal.entries().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].seq, 1);
    assert_eq!(entries[0].event.task_id, "t1");
    assert_eq!(entries[1].seq, 2);
    assert_eq!(entries[1].event.task_id, "t2");
}

#[test]
fn reopen_resumes_sequence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.wal");

    {
        let mut wal = Wal::open(&path).unwrap();
        wal.append(&test_event("t1")).unwrap();
        wal.append(&test_event("t2")).unwrap();
        wal.flush().unwrap();
    }

    let mut wal = Wal::open(&path).unwrap();
    assert_eq!(wal.write_seq(), 2);
    assert_eq!(wal.append(&test_event("t3")).unwrap(), 3);
}

#[test]
fn entries_after_filters_by_seq() {
    let dir = tempdir().unwrap();
    let mut wal = Wal::open(&dir.path().join("events.wal")).unwrap();

    wal.append(&test_event("t1")).unwrap();
    wal.append(&test_event("t2")).unwrap();
    wal.append(&test_event("t3")).unwrap();
    wal.flush().unwrap();

    let entries = wal.entries_after(1).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].seq, 2);
    assert_eq!(entries[1].seq, 3);
}

#[test]
fn corrupt_line_is_reported_with_line_number() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.wal");

    {
        let mut wal = Wal::open(&path).unwrap();
        wal.append(&test_event("t1")).unwrap();
        wal.flush().unwrap();
    }
    // Garbage after a valid entry
    let mut existing = std::fs::read_to_string(&path).unwrap();
    existing.push_str("not json\n");
    std::fs::write(&path, existing).unwrap();

    let err = Wal::open(&path).unwrap_err();
    match err {
        WalError::Corrupt { line, .. } => assert_eq!(line, 2),
        other => panic!("expected Corrupt, got {other:?}"),
    }
}

#[test]
fn blank_lines_are_skipped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.wal");

    {
        let mut wal = Wal::open(&path).unwrap();
        wal.append(&test_event("t1")).unwrap();
        wal.flush().unwrap();
    }
    let mut existing = std::fs::read_to_string(&path).unwrap();
    existing.push('\n');
    std::fs::write(&path, existing).unwrap();

    let wal = Wal::open(&path).unwrap();
    assert_eq!(wal.entries().unwrap().len(), 1);
}
