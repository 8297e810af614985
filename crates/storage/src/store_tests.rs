// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use mend_core::{PatternKey, Plan, StageData, Template, TaskState};
use tempfile::tempdir;

fn created_event(task: &str, run: &RunId, ts: u64) -> TaskEvent {
    TaskEvent::new(
        TaskId::from_string(task),
        run.clone(),
        0,
        ts,
        "task created",
        StageData::Created {
            template: Template::React,
            instruction: "add division".to_string(),
            pattern: PatternKey::new(Template::React, "add division"),
        },
    )
}

fn done_event(task: &str, run: &RunId, ts: u64) -> TaskEvent {
    TaskEvent::new(
        TaskId::from_string(task),
        run.clone(),
        1,
        ts,
        "task done",
        StageData::Done {
            plan: Plan::default(),
            patch: "patch".to_string(),
            iterations: 1,
        },
    )
}

#[test]
fn append_is_visible_immediately() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path(), &EngineConfig::default()).unwrap();
    let run = RunId::generate();

    let seq = store.append(&created_event("t1", &run, 1_000)).unwrap();
    assert_eq!(seq, 1);

    let task = store.task(&TaskId::from_string("t1")).unwrap();
    assert_eq!(task.state, TaskState::Created);
    assert_eq!(store.events(&TaskId::from_string("t1")).len(), 1);
    assert_eq!(store.wal_seq(), 1);
}

#[test]
fn reopen_replays_tasks_memory_and_reliability() {
    let dir = tempdir().unwrap();
    let run = RunId::generate();

    {
        let store = Store::open(dir.path(), &EngineConfig::default()).unwrap();
        store.append(&created_event("t1", &run, 1_000)).unwrap();
        store.append(&done_event("t1", &run, 2_000)).unwrap();
    }

    let store = Store::open(dir.path(), &EngineConfig::default()).unwrap();
    let task = store.task(&TaskId::from_string("t1")).unwrap();
    assert_eq!(task.state, TaskState::Done);
    assert!(store
        .memory()
        .lookup(Template::React, "add division")
        .is_some());
    let record = store
        .reliability()
        .record_for(&PatternKey::new(Template::React, "add division"))
        .unwrap();
    assert_eq!(record.total_attempts, 1);
    assert_eq!(store.wal_seq(), 2);
}

#[test]
fn run_events_are_filtered_and_ordered() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path(), &EngineConfig::default()).unwrap();
    let first = RunId::generate();
    let second = RunId::generate();

    store.append(&created_event("t1", &first, 1_000)).unwrap();
    store.append(&done_event("t1", &first, 2_000)).unwrap();
    store.append(&created_event("t1", &second, 3_000)).unwrap();

    let task_id = TaskId::from_string("t1");
    assert_eq!(store.events(&task_id).len(), 3);

    let first_run = store.run_events(&task_id, &first);
    assert_eq!(first_run.len(), 2);
    assert!(first_run.windows(2).all(|w| w[0].ordering_key() <= w[1].ordering_key()));

    let second_run = store.run_events(&task_id, &second);
    assert_eq!(second_run.len(), 1);
}

#[test]
fn unknown_task_yields_empty_results() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path(), &EngineConfig::default()).unwrap();
    let task_id = TaskId::from_string("missing");
    assert!(store.task(&task_id).is_none());
    assert!(store.events(&task_id).is_empty());
}
