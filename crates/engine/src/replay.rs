// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replay of recorded runs.
//!
//! Replaying a `(task_id, run_id)` re-emits its stored events in
//! `(iteration, timestamp)` order. Nothing here touches the gateway or the
//! sandbox: the log is the complete record of a run, and the dashboard (a
//! pure consumer) must tolerate receiving the same event shapes again
//! later.

use mend_core::{RunId, TaskEvent, TaskId};
use mend_storage::Store;

/// Ordered events for one run.
pub fn run(store: &Store, task_id: &TaskId, run_id: &RunId) -> Vec<TaskEvent> {
    store.run_events(task_id, run_id)
}

/// Latest run id recorded for a task, if any.
pub fn latest_run(store: &Store, task_id: &TaskId) -> Option<RunId> {
    store.task(task_id).map(|task| task.run_id)
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;
