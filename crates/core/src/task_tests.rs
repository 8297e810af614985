// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn task() -> Task {
    Task::new(
        TaskId::from_string("t1"),
        RunId::generate(),
        Template::React,
        "add division",
        1_000,
    )
}

#[parameterized(
    done = { TaskState::Done },
    failed = { TaskState::Failed },
    cancelled = { TaskState::Cancelled },
    quarantined = { TaskState::Quarantined },
)]
fn terminal_states(state: TaskState) {
    assert!(state.is_terminal());
}

#[parameterized(
    created = { TaskState::Created },
    planning = { TaskState::Planning },
    coding = { TaskState::Coding },
    patching = { TaskState::Patching },
    testing = { TaskState::Testing },
)]
fn non_terminal_states(state: TaskState) {
    assert!(!state.is_terminal());
}

#[test]
fn new_task_starts_created_at_iteration_zero() {
    let task = task();
    assert_eq!(task.state, TaskState::Created);
    assert_eq!(task.iteration, 0);
    assert!(task.current_agent.is_none());
    assert!(task.error.is_none());
}

#[test]
fn advance_tracks_current_agent() {
    let mut task = task();
    task.advance(TaskState::Planning);
    assert_eq!(task.current_agent, Some(Role::Planner));
    task.advance(TaskState::Coding);
    assert_eq!(task.current_agent, Some(Role::Coder));
    task.advance(TaskState::Testing);
    assert_eq!(task.current_agent, Some(Role::Tester));
    task.advance(TaskState::Done);
    assert!(task.current_agent.is_none());
}

#[test]
fn terminal_states_never_transition_further() {
    let mut task = task();
    assert!(task.advance(TaskState::Planning));
    assert!(task.advance(TaskState::Failed));
    assert!(!task.advance(TaskState::Coding));
    assert_eq!(task.state, TaskState::Failed);
}

#[test]
fn next_iteration_increments() {
    let mut task = task();
    assert_eq!(task.next_iteration(), 1);
    assert_eq!(task.next_iteration(), 2);
}

#[test]
fn task_serde_round_trip() {
    let task = task();
    let json = serde_json::to_string(&task).unwrap();
    let parsed: Task = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, task);
}
