// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task record and lifecycle state machine.

use crate::gateway::Role;
use crate::ids::{RunId, TaskId};
use crate::template::Template;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a task run.
///
/// `Quarantined` is checked before `Created`: a quarantined submission is
/// rejected outright and never materializes a task, so the variant only
/// appears in status displays. Terminal states never transition again for
/// the same run; re-submitting the task id starts a fresh run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Created,
    Planning,
    Coding,
    Patching,
    Testing,
    Done,
    Failed,
    Cancelled,
    Quarantined,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Done | TaskState::Failed | TaskState::Cancelled | TaskState::Quarantined
        )
    }
}

crate::simple_display! {
    TaskState {
        Created => "created",
        Planning => "planning",
        Coding => "coding",
        Patching => "patching",
        Testing => "testing",
        Done => "done",
        Failed => "failed",
        Cancelled => "cancelled",
        Quarantined => "quarantined",
    }
}

/// One user-submitted request to modify a template project.
///
/// Owned exclusively by the orchestrator; mutated only through
/// [`Task::advance`] so terminal states stay terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: TaskId,
    pub run_id: RunId,
    pub template: Template,
    pub instruction: String,
    pub state: TaskState,
    pub iteration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_agent: Option<Role>,
    pub started_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Task {
    pub fn new(
        task_id: TaskId,
        run_id: RunId,
        template: Template,
        instruction: impl Into<String>,
        started_at_ms: u64,
    ) -> Self {
        Self {
            task_id,
            run_id,
            template,
            instruction: instruction.into(),
            state: TaskState::Created,
            iteration: 0,
            current_agent: None,
            started_at_ms,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Transition to `next`. Returns false (and leaves the task untouched)
    /// when the current state is terminal.
    pub fn advance(&mut self, next: TaskState) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.state = next;
        self.current_agent = match next {
            TaskState::Planning => Some(Role::Planner),
            TaskState::Coding | TaskState::Patching => Some(Role::Coder),
            TaskState::Testing => Some(Role::Tester),
            _ => None,
        };
        true
    }

    /// Record a failed test round and route back to coding.
    pub fn next_iteration(&mut self) -> u32 {
        self.iteration += 1;
        self.iteration
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
