// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task events: the append-only replay log.
//!
//! One event is produced per state transition. Events for a `(task_id,
//! run_id)` are totally ordered by `(iteration, timestamp_ms)` and never
//! mutated after creation; replaying a run means re-emitting its events in
//! that order without re-invoking the agent gateway.

use crate::gateway::{GatewayOutcome, PlanSource};
use crate::ids::{RunId, TaskId};
use crate::patch::PatchResult;
use crate::pattern::PatternKey;
use crate::report::{Plan, TestReport, TestRunResult};
use crate::template::Template;
use serde::{Deserialize, Serialize};

/// Named phase of the orchestrator state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Created,
    Planning,
    Coding,
    Patching,
    Testing,
    Done,
    Failed,
    Cancelled,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

crate::simple_display! {
    Stage {
        Created => "created",
        Planning => "planning",
        Coding => "coding",
        Patching => "patching",
        Testing => "testing",
        Done => "done",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

/// Stage-specific event payload, one variant per stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageData {
    Created {
        template: Template,
        instruction: String,
        pattern: PatternKey,
    },
    Planning {
        plan: Plan,
        source: PlanSource,
        /// None when the plan was seeded from memory (no gateway call).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        outcome: Option<GatewayOutcome>,
        /// Approximate tokens consumed by the gateway call(s).
        #[serde(default, skip_serializing_if = "is_zero")]
        tokens: u32,
    },
    Coding {
        patch: String,
        source: PlanSource,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        outcome: Option<GatewayOutcome>,
        #[serde(default, skip_serializing_if = "is_zero")]
        tokens: u32,
    },
    Patching {
        result: PatchResult,
    },
    Testing {
        run: TestRunResult,
        report: TestReport,
        outcome: GatewayOutcome,
        #[serde(default, skip_serializing_if = "is_zero")]
        tokens: u32,
    },
    /// Terminal success. Carries the winning plan and patch so the memory
    /// layer can be rebuilt from replay alone.
    Done {
        plan: Plan,
        patch: String,
        iterations: u32,
    },
    Failed {
        error: String,
        failure_mode: String,
    },
    Cancelled {
        during: Stage,
    },
}

impl StageData {
    pub fn stage(&self) -> Stage {
        match self {
            StageData::Created { .. } => Stage::Created,
            StageData::Planning { .. } => Stage::Planning,
            StageData::Coding { .. } => Stage::Coding,
            StageData::Patching { .. } => Stage::Patching,
            StageData::Testing { .. } => Stage::Testing,
            StageData::Done { .. } => Stage::Done,
            StageData::Failed { .. } => Stage::Failed,
            StageData::Cancelled { .. } => Stage::Cancelled,
        }
    }
}

/// Immutable record of one state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEvent {
    pub task_id: TaskId,
    pub run_id: RunId,
    pub iteration: u32,
    pub stage: Stage,
    pub timestamp_ms: u64,
    pub message: String,
    pub data: StageData,
}

impl TaskEvent {
    /// Build an event; the `stage` field is derived from the payload so the
    /// two can never disagree.
    pub fn new(
        task_id: TaskId,
        run_id: RunId,
        iteration: u32,
        timestamp_ms: u64,
        message: impl Into<String>,
        data: StageData,
    ) -> Self {
        Self {
            task_id,
            run_id,
            iteration,
            stage: data.stage(),
            timestamp_ms,
            message: message.into(),
            data,
        }
    }

    /// Ordering key within a single run.
    pub fn ordering_key(&self) -> (u32, u64) {
        (self.iteration, self.timestamp_ms)
    }

    /// Compact one-line summary for log spans.
    pub fn log_summary(&self) -> String {
        format!(
            "{} run={} iter={} stage={}",
            self.task_id, self.run_id, self.iteration, self.stage
        )
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
