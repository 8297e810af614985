// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from event replay.
//!
//! State is derived from events: events are facts about what happened, and
//! every derived structure (task rows, memory entries, reliability records,
//! metrics) is rebuilt by replaying the log from the start. Handlers are
//! guarded so a terminal event applied against an already-terminal task is a
//! no-op and never double-counts.

use crate::memory::MemoryLayer;
use crate::reliability::ReliabilityTracker;
use mend_core::{
    GatewayOutcome, PatternKey, Role, Stage, StageData, Task, TaskEvent, TaskState,
};
use std::collections::HashMap;

/// Failure mode recorded when a gateway call exhausted its corrective
/// retries and fell back to the stub.
pub const FAILURE_MODE_VALIDATION_EXHAUSTED: &str = "agent_validation_exhausted";

/// Tasks and their event history, derived from the WAL.
#[derive(Debug, Default, Clone)]
pub struct MaterializedState {
    /// Latest run of each task, by task id.
    pub tasks: HashMap<String, Task>,
    /// Append-ordered events per task id (all runs).
    pub events: HashMap<String, Vec<TaskEvent>>,
}

impl MaterializedState {
    /// Apply one event, updating tasks and folding terminal outcomes into
    /// the memory layer and reliability tracker.
    pub fn apply_event(
        &mut self,
        event: &TaskEvent,
        memory: &MemoryLayer,
        reliability: &ReliabilityTracker,
    ) {
        match &event.data {
            StageData::Created {
                template,
                instruction,
                ..
            } => {
                // A new run replaces the task row; the event history keeps
                // every run.
                let task = Task::new(
                    event.task_id.clone(),
                    event.run_id.clone(),
                    *template,
                    instruction.clone(),
                    event.timestamp_ms,
                );
                self.tasks.insert(event.task_id.to_string(), task);
            }

            StageData::Planning { outcome, tokens, .. } => {
                self.advance(event, TaskState::Planning);
                self.fold_gateway(reliability, Role::Planner, outcome.as_ref(), *tokens);
            }

            StageData::Coding { outcome, tokens, .. } => {
                self.advance(event, TaskState::Coding);
                self.fold_gateway(reliability, Role::Coder, outcome.as_ref(), *tokens);
            }

            StageData::Patching { .. } => {
                self.advance(event, TaskState::Patching);
            }

            StageData::Testing { outcome, tokens, .. } => {
                self.advance(event, TaskState::Testing);
                self.fold_gateway(reliability, Role::Tester, Some(outcome), *tokens);
            }

            StageData::Done { plan, patch, iterations } => {
                if self.advance(event, TaskState::Done) {
                    if let Some(task) = self.tasks.get(event.task_id.as_str()) {
                        let pattern = PatternKey::new(task.template, &task.instruction);
                        memory.record(
                            pattern.clone(),
                            plan.clone(),
                            patch.clone(),
                            event.timestamp_ms,
                        );
                        reliability.record_attempt(&pattern, true);
                    }
                    reliability.record_completion(
                        true,
                        *iterations,
                        self.time_to_first_event(event),
                    );
                }
            }

            StageData::Failed { error, failure_mode } => {
                if self.advance(event, TaskState::Failed) {
                    if let Some(task) = self.tasks.get_mut(event.task_id.as_str()) {
                        task.error = Some(error.clone());
                        let pattern = PatternKey::new(task.template, &task.instruction);
                        reliability.record_attempt(&pattern, false);
                    }
                    reliability.record_failure_mode(failure_mode);
                    reliability.record_completion(
                        false,
                        event.iteration,
                        self.time_to_first_event(event),
                    );
                }
            }

            StageData::Cancelled { .. } => {
                if self.advance(event, TaskState::Cancelled) {
                    if let Some(task) = self.tasks.get(event.task_id.as_str()) {
                        let pattern = PatternKey::new(task.template, &task.instruction);
                        reliability.record_attempt(&pattern, false);
                    }
                    reliability.record_failure_mode("cancelled");
                    reliability.record_completion(
                        false,
                        event.iteration,
                        self.time_to_first_event(event),
                    );
                }
            }
        }

        self.events
            .entry(event.task_id.to_string())
            .or_default()
            .push(event.clone());
    }

    /// Advance the task row for this event's run. Returns false when the
    /// event targets a stale run or an already-terminal task.
    fn advance(&mut self, event: &TaskEvent, next: TaskState) -> bool {
        let Some(task) = self.tasks.get_mut(event.task_id.as_str()) else {
            return false;
        };
        if task.run_id != event.run_id {
            return false;
        }
        let advanced = task.advance(next);
        if advanced {
            task.iteration = task.iteration.max(event.iteration);
        }
        advanced
    }

    fn fold_gateway(
        &self,
        reliability: &ReliabilityTracker,
        role: Role,
        outcome: Option<&GatewayOutcome>,
        tokens: u32,
    ) {
        reliability.record_tokens(u64::from(tokens));
        match outcome {
            Some(GatewayOutcome::CorrectiveRetry { attempts }) => {
                reliability.record_retries(role, *attempts);
            }
            Some(GatewayOutcome::Fallback) => {
                reliability.record_failure_mode(FAILURE_MODE_VALIDATION_EXHAUSTED);
            }
            _ => {}
        }
    }

    /// Milliseconds from run creation to its first non-created event.
    fn time_to_first_event(&self, terminal: &TaskEvent) -> Option<u64> {
        let events = self.events.get(terminal.task_id.as_str())?;
        let run: Vec<&TaskEvent> = events
            .iter()
            .filter(|e| e.run_id == terminal.run_id)
            .collect();
        let created = run.iter().find(|e| e.stage == Stage::Created)?;
        let first = run.iter().find(|e| e.stage != Stage::Created)?;
        Some(first.timestamp_ms.saturating_sub(created.timestamp_ms))
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
