// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-run stage pipeline.
//!
//! `CREATED → PLANNING → CODING → PATCHING → TESTING → (CODING | DONE |
//! FAILED)`, with the coding loop bounded by `max_iterations`. Every
//! transition is appended durably before the next stage starts. The
//! cancellation flag is checked at each stage boundary. The sandbox is
//! cleaned up on every exit path, gateway failures and cancellation
//! included.

use crate::Shared;
use mend_core::{
    Clock, PatternKey, PlanSource, RunId, Stage, StageData, TaskEvent, TaskId, Template,
};
use mend_gateway::CompletionAdapter;
use mend_sandbox::{Sandbox, SandboxError, SnapshotLabel};
use mend_storage::MemoryEntry;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub(crate) fn created_event(
    task_id: &TaskId,
    run_id: &RunId,
    template: Template,
    instruction: &str,
    now_ms: u64,
) -> TaskEvent {
    TaskEvent::new(
        task_id.clone(),
        run_id.clone(),
        0,
        now_ms,
        "task created",
        StageData::Created {
            template,
            instruction: instruction.to_string(),
            pattern: PatternKey::new(template, instruction),
        },
    )
}

/// How one pipeline run ended. `Done` is recorded by the pipeline itself
/// (its payload needs the winning plan and patch); the other two are
/// recorded by [`emit_terminal`].
enum Exit {
    Done,
    Failed { iteration: u32, error: String, failure_mode: &'static str },
    Cancelled { iteration: u32, during: Stage },
}

pub(crate) async fn execute<A: CompletionAdapter, C: Clock>(
    shared: Arc<Shared<A, C>>,
    task_id: TaskId,
    run_id: RunId,
    template: Template,
    token: CancellationToken,
) {
    let mut sandbox = Sandbox::new(
        &shared.state_dir,
        task_id.clone(),
        run_id.clone(),
        &shared.config,
    );

    let exit = pipeline(&shared, &task_id, &run_id, template, &mut sandbox, &token).await;

    match exit {
        Ok(exit) => emit_terminal(&shared, &task_id, &run_id, exit),
        Err(err) => {
            // WAL append failed mid-run; nothing further can be recorded
            tracing::error!(task_id = %task_id, error = %err, "run aborted: event log unavailable");
        }
    }

    if let Err(err) = sandbox.cleanup() {
        tracing::warn!(task_id = %task_id, error = %err, "sandbox cleanup failed");
    }
    shared.active.lock().remove(task_id.as_str());
}

fn emit_terminal<A: CompletionAdapter, C: Clock>(
    shared: &Shared<A, C>,
    task_id: &TaskId,
    run_id: &RunId,
    exit: Exit,
) {
    let (iteration, message, data) = match exit {
        Exit::Done => return,
        Exit::Failed { iteration, error, failure_mode } => (
            iteration,
            format!("task failed: {}", error),
            StageData::Failed {
                error,
                failure_mode: failure_mode.to_string(),
            },
        ),
        Exit::Cancelled { iteration, during } => (
            iteration,
            format!("task cancelled during {}", during),
            StageData::Cancelled { during },
        ),
    };
    let event = TaskEvent::new(
        task_id.clone(),
        run_id.clone(),
        iteration,
        shared.clock.epoch_ms(),
        message,
        data,
    );
    if let Err(err) = shared.store.append(&event) {
        tracing::error!(task_id = %task_id, error = %err, "failed to record terminal event");
    }
}

/// Run the stage loop. `Ok(exit)` is a terminal outcome to record (Done
/// records itself); `Err` means the event log itself failed.
async fn pipeline<A: CompletionAdapter, C: Clock>(
    shared: &Shared<A, C>,
    task_id: &TaskId,
    run_id: &RunId,
    template: Template,
    sandbox: &mut Sandbox,
    token: &CancellationToken,
) -> Result<Exit, mend_storage::WalError> {
    let instruction = match shared.store.task(task_id) {
        Some(task) => task.instruction,
        None => String::new(),
    };

    let emit = |iteration: u32, message: String, data: StageData| {
        let event = TaskEvent::new(
            task_id.clone(),
            run_id.clone(),
            iteration,
            shared.clock.epoch_ms(),
            message,
            data,
        );
        shared.store.append(&event).map(|_| ())
    };

    if let Err(err) = sandbox.prepare(template, shared.clock.epoch_ms()) {
        return Ok(Exit::Failed {
            iteration: 0,
            error: format!("sandbox prepare failed: {}", err),
            failure_mode: "sandbox_error",
        });
    }

    if token.is_cancelled() {
        return Ok(cancelled(sandbox, 0, Stage::Created));
    }

    // Pre-task memory consultation: a confident prior success seeds the
    // plan and first patch without gateway calls. The seeded patch still
    // goes through the full validation pipeline below.
    let memory = shared.store.memory();
    let seeded: Option<MemoryEntry> = memory
        .lookup(template, &instruction)
        .filter(|entry| memory.is_seedable(entry));

    let plan = match &seeded {
        Some(entry) => {
            emit(
                0,
                "plan seeded from memory".to_string(),
                StageData::Planning {
                    plan: entry.plan.clone(),
                    source: PlanSource::Memory,
                    outcome: None,
                    tokens: 0,
                },
            )?;
            entry.plan.clone()
        }
        None => {
            let reply = shared.gateway.plan(template, &instruction).await;
            emit(
                0,
                "plan generated".to_string(),
                StageData::Planning {
                    plan: reply.value.clone(),
                    source: PlanSource::Agent,
                    outcome: Some(reply.outcome),
                    tokens: reply.tokens,
                },
            )?;
            reply.value
        }
    };

    let mut feedback: Option<String> = None;
    let max_iterations = shared.config.max_iterations;

    for iteration in 0..max_iterations {
        if token.is_cancelled() {
            return Ok(cancelled(sandbox, iteration, Stage::Coding));
        }

        // CODING: seeded patch on the first attempt, gateway otherwise
        let (patch_text, source, outcome, tokens) = match (&seeded, iteration) {
            (Some(entry), 0) => (entry.patch.clone(), PlanSource::Memory, None, 0),
            _ => {
                let reply = shared
                    .gateway
                    .patch(template, &plan, feedback.as_deref())
                    .await;
                (
                    reply.value,
                    PlanSource::Agent,
                    Some(reply.outcome),
                    reply.tokens,
                )
            }
        };
        emit(
            iteration,
            "patch generated".to_string(),
            StageData::Coding {
                patch: patch_text.clone(),
                source,
                outcome,
                tokens,
            },
        )?;

        if token.is_cancelled() {
            return Ok(cancelled(sandbox, iteration, Stage::Patching));
        }

        // PATCHING
        let patch_result = match sandbox.apply_patch(&patch_text, shared.clock.epoch_ms()) {
            Ok(result) => result,
            Err(err) => {
                return Ok(Exit::Failed {
                    iteration,
                    error: format!("patch application failed: {}", err),
                    failure_mode: "sandbox_error",
                })
            }
        };
        emit(
            iteration,
            patch_message(&patch_result),
            StageData::Patching {
                result: patch_result.clone(),
            },
        )?;

        if !patch_result.applied {
            // Security violations and size rejections are never retried at
            // the sandbox; the coder revises, bounded by max_iterations.
            let reason = patch_result
                .rejected_reason
                .map(|r| r.to_string())
                .unwrap_or_else(|| "patch rejected".to_string());
            if iteration + 1 >= max_iterations {
                return Ok(Exit::Failed {
                    iteration,
                    error: format!("no acceptable patch after {} attempts: {}", max_iterations, reason),
                    failure_mode: "patch_rejected",
                });
            }
            feedback = Some(reason);
            continue;
        }

        if token.is_cancelled() {
            return Ok(cancelled(sandbox, iteration, Stage::Testing));
        }

        // TESTING
        let run = sandbox.run_tests(template);
        let reply = shared.gateway.report(template, &run).await;
        let report = reply.value;
        emit(
            iteration,
            format!("tests: {} passed, {} failed", run.passed, run.failed),
            StageData::Testing {
                run: run.clone(),
                report: report.clone(),
                outcome: reply.outcome,
                tokens: reply.tokens,
            },
        )?;

        if report.is_pass() && run.all_passed() {
            emit(
                iteration,
                "task completed".to_string(),
                StageData::Done {
                    plan: plan.clone(),
                    patch: patch_text,
                    iterations: iteration + 1,
                },
            )?;
            return Ok(Exit::Done);
        }

        // Failed round: mandatory rollback, then revise or give up
        if let Err(err) = rollback_last(sandbox) {
            return Ok(Exit::Failed {
                iteration,
                error: format!("rollback failed: {}", err),
                failure_mode: "sandbox_error",
            });
        }
        if iteration + 1 >= max_iterations {
            return Ok(Exit::Failed {
                iteration: max_iterations,
                error: format!(
                    "tests still failing after {} iterations: {}",
                    max_iterations, report.summary
                ),
                failure_mode: "tests_failed",
            });
        }
        feedback = Some(format!("tests failed: {}", run.stdout));
    }

    // Loop bound is handled inside; reaching here means max_iterations == 0
    Ok(Exit::Failed {
        iteration: 0,
        error: "no coding attempts configured".to_string(),
        failure_mode: "tests_failed",
    })
}

/// Cancellation path: roll the workspace back to the last safe snapshot
/// before recording the terminal event.
fn cancelled(sandbox: &mut Sandbox, iteration: u32, during: Stage) -> Exit {
    if let Err(err) = rollback_last(sandbox) {
        tracing::warn!(error = %err, "rollback on cancellation failed");
    }
    Exit::Cancelled { iteration, during }
}

/// Restore `before_patch` when it exists, `initial` otherwise.
fn rollback_last(sandbox: &mut Sandbox) -> Result<(), SandboxError> {
    if !sandbox.rollback(SnapshotLabel::BeforePatch)? {
        sandbox.rollback(SnapshotLabel::Initial)?;
    }
    Ok(())
}

fn patch_message(result: &mend_core::PatchResult) -> String {
    match &result.rejected_reason {
        Some(reason) => format!("patch rejected: {}", reason),
        None => format!(
            "patch applied: {} file(s), +{} -{}",
            result.diff_stats.files_modified, result.diff_stats.added, result.diff_stats.removed
        ),
    }
}
