// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mend-engine: the task orchestration state machine.
//!
//! The orchestrator owns every Task's lifecycle. Submission performs the
//! fatal checks (duplicate, quarantine, unknown template) before any
//! sandbox or agent work, then each task runs on its own tokio task:
//! tasks suspend only at gateway calls and sandbox commands and never
//! serialize against each other except on the shared stores. Every state
//! transition is appended durably to the WAL before the next stage begins.

pub mod replay;
mod runner;

use mend_core::{
    Clock, EngineConfig, PatternKey, RunId, Task, TaskEvent, TaskId, Template,
};
use mend_gateway::{AgentGateway, CompletionAdapter, GatewayConfig};
use mend_sandbox::SandboxError;
use mend_storage::{MemoryEntry, Metrics, Store, WalError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("task already active: {task_id}")]
    DuplicateTask { task_id: TaskId },
    #[error("pattern quarantined: {pattern}")]
    Quarantined { pattern: PatternKey },
    #[error("template not found: {name}")]
    TemplateNotFound { name: String },
    #[error("task not found: {task_id}")]
    TaskNotFound { task_id: TaskId },
    #[error(transparent)]
    Storage(#[from] WalError),
    #[error(transparent)]
    Sandbox(#[from] SandboxError),
}

struct ActiveRun {
    run_id: RunId,
    token: CancellationToken,
    handle: Option<tokio::task::JoinHandle<()>>,
}

pub(crate) struct Shared<A: CompletionAdapter, C: Clock> {
    pub(crate) config: EngineConfig,
    pub(crate) state_dir: PathBuf,
    pub(crate) store: Store,
    pub(crate) gateway: AgentGateway<A>,
    pub(crate) clock: C,
    active: Mutex<HashMap<String, ActiveRun>>,
}

/// The task orchestration state machine.
pub struct Orchestrator<A: CompletionAdapter, C: Clock> {
    inner: Arc<Shared<A, C>>,
}

impl<A: CompletionAdapter, C: Clock> Clone for Orchestrator<A, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: CompletionAdapter, C: Clock> Orchestrator<A, C> {
    /// Open the store under `state_dir` (replaying any prior WAL) and build
    /// the orchestrator.
    pub fn open(
        state_dir: &Path,
        config: EngineConfig,
        adapter: A,
        clock: C,
    ) -> Result<Self, EngineError> {
        let store = Store::open(state_dir, &config)?;
        let gateway = AgentGateway::new(adapter, GatewayConfig::from_config(&config));
        Ok(Self {
            inner: Arc::new(Shared {
                config,
                state_dir: state_dir.to_path_buf(),
                store,
                gateway,
                clock,
                active: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// Submit a task. Fails fast, before any sandbox or agent work, on a
    /// duplicate active task, a quarantined pattern, or an unknown
    /// template. Returns the new run id; the run executes on its own tokio
    /// task.
    pub fn submit(
        &self,
        task_id: TaskId,
        template: &str,
        instruction: &str,
    ) -> Result<RunId, EngineError> {
        let template = Template::parse(template).ok_or_else(|| EngineError::TemplateNotFound {
            name: template.to_string(),
        })?;

        let pattern = PatternKey::new(template, instruction);
        if self.inner.store.reliability().is_quarantined(&pattern) {
            return Err(EngineError::Quarantined { pattern });
        }

        let run_id = RunId::generate();
        let token = CancellationToken::new();
        {
            let mut active = self.inner.active.lock();
            if active.contains_key(task_id.as_str()) {
                return Err(EngineError::DuplicateTask { task_id });
            }
            active.insert(
                task_id.to_string(),
                ActiveRun {
                    run_id: run_id.clone(),
                    token: token.clone(),
                    handle: None,
                },
            );
        }

        // Durable Created event before the run starts
        let created = runner::created_event(
            &task_id,
            &run_id,
            template,
            instruction,
            self.inner.clock.epoch_ms(),
        );
        if let Err(err) = self.inner.store.append(&created) {
            self.inner.active.lock().remove(task_id.as_str());
            return Err(err.into());
        }

        tracing::info!(task_id = %task_id, run_id = %run_id, template = %template, "task submitted");

        let shared = Arc::clone(&self.inner);
        let spawn_task_id = task_id.clone();
        let spawn_run_id = run_id.clone();
        let handle = tokio::spawn(async move {
            runner::execute(shared, spawn_task_id, spawn_run_id, template, token).await;
        });
        if let Some(entry) = self.inner.active.lock().get_mut(task_id.as_str()) {
            entry.handle = Some(handle);
        }

        Ok(run_id)
    }

    /// Wait for a task's current run to reach a terminal state.
    pub async fn wait(&self, task_id: &TaskId) {
        let handle = self
            .inner
            .active
            .lock()
            .get_mut(task_id.as_str())
            .and_then(|entry| entry.handle.take());
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Request cooperative cancellation of a running task. Returns false
    /// when the task is not active.
    pub fn cancel(&self, task_id: &TaskId) -> bool {
        let active = self.inner.active.lock();
        match active.get(task_id.as_str()) {
            Some(entry) => {
                entry.token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn status(&self, task_id: &TaskId) -> Result<Task, EngineError> {
        self.inner
            .store
            .task(task_id)
            .ok_or_else(|| EngineError::TaskNotFound {
                task_id: task_id.clone(),
            })
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.inner.store.tasks()
    }

    /// All events for a task, in emission order.
    pub fn events(&self, task_id: &TaskId) -> Vec<TaskEvent> {
        self.inner.store.events(task_id)
    }

    /// Replay one run's events: ordered, no gateway or sandbox calls.
    pub fn replay(&self, task_id: &TaskId, run_id: &RunId) -> Vec<TaskEvent> {
        replay::run(&self.inner.store, task_id, run_id)
    }

    pub fn metrics(&self) -> Metrics {
        self.inner.store.reliability().metrics()
    }

    pub fn memory_snapshot(&self) -> Vec<MemoryEntry> {
        self.inner.store.memory().snapshot()
    }

    pub fn reliability_record(&self, pattern: &PatternKey) -> Option<mend_storage::ReliabilityRecord> {
        self.inner.store.reliability().record_for(pattern)
    }

    /// Number of tasks currently executing.
    pub fn active_count(&self) -> usize {
        self.inner.active.lock().len()
    }

    /// Highest WAL sequence number, for the health surface.
    pub fn wal_seq(&self) -> u64 {
        self.inner.store.wal_seq()
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
