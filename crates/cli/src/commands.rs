// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations.
//!
//! Every command opens the orchestrator against the state dir (replaying
//! the WAL) and reads or drives state in-process.

use crate::output::{self, OutputFormat};
use anyhow::Context;
use async_trait::async_trait;
use mend_core::{CompletionRequest, EngineConfig, SystemClock, TaskId};
use mend_engine::Orchestrator;
use mend_gateway::{AdapterError, CompletionAdapter, HttpAdapter, StubAdapter};
use std::path::Path;

/// Adapter selected at startup: HTTP when an API key is configured,
/// deterministic stub otherwise.
pub enum CliAdapter {
    Http(HttpAdapter),
    Stub(StubAdapter),
}

#[async_trait]
impl CompletionAdapter for CliAdapter {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AdapterError> {
        match self {
            CliAdapter::Http(adapter) => adapter.complete(request).await,
            CliAdapter::Stub(adapter) => adapter.complete(request).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            CliAdapter::Http(adapter) => adapter.name(),
            CliAdapter::Stub(adapter) => adapter.name(),
        }
    }
}

fn open(state_dir: &Path) -> anyhow::Result<Orchestrator<CliAdapter, SystemClock>> {
    let config = EngineConfig::load_or_default(&state_dir.join("mend.toml"))
        .context("loading engine config")?;
    let adapter = match HttpAdapter::from_env() {
        Some(http) => CliAdapter::Http(http),
        None => {
            tracing::info!("no MEND_API_KEY set; using the deterministic stub service");
            CliAdapter::Stub(StubAdapter)
        }
    };
    Orchestrator::open(state_dir, config, adapter, SystemClock)
        .context("opening orchestrator state")
}

pub async fn run(
    state_dir: &Path,
    format: OutputFormat,
    task: &str,
    template: &str,
    instruction: &str,
) -> anyhow::Result<()> {
    let orch = open(state_dir)?;
    let task_id = TaskId::from_string(task);
    let run_id = orch.submit(task_id.clone(), template, instruction)?;
    orch.wait(&task_id).await;

    let task = orch.status(&task_id)?;
    let events = orch.replay(&task_id, &run_id);
    output::print_run(format, &task, &events)?;
    if task.state == mend_core::TaskState::Done {
        Ok(())
    } else {
        anyhow::bail!(
            "task {} ended in {}{}",
            task.task_id,
            task.state,
            task.error
                .as_deref()
                .map(|e| format!(": {}", e))
                .unwrap_or_default()
        )
    }
}

pub fn status(state_dir: &Path, format: OutputFormat, task: &str) -> anyhow::Result<()> {
    let orch = open(state_dir)?;
    let task = orch.status(&TaskId::from_string(task))?;
    output::print_task(format, &task)
}

pub fn events(
    state_dir: &Path,
    format: OutputFormat,
    task: &str,
    run: Option<&str>,
) -> anyhow::Result<()> {
    let orch = open(state_dir)?;
    let task_id = TaskId::from_string(task);
    let events = match run {
        Some(run) => orch.replay(&task_id, &mend_core::RunId::from_string(run)),
        None => orch.events(&task_id),
    };
    if events.is_empty() {
        anyhow::bail!("no events for task {}", task_id);
    }
    output::print_events(format, &events)
}

pub fn replay(state_dir: &Path, format: OutputFormat, task: &str, run: &str) -> anyhow::Result<()> {
    let orch = open(state_dir)?;
    let task_id = TaskId::from_string(task);
    let run_id = mend_core::RunId::from_string(run);
    let events = orch.replay(&task_id, &run_id);
    if events.is_empty() {
        anyhow::bail!("no events recorded for {} {}", task_id, run_id);
    }
    output::print_events(format, &events)
}

pub fn metrics(state_dir: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let orch = open(state_dir)?;
    output::print_metrics(format, &orch.metrics())
}

pub fn memory(state_dir: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let orch = open(state_dir)?;
    output::print_memory(format, &orch.memory_snapshot())
}

pub fn health(state_dir: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let orch = open(state_dir)?;
    output::print_health(
        format,
        state_dir,
        orch.wal_seq(),
        orch.tasks().len(),
        orch.active_count(),
    )
}
