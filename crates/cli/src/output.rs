// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Text and JSON rendering for CLI commands.

use clap::ValueEnum;
use mend_core::{Task, TaskEvent};
use mend_storage::{MemoryEntry, Metrics};
use std::path::Path;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn print_task(format: OutputFormat, task: &Task) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("task      {}", task.task_id);
            println!("run       {}", task.run_id);
            println!("template  {}", task.template);
            println!("state     {}", task.state);
            println!("iteration {}", task.iteration);
            if let Some(agent) = task.current_agent {
                println!("agent     {}", agent);
            }
            if let Some(error) = &task.error {
                println!("error     {}", error);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(task)?),
    }
    Ok(())
}

pub fn print_events(format: OutputFormat, events: &[TaskEvent]) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for event in events {
                println!(
                    "{:>6}  iter={}  {:<9}  {}",
                    event.timestamp_ms % 1_000_000,
                    event.iteration,
                    event.stage.to_string(),
                    event.message
                );
            }
        }
        OutputFormat::Json => {
            for event in events {
                println!("{}", serde_json::to_string(event)?);
            }
        }
    }
    Ok(())
}

pub fn print_run(format: OutputFormat, task: &Task, events: &[TaskEvent]) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            print_events(format, events)?;
            println!();
            print_task(format, task)
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "task": task,
                "events": events,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
    }
}

pub fn print_metrics(format: OutputFormat, metrics: &Metrics) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("tasks            {}", metrics.total_tasks);
            println!("  succeeded      {}", metrics.successful_tasks);
            println!("  failed         {}", metrics.failed_tasks);
            println!("iterations       {}", metrics.total_iterations);
            println!("tokens           {}", metrics.total_tokens);
            println!("avg first event  {:.0}ms", metrics.avg_time_to_first_event_ms);
            println!("avg iters/pass   {:.2}", metrics.avg_iterations_to_pass);
            for (role, count) in &metrics.retry_counts {
                println!("retries[{}]  {}", role, count);
            }
            for (mode, count) in &metrics.failure_modes {
                println!("failures[{}]  {}", mode, count);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(metrics)?),
    }
    Ok(())
}

pub fn print_memory(format: OutputFormat, entries: &[MemoryEntry]) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("memory is empty");
            }
            for entry in entries {
                println!(
                    "{}  successes={}  files={}",
                    entry.pattern,
                    entry.success_count,
                    entry.plan.files_to_modify.join(",")
                );
            }
        }
        OutputFormat::Json => {
            for entry in entries {
                let value = serde_json::json!({
                    "pattern": entry.pattern.to_string(),
                    "success_count": entry.success_count,
                    "plan": entry.plan,
                });
                println!("{}", serde_json::to_string(&value)?);
            }
        }
    }
    Ok(())
}

pub fn print_health(
    format: OutputFormat,
    state_dir: &Path,
    wal_seq: u64,
    tasks: usize,
    active: usize,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("status     ok");
            println!("state dir  {}", state_dir.display());
            println!("wal seq    {}", wal_seq);
            println!("tasks      {}", tasks);
            println!("active     {}", active);
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "status": "ok",
                "state_dir": state_dir.display().to_string(),
                "wal_seq": wal_seq,
                "tasks": tasks,
                "active": active,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}
