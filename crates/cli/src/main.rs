// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! mend: drive automated code-modification tasks from the command line.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mend", version, about = "Automated code-modification task runner")]
struct Cli {
    /// State directory (WAL, workspaces). Defaults to the user data dir.
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a task and drive it to a terminal state
    Run {
        /// Caller-supplied task id
        #[arg(long)]
        task: String,
        /// Starter template (react, express, flask)
        #[arg(long)]
        template: String,
        /// Free-text instruction for the change
        #[arg(long)]
        instruction: String,
    },
    /// Show a task's current state
    Status { task: String },
    /// List a task's events
    Events {
        task: String,
        /// Restrict to one run
        #[arg(long)]
        run: Option<String>,
    },
    /// Re-emit a run's events without re-invoking anything
    Replay { task: String, run: String },
    /// Global reliability metrics
    Metrics,
    /// Memory layer contents
    Memory,
    /// Orchestrator liveness and store health
    Health,
}

fn state_dir(cli: &Cli) -> PathBuf {
    cli.state_dir.clone().unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mend")
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let state_dir = state_dir(&cli);
    let format = cli.format;

    match cli.command {
        Command::Run {
            task,
            template,
            instruction,
        } => commands::run(&state_dir, format, &task, &template, &instruction).await,
        Command::Status { task } => commands::status(&state_dir, format, &task),
        Command::Events { task, run } => {
            commands::events(&state_dir, format, &task, run.as_deref())
        }
        Command::Replay { task, run } => commands::replay(&state_dir, format, &task, &run),
        Command::Metrics => commands::metrics(&state_dir, format),
        Command::Memory => commands::memory(&state_dir, format),
        Command::Health => commands::health(&state_dir, format),
    }
}
