// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gated command execution under resource ceilings.
//!
//! The wall-clock ceiling is enforced here: on breach the child is killed
//! (via `kill_on_drop`) and a `killed` result is returned instead of an
//! error. Memory and CPU ceilings are policy handed to the process-isolation
//! runtime; this layer records them and strips the environment down to a
//! minimal set so nothing inherits proxy or credential variables.

use mend_core::{EngineConfig, ExecResult};
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("io error collecting output: {0}")]
    Io(#[from] std::io::Error),
}

/// Resource ceilings for one command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecLimits {
    pub wall: Duration,
    pub memory_mb: u64,
    pub cpu_percent: u8,
}

impl ExecLimits {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            wall: Duration::from_secs(config.command_timeout_secs),
            memory_mb: config.memory_limit_mb,
            cpu_percent: config.cpu_limit_percent,
        }
    }
}

/// Environment variables preserved for child processes.
const KEPT_ENV: [&str; 3] = ["PATH", "HOME", "LANG"];

/// Run a parsed argv in `cwd` under `limits`.
///
/// A wall-clock breach returns `killed: true` with exit code -1; it is not
/// an `Err`; the caller treats it as a test failure, not a crash.
pub async fn run(argv: &[String], cwd: &Path, limits: &ExecLimits) -> Result<ExecResult, ExecError> {
    let (program, args) = match argv.split_first() {
        Some(split) => split,
        None => {
            return Err(ExecError::Spawn {
                program: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty argv"),
            })
        }
    };

    let mut command = tokio::process::Command::new(program);
    command
        .args(args)
        .current_dir(cwd)
        .env_clear()
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    for key in KEPT_ENV {
        if let Ok(value) = std::env::var(key) {
            command.env(key, value);
        }
    }

    let started = Instant::now();
    let child = command.spawn().map_err(|source| ExecError::Spawn {
        program: program.clone(),
        source,
    })?;

    tracing::debug!(program = %program, args = args.len(), "command started");

    match tokio::time::timeout(limits.wall, child.wait_with_output()).await {
        Ok(output) => {
            let output = output?;
            Ok(ExecResult {
                exit_code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                duration_ms: started.elapsed().as_millis() as u64,
                killed: false,
            })
        }
        Err(_) => {
            // Dropping the future killed the child (kill_on_drop)
            tracing::warn!(program = %program, wall_secs = limits.wall.as_secs(), "command killed: wall-clock ceiling");
            Ok(ExecResult {
                exit_code: -1,
                stdout: String::new(),
                stderr: format!(
                    "process killed: exceeded {}s wall-clock limit",
                    limits.wall.as_secs()
                ),
                duration_ms: started.elapsed().as_millis() as u64,
                killed: true,
            })
        }
    }
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
