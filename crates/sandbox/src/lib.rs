// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mend-sandbox: isolated workspace for applying patches and running
//! commands.
//!
//! One sandbox exists per `(task_id, run_id)`; workspaces are never shared
//! across tasks. The sandbox composes the snapshot store, command gate, and
//! patch validator, and owns every workspace-safety invariant: a rejected
//! patch mutates nothing, every accepted mutation is bracketed by
//! snapshots, and cleanup releases the workspace on every exit path.

pub mod checks;
pub mod exec;
pub mod gate;
pub mod patch;
pub mod snapshot;
pub mod template_fs;

pub use exec::{ExecError, ExecLimits};
pub use gate::{CommandGate, GateError};
pub use patch::PatchPolicy;
pub use snapshot::{Snapshot, SnapshotLabel, SnapshotStore};

use mend_core::{
    EngineConfig, ExecResult, PatchResult, RejectReason, RunId, TaskId, Template, TestRunResult,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error("workspace io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Isolated workspace for one task run.
pub struct Sandbox {
    task_id: TaskId,
    run_id: RunId,
    root: PathBuf,
    repo: PathBuf,
    gate: CommandGate,
    snapshots: SnapshotStore,
    limits: ExecLimits,
    policy: PatchPolicy,
    cleaned: bool,
}

impl Sandbox {
    /// Lay out a sandbox under `base/tasks/<task_id>/<run_id>`. Nothing is
    /// created on disk until [`Sandbox::prepare`].
    pub fn new(base: &Path, task_id: TaskId, run_id: RunId, config: &EngineConfig) -> Self {
        let root = base
            .join("tasks")
            .join(task_id.as_str())
            .join(run_id.as_str());
        let repo = root.join("repo");
        let snapshots = SnapshotStore::new(root.join("snapshots"));
        Self {
            task_id,
            run_id,
            root,
            repo,
            gate: CommandGate::new(&config.command_allowlist),
            snapshots,
            limits: ExecLimits::from_config(config),
            policy: PatchPolicy {
                protected_files: config.protected_files.clone(),
                max_changed_lines: config.max_patch_lines,
            },
            cleaned: false,
        }
    }

    /// Materialize the starter project and take the `initial` snapshot.
    pub fn prepare(&mut self, template: Template, now_ms: u64) -> Result<(), SandboxError> {
        std::fs::create_dir_all(&self.repo)?;
        template_fs::materialize(template, &self.repo)?;
        self.snapshots
            .save(SnapshotLabel::Initial, &self.repo, now_ms)?;
        tracing::info!(
            task_id = %self.task_id,
            run_id = %self.run_id,
            template = %template,
            "sandbox prepared"
        );
        Ok(())
    }

    /// Validate and apply a patch.
    ///
    /// Takes a `before_patch` snapshot first. A rejected patch returns
    /// `applied: false` with the first matching rejection rule and performs
    /// no filesystem mutation; an accepted patch is written atomically and
    /// followed by an `after_patch` snapshot. An io failure mid-write
    /// restores `before_patch` before propagating.
    pub fn apply_patch(&mut self, diff: &str, now_ms: u64) -> Result<PatchResult, SandboxError> {
        self.snapshots
            .save(SnapshotLabel::BeforePatch, &self.repo, now_ms)?;

        let patches = match patch::parse(diff) {
            Ok(patches) => patches,
            Err(detail) => {
                return Ok(PatchResult::rejected(RejectReason::Unparseable { detail }))
            }
        };
        if let Some(reason) = patch::validate(&patches, &self.policy) {
            tracing::info!(task_id = %self.task_id, reason = %reason, "patch rejected");
            return Ok(PatchResult::rejected(reason));
        }

        let applied_files = match patch::apply(&self.repo, &patches) {
            Ok(files) => files,
            Err(err) => {
                self.snapshots.restore(SnapshotLabel::BeforePatch, &self.repo)?;
                return Err(err.into());
            }
        };
        self.snapshots
            .save(SnapshotLabel::AfterPatch, &self.repo, now_ms)?;

        let stats = patch::stats(&patches);
        tracing::info!(
            task_id = %self.task_id,
            files = applied_files.len(),
            added = stats.added,
            removed = stats.removed,
            "patch applied"
        );
        Ok(PatchResult::applied(applied_files, stats))
    }

    /// Execute an allowlisted command under the resource ceilings.
    /// Denied commands fail here without spawning anything.
    pub async fn run_command(&self, cmd: &str) -> Result<ExecResult, SandboxError> {
        let argv = self.gate.check(cmd)?;
        Ok(exec::run(&argv, &self.repo, &self.limits).await?)
    }

    /// Evaluate the template's deterministic acceptance checks.
    pub fn run_tests(&self, template: Template) -> TestRunResult {
        checks::evaluate(template, &self.repo)
    }

    /// Restore the workspace to the latest snapshot with `label`.
    pub fn rollback(&mut self, label: SnapshotLabel) -> Result<bool, SandboxError> {
        Ok(self.snapshots.restore(label, &self.repo)?)
    }

    /// Release the workspace and all snapshots. Safe to call twice.
    pub fn cleanup(&mut self) -> Result<(), SandboxError> {
        if self.cleaned {
            return Ok(());
        }
        if self.root.exists() {
            std::fs::remove_dir_all(&self.root)?;
        }
        self.cleaned = true;
        tracing::info!(task_id = %self.task_id, run_id = %self.run_id, "sandbox cleaned up");
        Ok(())
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        self.snapshots.snapshots()
    }
}

impl Drop for Sandbox {
    fn drop(&mut self) {
        // Backstop for exit paths that bypassed cleanup()
        if !self.cleaned && self.root.exists() {
            if let Err(err) = std::fs::remove_dir_all(&self.root) {
                tracing::warn!(
                    task_id = %self.task_id,
                    error = %err,
                    "failed to remove workspace on drop"
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "sandbox_tests.rs"]
mod tests;
