// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Copy-based workspace snapshots.
//!
//! Snapshots form an append-only log of immutable labeled copies; "current"
//! workspace state is only ever changed by restoring from one, never by
//! editing a snapshot in place. `restore` targets the latest snapshot with
//! the requested label and is idempotent.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Snapshot labels used by the sandbox lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotLabel {
    Initial,
    BeforePatch,
    AfterPatch,
}

impl SnapshotLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotLabel::Initial => "initial",
            SnapshotLabel::BeforePatch => "before_patch",
            SnapshotLabel::AfterPatch => "after_patch",
        }
    }
}

mend_core::simple_display! {
    SnapshotLabel {
        Initial => "initial",
        BeforePatch => "before_patch",
        AfterPatch => "after_patch",
    }
}

/// One saved workspace copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub label: SnapshotLabel,
    pub path: PathBuf,
    pub created_at_ms: u64,
}

/// Append-only log of snapshots for one sandbox.
pub struct SnapshotStore {
    dir: PathBuf,
    log: Vec<Snapshot>,
}

impl SnapshotStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir, log: Vec::new() }
    }

    /// Copy the workspace into a new snapshot with `label`.
    pub fn save(
        &mut self,
        label: SnapshotLabel,
        repo: &Path,
        now_ms: u64,
    ) -> std::io::Result<Snapshot> {
        let path = self.dir.join(format!("{}-{:04}", label, self.log.len()));
        std::fs::create_dir_all(&path)?;
        copy_tree(repo, &path)?;
        let snapshot = Snapshot {
            label,
            path,
            created_at_ms: now_ms,
        };
        self.log.push(snapshot.clone());
        tracing::debug!(label = %label, "snapshot saved");
        Ok(snapshot)
    }

    /// Restore the workspace to the latest snapshot with `label`.
    /// Returns false (workspace untouched) when no such snapshot exists.
    pub fn restore(&self, label: SnapshotLabel, repo: &Path) -> std::io::Result<bool> {
        let Some(snapshot) = self.latest(label) else {
            return Ok(false);
        };
        clear_dir(repo)?;
        copy_tree(&snapshot.path, repo)?;
        tracing::debug!(label = %label, "workspace restored");
        Ok(true)
    }

    /// Latest snapshot with `label`, if any.
    pub fn latest(&self, label: SnapshotLabel) -> Option<&Snapshot> {
        self.log.iter().rev().find(|s| s.label == label)
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.log
    }
}

/// Recursively copy `src` into `dst` (which must exist).
fn copy_tree(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            std::fs::create_dir_all(&target)?;
            copy_tree(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Remove every entry inside `dir` without removing `dir` itself.
fn clear_dir(dir: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            std::fs::remove_dir_all(entry.path())?;
        } else {
            std::fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
