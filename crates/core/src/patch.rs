// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Patch application result types.

use serde::{Deserialize, Serialize};

/// Line-count statistics for an applied patch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub added: u32,
    pub removed: u32,
    pub net_change: i64,
    pub files_modified: u32,
}

impl DiffStats {
    pub fn new(added: u32, removed: u32, files_modified: u32) -> Self {
        Self {
            added,
            removed,
            net_change: i64::from(added) - i64::from(removed),
            files_modified,
        }
    }

    /// Total changed lines, the quantity bounded by the patch ceiling.
    pub fn changed(&self) -> u32 {
        self.added + self.removed
    }
}

/// Why a patch was rejected. Checked in this order; the first matching rule
/// short-circuits and no filesystem mutation happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RejectReason {
    /// The patch deletes a protected file (manifest, lockfile, ...).
    ProtectedFile { path: String },
    /// Total changed lines exceed the configured ceiling.
    TooLarge { changed: u32, limit: u32 },
    /// The text is not parseable as a sequence of file hunks.
    Unparseable { detail: String },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::ProtectedFile { path } => {
                write!(f, "patch deletes protected file: {}", path)
            }
            RejectReason::TooLarge { changed, limit } => {
                write!(f, "patch too large: {} changed lines (limit {})", changed, limit)
            }
            RejectReason::Unparseable { detail } => {
                write!(f, "patch not parseable: {}", detail)
            }
        }
    }
}

/// Outcome of `Sandbox::apply_patch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchResult {
    pub applied: bool,
    pub applied_files: Vec<String>,
    pub diff_stats: DiffStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_reason: Option<RejectReason>,
}

impl PatchResult {
    pub fn applied(applied_files: Vec<String>, diff_stats: DiffStats) -> Self {
        Self {
            applied: true,
            applied_files,
            diff_stats,
            rejected_reason: None,
        }
    }

    pub fn rejected(reason: RejectReason) -> Self {
        Self {
            applied: false,
            applied_files: Vec::new(),
            diff_stats: DiffStats::default(),
            rejected_reason: Some(reason),
        }
    }
}

#[cfg(test)]
#[path = "patch_tests.rs"]
mod tests;
