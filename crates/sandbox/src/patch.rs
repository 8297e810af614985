// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unified-diff parsing, validation, and application.
//!
//! Validation is all-or-nothing: every rejection rule runs before a single
//! byte is written, and application computes every file's new contents in
//! memory before any write. Writes go through a temp file + rename in the
//! target directory.

use mend_core::{DiffStats, RejectReason};
use std::path::{Component, Path};

/// One line inside a hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HunkLine {
    Context(String),
    Add(String),
    Remove(String),
}

/// One `@@` hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// 1-based start line in the old file.
    pub old_start: usize,
    pub lines: Vec<HunkLine>,
}

/// All hunks touching one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePatch {
    /// Repo-relative path.
    pub path: String,
    pub hunks: Vec<Hunk>,
    /// True when the new side is `/dev/null` (file deletion).
    pub dev_null: bool,
}

impl FilePatch {
    pub fn added(&self) -> u32 {
        self.count(|l| matches!(l, HunkLine::Add(_)))
    }

    pub fn removed(&self) -> u32 {
        self.count(|l| matches!(l, HunkLine::Remove(_)))
    }

    fn count(&self, pred: impl Fn(&HunkLine) -> bool) -> u32 {
        self.hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| pred(l))
            .count() as u32
    }

    /// Deletion semantics: removals with no additions, or a `/dev/null`
    /// target.
    pub fn is_pure_deletion(&self) -> bool {
        self.dev_null || (self.removed() > 0 && self.added() == 0)
    }
}

/// Rejection policy for [`validate`].
#[derive(Debug, Clone)]
pub struct PatchPolicy {
    pub protected_files: Vec<String>,
    pub max_changed_lines: u32,
}

/// Parse a unified diff into per-file patches.
///
/// Tolerates `diff --git`/`index` headers and a trailing `COMMIT:` marker
/// line. Fails on missing file headers, hunk content outside a hunk, or
/// paths that would escape the repo.
pub fn parse(diff: &str) -> Result<Vec<FilePatch>, String> {
    let mut files: Vec<FilePatch> = Vec::new();
    let mut pending_old: Option<String> = None;

    for line in diff.lines() {
        if let Some(rest) = line.strip_prefix("--- ") {
            pending_old = Some(strip_side_prefix(rest, "a/"));
        } else if let Some(rest) = line.strip_prefix("+++ ") {
            let new_path = strip_side_prefix(rest, "b/");
            let old_path = pending_old.take().ok_or("+++ without matching ---")?;
            let dev_null = new_path == "/dev/null";
            let path = if dev_null { old_path } else { new_path };
            if path == "/dev/null" {
                return Err("patch has /dev/null on both sides".to_string());
            }
            check_path(&path)?;
            files.push(FilePatch {
                path,
                hunks: Vec::new(),
                dev_null,
            });
        } else if line.starts_with("@@") {
            let old_start = parse_hunk_header(line)?;
            let file = files.last_mut().ok_or("hunk header before file header")?;
            file.hunks.push(Hunk {
                old_start,
                lines: Vec::new(),
            });
        } else if line.starts_with("diff ")
            || line.starts_with("index ")
            || line.starts_with("COMMIT:")
            || line.starts_with('\\')
        {
            // git-style headers, commit marker, "\ No newline at end of file"
        } else if let Some(hunk) = files.last_mut().and_then(|f| f.hunks.last_mut()) {
            if let Some(rest) = line.strip_prefix('+') {
                hunk.lines.push(HunkLine::Add(rest.to_string()));
            } else if let Some(rest) = line.strip_prefix('-') {
                hunk.lines.push(HunkLine::Remove(rest.to_string()));
            } else if let Some(rest) = line.strip_prefix(' ') {
                hunk.lines.push(HunkLine::Context(rest.to_string()));
            } else if line.is_empty() {
                // Some generators emit blank context lines without the space
                hunk.lines.push(HunkLine::Context(String::new()));
            } else {
                return Err(format!("unexpected line in hunk: {}", line));
            }
        } else if !line.trim().is_empty() {
            return Err(format!("content outside any hunk: {}", line));
        }
    }

    if files.is_empty() {
        return Err("no file headers found".to_string());
    }
    for file in &files {
        if file.hunks.is_empty() && !file.dev_null {
            return Err(format!("no hunks for file: {}", file.path));
        }
    }
    Ok(files)
}

/// Check the patch against the policy. Rules run in order and the first
/// match short-circuits; an unparseable patch can only trip the parse rule,
/// since the first two need parsed hunks.
pub fn validate(patches: &[FilePatch], policy: &PatchPolicy) -> Option<RejectReason> {
    for patch in patches {
        if patch.is_pure_deletion() && is_protected(&patch.path, policy) {
            return Some(RejectReason::ProtectedFile {
                path: patch.path.clone(),
            });
        }
    }

    let changed: u32 = patches.iter().map(|p| p.added() + p.removed()).sum();
    if changed > policy.max_changed_lines {
        return Some(RejectReason::TooLarge {
            changed,
            limit: policy.max_changed_lines,
        });
    }

    None
}

/// Aggregate statistics across all file patches.
pub fn stats(patches: &[FilePatch]) -> DiffStats {
    let added = patches.iter().map(FilePatch::added).sum();
    let removed = patches.iter().map(FilePatch::removed).sum();
    DiffStats::new(added, removed, patches.len() as u32)
}

/// Apply parsed patches under `root`. Every file's new content is computed
/// before the first write; each write is temp-file + rename.
pub fn apply(root: &Path, patches: &[FilePatch]) -> std::io::Result<Vec<String>> {
    let mut staged: Vec<(String, Option<String>)> = Vec::with_capacity(patches.len());
    for patch in patches {
        if patch.dev_null {
            staged.push((patch.path.clone(), None));
            continue;
        }
        let target = root.join(&patch.path);
        let original = if target.exists() {
            read_lines(&target)?
        } else {
            Vec::new()
        };
        let new_lines = apply_hunks(&original, &patch.hunks);
        let mut content = new_lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        staged.push((patch.path.clone(), Some(content)));
    }

    let mut applied = Vec::with_capacity(staged.len());
    for (rel, content) in staged {
        let target = root.join(&rel);
        match content {
            Some(content) => {
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let tmp = target.with_extension("mend-tmp");
                std::fs::write(&tmp, content)?;
                std::fs::rename(&tmp, &target)?;
            }
            None => {
                if target.exists() {
                    std::fs::remove_file(&target)?;
                }
            }
        }
        applied.push(rel);
    }
    Ok(applied)
}

/// Positional hunk application: context and removals consume original
/// lines from the hunk's start position, additions insert. Mirrors how the
/// coder role is prompted to produce hunks (fresh template, known offsets).
fn apply_hunks(original: &[String], hunks: &[Hunk]) -> Vec<String> {
    let mut ordered: Vec<&Hunk> = hunks.iter().collect();
    ordered.sort_by_key(|h| h.old_start);

    let mut result = Vec::with_capacity(original.len());
    let mut cursor = 0usize;
    for hunk in ordered {
        let start = hunk
            .old_start
            .saturating_sub(1)
            .clamp(cursor, original.len());
        result.extend(original[cursor..start].iter().cloned());
        cursor = start;
        for line in &hunk.lines {
            match line {
                HunkLine::Context(text) => {
                    result.push(text.clone());
                    if cursor < original.len() {
                        cursor += 1;
                    }
                }
                HunkLine::Remove(_) => {
                    if cursor < original.len() {
                        cursor += 1;
                    }
                }
                HunkLine::Add(text) => result.push(text.clone()),
            }
        }
    }
    result.extend(original[cursor..].iter().cloned());
    result
}

fn strip_side_prefix(rest: &str, side: &str) -> String {
    let path = rest.split('\t').next().unwrap_or(rest).trim();
    if path == "/dev/null" {
        return path.to_string();
    }
    path.strip_prefix(side).unwrap_or(path).to_string()
}

fn parse_hunk_header(line: &str) -> Result<usize, String> {
    // @@ -old[,count] +new[,count] @@
    let old = line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.strip_prefix('-'))
        .ok_or_else(|| format!("bad hunk header: {}", line))?;
    let start = old.split(',').next().unwrap_or(old);
    start
        .parse::<usize>()
        .map_err(|_| format!("bad hunk header: {}", line))
}

fn check_path(path: &str) -> Result<(), String> {
    let p = Path::new(path);
    if p.is_absolute() {
        return Err(format!("absolute path in patch: {}", path));
    }
    if p.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(format!("path escapes the workspace: {}", path));
    }
    Ok(())
}

fn is_protected(path: &str, policy: &PatchPolicy) -> bool {
    let name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    policy
        .protected_files
        .iter()
        .any(|p| p == path || *p == name)
}

fn read_lines(path: &Path) -> std::io::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(text.lines().map(|l| l.to_string()).collect())
}

#[cfg(test)]
#[path = "patch_tests.rs"]
mod tests;
