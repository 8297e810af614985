// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only write-ahead log of task events.
//!
//! One JSON object per line: `{"seq": N, "event": {...}}`. Sequence numbers
//! are monotonic starting at 1. Entries are never rewritten; recovery is a
//! full replay from the start of the file.

use mend_core::TaskEvent;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("wal io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("wal corrupt at line {line}: {source}")]
    Corrupt {
        line: usize,
        source: serde_json::Error,
    },
}

/// One persisted log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    pub event: TaskEvent,
}

/// Append-only event log backed by a JSONL file.
#[derive(Debug)]
pub struct Wal {
    path: PathBuf,
    writer: BufWriter<File>,
    write_seq: u64,
}

impl Wal {
    /// Open the log at `path`, creating it (and its parent directory) if
    /// absent. Scans existing entries to resume the sequence counter.
    pub fn open(path: &Path) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let write_seq = if path.exists() {
            read_entries(path)?.last().map(|e| e.seq).unwrap_or(0)
        } else {
            0
        };
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            write_seq,
        })
    }

    /// Append an event, returning its sequence number. Not durable until
    /// [`Wal::flush`].
    pub fn append(&mut self, event: &TaskEvent) -> Result<u64, WalError> {
        self.write_seq += 1;
        let entry = WalEntry {
            seq: self.write_seq,
            event: event.clone(),
        };
        let mut line = serde_json::to_string(&entry).map_err(|source| WalError::Corrupt {
            line: self.write_seq as usize,
            source,
        })?;
        line.push('\n');
        self.writer.write_all(line.as_bytes())?;
        Ok(self.write_seq)
    }

    /// Flush buffered entries and sync file data to disk.
    pub fn flush(&mut self) -> Result<(), WalError> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        Ok(())
    }

    /// Read every entry from disk, in sequence order.
    pub fn entries(&self) -> Result<Vec<WalEntry>, WalError> {
        read_entries(&self.path)
    }

    /// Read entries with `seq > after`.
    pub fn entries_after(&self, after: u64) -> Result<Vec<WalEntry>, WalError> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|e| e.seq > after)
            .collect())
    }

    /// Highest sequence number appended so far.
    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }
}

fn read_entries(path: &Path) -> Result<Vec<WalEntry>, WalError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut entries = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: WalEntry =
            serde_json::from_str(&line).map_err(|source| WalError::Corrupt {
                line: idx + 1,
                source,
            })?;
        entries.push(entry);
    }
    Ok(entries)
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
