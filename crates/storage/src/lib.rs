// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mend-storage: durable event log and state derived from it.
//!
//! Everything that must survive a restart (tasks, their events, memory
//! entries, reliability records) flows through one append-only WAL of
//! [`TaskEvent`]s. `Store::open` replays the log into the in-memory
//! structures; `Store::append` is the single write path and flushes before
//! returning, so an event is durable before the orchestrator starts the
//! next stage.

mod memory;
mod reliability;
mod state;
mod wal;

pub use memory::{MemoryEntry, MemoryLayer};
pub use reliability::{Metrics, ReliabilityRecord, ReliabilityTracker};
pub use state::MaterializedState;
pub use wal::{Wal, WalEntry, WalError};

use mend_core::{EngineConfig, RunId, Task, TaskEvent, TaskId};
use parking_lot::Mutex;
use std::path::Path;

/// Composed persistent store: WAL + materialized state + memory layer +
/// reliability tracker.
pub struct Store {
    wal: Mutex<Wal>,
    state: Mutex<MaterializedState>,
    memory: MemoryLayer,
    reliability: ReliabilityTracker,
}

impl Store {
    /// Open (or create) the store under `state_dir`, replaying any existing
    /// WAL into memory.
    pub fn open(state_dir: &Path, config: &EngineConfig) -> Result<Self, WalError> {
        let wal = Wal::open(&state_dir.join("events.wal"))?;
        let memory = MemoryLayer::new(config.memory_capacity, config.memory_seed_min_success);
        let reliability = ReliabilityTracker::new(config.quarantine_threshold);
        let mut state = MaterializedState::default();

        let entries = wal.entries()?;
        for entry in &entries {
            state.apply_event(&entry.event, &memory, &reliability);
        }
        if !entries.is_empty() {
            tracing::info!(
                entries = entries.len(),
                tasks = state.tasks.len(),
                "replayed event log"
            );
        }

        Ok(Self {
            wal: Mutex::new(wal),
            state: Mutex::new(state),
            memory,
            reliability,
        })
    }

    /// Append an event durably and apply it to the derived state.
    ///
    /// Returns the WAL sequence number. The event has been flushed to disk
    /// when this returns; callers may rely on that ordering guarantee.
    pub fn append(&self, event: &TaskEvent) -> Result<u64, WalError> {
        let seq = {
            let mut wal = self.wal.lock();
            let seq = wal.append(event)?;
            wal.flush()?;
            seq
        };
        self.state
            .lock()
            .apply_event(event, &self.memory, &self.reliability);
        Ok(seq)
    }

    pub fn task(&self, task_id: &TaskId) -> Option<Task> {
        self.state.lock().tasks.get(task_id.as_str()).cloned()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().tasks.values().cloned().collect()
    }

    /// All events for a task, in replay order.
    pub fn events(&self, task_id: &TaskId) -> Vec<TaskEvent> {
        self.state
            .lock()
            .events
            .get(task_id.as_str())
            .cloned()
            .unwrap_or_default()
    }

    /// Events for one run of a task, ordered by `(iteration, timestamp)`.
    pub fn run_events(&self, task_id: &TaskId, run_id: &RunId) -> Vec<TaskEvent> {
        let mut events: Vec<TaskEvent> = self
            .events(task_id)
            .into_iter()
            .filter(|e| e.run_id == *run_id)
            .collect();
        events.sort_by_key(TaskEvent::ordering_key);
        events
    }

    pub fn memory(&self) -> &MemoryLayer {
        &self.memory
    }

    pub fn reliability(&self) -> &ReliabilityTracker {
        &self.reliability
    }

    /// Highest WAL sequence written so far.
    pub fn wal_seq(&self) -> u64 {
        self.wal.lock().write_seq()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
