// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Memory layer: successful `(plan, patch)` pairs keyed by pattern.
//!
//! Entries live behind per-key locks under a read-mostly index so unrelated
//! tasks never contend on one global lock. The table is bounded; inserting
//! past capacity evicts the entry with the lowest `success_count` (oldest
//! first on ties). Recording happens only on confirmed task success, and a
//! seeded patch still goes through the full sandbox validation pipeline;
//! memory never bypasses validation.

use mend_core::{PatternKey, Plan, Template};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// A stored successful outcome for one pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryEntry {
    pub pattern: PatternKey,
    pub plan: Plan,
    pub patch: String,
    pub success_count: u32,
    pub first_recorded_ms: u64,
}

/// Bounded, per-key-locked store of successful patterns.
pub struct MemoryLayer {
    capacity: usize,
    seed_min_success: u32,
    entries: RwLock<HashMap<String, Arc<Mutex<MemoryEntry>>>>,
}

impl MemoryLayer {
    pub fn new(capacity: usize, seed_min_success: u32) -> Self {
        Self {
            capacity,
            seed_min_success,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Exact `(template, fingerprint)` lookup.
    pub fn lookup(&self, template: Template, instruction: &str) -> Option<MemoryEntry> {
        let key = PatternKey::new(template, instruction).to_string();
        let slot = self.entries.read().get(&key).cloned()?;
        let entry = slot.lock().clone();
        Some(entry)
    }

    /// Whether an entry is confident enough to seed a new run's plan and
    /// patch without calling the gateway.
    pub fn is_seedable(&self, entry: &MemoryEntry) -> bool {
        entry.success_count >= self.seed_min_success
    }

    /// Record a confirmed success: insert, or increment the existing entry
    /// (keeping the most recent plan/patch). Evicts at capacity.
    pub fn record(&self, pattern: PatternKey, plan: Plan, patch: String, now_ms: u64) {
        let key = pattern.to_string();

        if let Some(slot) = self.entries.read().get(&key).cloned() {
            let mut entry = slot.lock();
            entry.success_count += 1;
            entry.plan = plan;
            entry.patch = patch;
            return;
        }

        let mut index = self.entries.write();
        // Racing insert may have landed between the read and write lock.
        if let Some(slot) = index.get(&key) {
            let mut entry = slot.lock();
            entry.success_count += 1;
            entry.plan = plan;
            entry.patch = patch;
            return;
        }

        if index.len() >= self.capacity {
            evict_one(&mut index);
        }

        tracing::debug!(pattern = %pattern, "memory entry recorded");
        index.insert(
            key,
            Arc::new(Mutex::new(MemoryEntry {
                pattern,
                plan,
                patch,
                success_count: 1,
                first_recorded_ms: now_ms,
            })),
        );
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of all entries, for display.
    pub fn snapshot(&self) -> Vec<MemoryEntry> {
        let index = self.entries.read();
        let mut entries: Vec<MemoryEntry> =
            index.values().map(|slot| slot.lock().clone()).collect();
        entries.sort_by(|a, b| b.success_count.cmp(&a.success_count));
        entries
    }
}

/// Remove the entry with the lowest `success_count`, oldest first on ties.
fn evict_one(index: &mut HashMap<String, Arc<Mutex<MemoryEntry>>>) {
    let victim = index
        .iter()
        .map(|(key, slot)| {
            let entry = slot.lock();
            (entry.success_count, entry.first_recorded_ms, key.clone())
        })
        .min();
    if let Some((count, _, key)) = victim {
        tracing::debug!(pattern = %key, success_count = count, "memory entry evicted");
        index.remove(&key);
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
