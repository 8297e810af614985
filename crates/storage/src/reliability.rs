// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reliability tracker: per-pattern outcome statistics and quarantine.
//!
//! Records follow the same per-key locking discipline as the memory layer.
//! A pattern is quarantined once its consecutive failures reach the
//! threshold; a success resets the streak. Global counters feed the
//! `metrics` surface and are written only by the orchestrator and the agent
//! gateway paths.

use mend_core::{PatternKey, Role};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Outcome statistics for one pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReliabilityRecord {
    pub total_attempts: u32,
    pub total_failures: u32,
    pub consecutive_failures: u32,
}

/// Global observability counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_tasks: u64,
    pub successful_tasks: u64,
    pub failed_tasks: u64,
    pub total_iterations: u64,
    pub total_tokens: u64,
    pub avg_time_to_first_event_ms: f64,
    pub avg_iterations_to_pass: f64,
    /// Corrective-retry counts per gateway role.
    pub retry_counts: BTreeMap<String, u64>,
    /// Histogram of terminal failure modes.
    pub failure_modes: BTreeMap<String, u64>,
}

/// Per-pattern reliability records plus global counters.
pub struct ReliabilityTracker {
    threshold: u32,
    records: RwLock<HashMap<String, Arc<Mutex<ReliabilityRecord>>>>,
    metrics: Mutex<Metrics>,
}

impl ReliabilityTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            records: RwLock::new(HashMap::new()),
            metrics: Mutex::new(Metrics::default()),
        }
    }

    fn slot(&self, pattern: &PatternKey) -> Arc<Mutex<ReliabilityRecord>> {
        let key = pattern.to_string();
        if let Some(slot) = self.records.read().get(&key).cloned() {
            return slot;
        }
        self.records
            .write()
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(ReliabilityRecord::default())))
            .clone()
    }

    /// Record a terminal attempt for a pattern.
    pub fn record_attempt(&self, pattern: &PatternKey, success: bool) {
        let slot = self.slot(pattern);
        let mut record = slot.lock();
        record.total_attempts += 1;
        if success {
            record.consecutive_failures = 0;
        } else {
            record.total_failures += 1;
            record.consecutive_failures += 1;
            if record.consecutive_failures >= self.threshold {
                tracing::warn!(
                    pattern = %pattern,
                    consecutive_failures = record.consecutive_failures,
                    "pattern quarantined"
                );
            }
        }
    }

    /// Whether new submissions for this pattern are rejected outright.
    pub fn is_quarantined(&self, pattern: &PatternKey) -> bool {
        let key = pattern.to_string();
        let Some(slot) = self.records.read().get(&key).cloned() else {
            return false;
        };
        let quarantined = slot.lock().consecutive_failures >= self.threshold;
        quarantined
    }

    pub fn record_for(&self, pattern: &PatternKey) -> Option<ReliabilityRecord> {
        let key = pattern.to_string();
        let slot = self.records.read().get(&key).cloned()?;
        let record = slot.lock().clone();
        Some(record)
    }

    /// Record corrective retries for a gateway role.
    pub fn record_retries(&self, role: Role, attempts: u32) {
        if attempts == 0 {
            return;
        }
        let mut metrics = self.metrics.lock();
        *metrics.retry_counts.entry(role.as_str().to_string()).or_default() +=
            u64::from(attempts);
    }

    /// Bump the failure-mode histogram.
    pub fn record_failure_mode(&self, mode: &str) {
        let mut metrics = self.metrics.lock();
        *metrics.failure_modes.entry(mode.to_string()).or_default() += 1;
    }

    /// Accumulate tokens consumed by gateway calls.
    pub fn record_tokens(&self, tokens: u64) {
        if tokens == 0 {
            return;
        }
        self.metrics.lock().total_tokens += tokens;
    }

    /// Fold a completed run into the global counters.
    pub fn record_completion(
        &self,
        success: bool,
        iterations: u32,
        time_to_first_event_ms: Option<u64>,
    ) {
        let mut metrics = self.metrics.lock();
        let finished_before = metrics.successful_tasks + metrics.failed_tasks;
        metrics.total_tasks += 1;
        metrics.total_iterations += u64::from(iterations);

        if let Some(ttfe) = time_to_first_event_ms {
            metrics.avg_time_to_first_event_ms = running_avg(
                metrics.avg_time_to_first_event_ms,
                finished_before,
                ttfe as f64,
            );
        }

        if success {
            metrics.successful_tasks += 1;
            metrics.avg_iterations_to_pass = running_avg(
                metrics.avg_iterations_to_pass,
                metrics.successful_tasks - 1,
                f64::from(iterations),
            );
        } else {
            metrics.failed_tasks += 1;
        }
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics.lock().clone()
    }
}

fn running_avg(current: f64, count: u64, sample: f64) -> f64 {
    (current * count as f64 + sample) / (count + 1) as f64
}

#[cfg(test)]
#[path = "reliability_tests.rs"]
mod tests;
