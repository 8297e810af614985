// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration with defaults and optional TOML overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunable limits and policy for the orchestrator and sandbox.
///
/// Every field has a default; a TOML config file may override any subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Coding attempts before a task fails.
    pub max_iterations: u32,
    /// Consecutive failures that quarantine a pattern.
    pub quarantine_threshold: u32,
    /// Maximum stored memory entries; insertion beyond evicts.
    pub memory_capacity: usize,
    /// Minimum success_count for a memory entry to seed a new run.
    pub memory_seed_min_success: u32,
    /// Maximum changed lines per patch.
    pub max_patch_lines: u32,
    /// Files a patch may never delete.
    pub protected_files: Vec<String>,
    /// Allowlisted command prefixes, matched on the parsed argument vector.
    pub command_allowlist: Vec<String>,
    /// Wall-clock ceiling for sandbox commands, seconds.
    pub command_timeout_secs: u64,
    /// Memory ceiling for sandbox commands, megabytes.
    pub memory_limit_mb: u64,
    /// CPU ceiling for sandbox commands, percent.
    pub cpu_limit_percent: u8,
    /// Timeout for a single gateway call, seconds.
    pub gateway_timeout_secs: u64,
    /// Corrective follow-up calls before falling back to the stub.
    pub max_corrective_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            quarantine_threshold: 3,
            memory_capacity: 100,
            memory_seed_min_success: 2,
            max_patch_lines: 50,
            protected_files: [
                "package.json",
                "package-lock.json",
                "yarn.lock",
                "requirements.txt",
                "setup.py",
                "pyproject.toml",
                ".gitignore",
                "README.md",
                "Dockerfile",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            command_allowlist: [
                "npm test",
                "npm run test",
                "npm install",
                "pytest",
                "python -m pytest",
                "python -m unittest",
                "node --version",
                "python --version",
                "git status",
                "git log",
                "git show",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            command_timeout_secs: 30,
            memory_limit_mb: 512,
            cpu_limit_percent: 80,
            gateway_timeout_secs: 30,
            max_corrective_retries: 2,
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file, falling back to defaults for absent keys.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Load from `path` if it exists, otherwise defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
