// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pattern keys for memory lookup and quarantine tracking.
//!
//! A pattern is `(template, instruction_fingerprint)`. The fingerprint is an
//! exact-normalized-text hash: trim, lowercase, collapse internal whitespace,
//! then sha256 truncated to 16 hex characters. Semantic similarity is a
//! future enhancement, not a hidden requirement here.

use crate::template::Template;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the sha256 digest.
const FINGERPRINT_LEN: usize = 16;

/// Normalize instruction text for fingerprinting.
fn normalize(instruction: &str) -> String {
    instruction
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compute the fingerprint of an instruction.
pub fn instruction_fingerprint(instruction: &str) -> String {
    let digest = Sha256::digest(normalize(instruction).as_bytes());
    let mut hex = String::with_capacity(FINGERPRINT_LEN);
    for byte in digest.iter().take(FINGERPRINT_LEN / 2) {
        hex.push_str(&format!("{:02x}", byte));
    }
    hex
}

/// The `(template, instruction_fingerprint)` key shared by the memory layer
/// and the reliability tracker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternKey {
    pub template: Template,
    pub fingerprint: String,
}

impl PatternKey {
    pub fn new(template: Template, instruction: &str) -> Self {
        Self {
            template,
            fingerprint: instruction_fingerprint(instruction),
        }
    }
}

impl std::fmt::Display for PatternKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.template, self.fingerprint)
    }
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
