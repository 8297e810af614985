// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command gate: allowlist enforcement on parsed argument vectors.
//!
//! Matching is prefix-based on the parsed argv, never on the raw shell
//! string, so quoting or metacharacter tricks cannot smuggle a command past
//! the allowlist. Commands are later executed directly (no shell), and any
//! token that is a shell control operator is rejected outright.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("empty command")]
    Empty,
    #[error("unterminated quote in command")]
    UnterminatedQuote,
    #[error("shell control operator not supported: {token}")]
    ControlOperator { token: String },
    #[error("command not allowed: {cmd}")]
    NotAllowed { cmd: String },
}

/// Tokens that would only make sense to a shell. We never invoke one, so
/// their presence means the caller expected shell semantics, so deny.
const CONTROL_OPERATORS: [&str; 8] = ["&&", "||", ";", "|", ">", ">>", "<", "&"];

/// Split a command string into an argument vector.
///
/// Supports single quotes (literal), double quotes (backslash escapes), and
/// backslash escapes outside quotes. No expansions, no substitutions.
pub fn split_args(cmd: &str) -> Result<Vec<String>, GateError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = cmd.chars();

    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' | '\n' => {
                if in_word {
                    args.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(inner) => current.push(inner),
                        None => return Err(GateError::UnterminatedQuote),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped) => current.push(escaped),
                            None => return Err(GateError::UnterminatedQuote),
                        },
                        Some(inner) => current.push(inner),
                        None => return Err(GateError::UnterminatedQuote),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            _ => {
                in_word = true;
                current.push(c);
            }
        }
    }
    if in_word {
        args.push(current);
    }

    if args.is_empty() {
        return Err(GateError::Empty);
    }
    for arg in &args {
        if CONTROL_OPERATORS.contains(&arg.as_str()) {
            return Err(GateError::ControlOperator { token: arg.clone() });
        }
    }
    Ok(args)
}

/// Allowlist of exact commands or command prefixes.
#[derive(Debug, Clone)]
pub struct CommandGate {
    entries: Vec<Vec<String>>,
}

impl CommandGate {
    /// Build from allowlist entries (each an exact command or a prefix).
    /// Entries that fail to parse are dropped with a warning rather than
    /// poisoning the whole gate.
    pub fn new(allowlist: &[String]) -> Self {
        let mut entries = Vec::with_capacity(allowlist.len());
        for entry in allowlist {
            match split_args(entry) {
                Ok(argv) => entries.push(argv),
                Err(err) => {
                    tracing::warn!(entry = %entry, error = %err, "skipping bad allowlist entry");
                }
            }
        }
        Self { entries }
    }

    /// Parse `cmd` and check it against the allowlist. Returns the argv that
    /// may be executed; denied commands never execute.
    pub fn check(&self, cmd: &str) -> Result<Vec<String>, GateError> {
        let argv = split_args(cmd)?;
        if self.is_allowed(&argv) {
            Ok(argv)
        } else {
            Err(GateError::NotAllowed {
                cmd: cmd.to_string(),
            })
        }
    }

    /// Whether the parsed argv matches any allowlist prefix.
    pub fn is_allowed(&self, argv: &[String]) -> bool {
        self.entries.iter().any(|entry| {
            entry.len() <= argv.len() && entry.iter().zip(argv).all(|(a, b)| a == b)
        })
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
