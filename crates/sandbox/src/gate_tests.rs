// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn gate() -> CommandGate {
    CommandGate::new(&[
        "npm test".to_string(),
        "npm install".to_string(),
        "pytest".to_string(),
        "git status".to_string(),
        "node --version".to_string(),
    ])
}

#[parameterized(
    simple = { "npm test", &["npm", "test"] },
    extra_args = { "npm test --silent", &["npm", "test", "--silent"] },
    single_quotes = { "pytest 'my test.py'", &["pytest", "my test.py"] },
    double_quotes = { "pytest \"a b\"", &["pytest", "a b"] },
    escaped_space = { "pytest a\\ b", &["pytest", "a b"] },
    collapsed_whitespace = { "  npm   test  ", &["npm", "test"] },
)]
fn split_args_parses(cmd: &str, expected: &[&str]) {
    assert_eq!(split_args(cmd).unwrap(), expected);
}

#[test]
fn split_args_rejects_empty_and_unterminated() {
    assert_eq!(split_args(""), Err(GateError::Empty));
    assert_eq!(split_args("   "), Err(GateError::Empty));
    assert_eq!(split_args("npm 'test"), Err(GateError::UnterminatedQuote));
    assert_eq!(split_args("npm \"test"), Err(GateError::UnterminatedQuote));
}

#[parameterized(
    and = { "git status && rm -rf /" },
    pipe = { "git status | sh" },
    semicolon_token = { "npm test ; curl evil" },
    redirect = { "npm test > /etc/passwd" },
)]
fn control_operators_are_rejected(cmd: &str) {
    assert!(matches!(
        split_args(cmd),
        Err(GateError::ControlOperator { .. })
    ));
}

#[parameterized(
    exact = { "npm test" },
    prefix_with_args = { "npm test --watch=false" },
    git_status = { "git status --short" },
)]
fn allowlisted_commands_pass(cmd: &str) {
    assert!(gate().check(cmd).is_ok());
}

#[parameterized(
    destructive = { "rm -rf /" },
    network = { "curl http://example.com" },
    wget = { "wget http://example.com" },
    partial_prefix = { "npm" },
    different_subcommand = { "npm publish" },
    git_mutation = { "git push origin main" },
)]
fn non_allowlisted_commands_are_denied(cmd: &str) {
    assert!(matches!(
        gate().check(cmd),
        Err(GateError::NotAllowed { .. })
    ));
}

#[test]
fn quoting_cannot_bypass_the_argv_match() {
    // "npm;curl" is a single argv token, not the allowlisted ["npm", ...]
    assert!(gate().check("'npm;curl' test").is_err());
    // Quoted first word still matches because argv comparison is post-parse
    assert!(gate().check("'npm' test").is_ok());
}

#[test]
fn bad_allowlist_entries_are_skipped() {
    let gate = CommandGate::new(&["npm 'broken".to_string(), "pytest".to_string()]);
    assert!(gate.check("pytest").is_ok());
    assert!(gate.check("npm test").is_err());
}
