// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    whitespace = { "add division", "  add   division  " },
    case = { "Add Division", "add division" },
    newlines = { "add\ndivision", "add division" },
)]
fn normalization_equivalent_instructions_share_fingerprint(a: &str, b: &str) {
    assert_eq!(instruction_fingerprint(a), instruction_fingerprint(b));
}

#[test]
fn different_instructions_differ() {
    assert_ne!(
        instruction_fingerprint("add division"),
        instruction_fingerprint("add subtraction")
    );
}

#[test]
fn fingerprint_is_fixed_width_hex() {
    let fp = instruction_fingerprint("add division");
    assert_eq!(fp.len(), 16);
    assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn pattern_key_display_combines_template_and_fingerprint() {
    let key = PatternKey::new(Template::React, "add division");
    let shown = key.to_string();
    assert!(shown.starts_with("react:"));
    assert!(shown.ends_with(&key.fingerprint));
}

#[test]
fn pattern_key_equality_is_by_template_and_text() {
    let a = PatternKey::new(Template::React, "add division");
    let b = PatternKey::new(Template::React, "ADD  DIVISION");
    let c = PatternKey::new(Template::Flask, "add division");
    assert_eq!(a, b);
    assert_ne!(a, c);
}
