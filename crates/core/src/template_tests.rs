// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    react = { "react", Template::React },
    express = { "express", Template::Express },
    flask = { "flask", Template::Flask },
)]
fn parse_known_names(name: &str, expected: Template) {
    assert_eq!(Template::parse(name), Some(expected));
    assert_eq!(expected.as_str(), name);
    assert_eq!(expected.to_string(), name);
}

#[parameterized(
    unknown = { "django" },
    empty = { "" },
    case_sensitive = { "React" },
)]
fn parse_rejects_unknown_names(name: &str) {
    assert_eq!(Template::parse(name), None);
}

#[test]
fn serde_uses_snake_case() {
    let json = serde_json::to_string(&Template::React).unwrap();
    assert_eq!(json, "\"react\"");
    let parsed: Template = serde_json::from_str("\"flask\"").unwrap();
    assert_eq!(parsed, Template::Flask);
}
