// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Starter project templates.
//!
//! The set of supported templates is fixed; submitting an unknown template
//! name fails at the submission boundary before any sandbox work happens.

use serde::{Deserialize, Serialize};

/// A supported starter project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    React,
    Express,
    Flask,
}

impl Template {
    pub const ALL: [Template; 3] = [Template::React, Template::Express, Template::Flask];

    /// Parse a template name. Returns `None` for unknown names; the caller
    /// surfaces that as a `TemplateNotFound` submission error.
    pub fn parse(name: &str) -> Option<Template> {
        match name {
            "react" => Some(Template::React),
            "express" => Some(Template::Express),
            "flask" => Some(Template::Flask),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Template::React => "react",
            Template::Express => "express",
            Template::Flask => "flask",
        }
    }

    /// The test command a coding agent would run for this template.
    ///
    /// Only meaningful when allowlisted by the command gate; the testing
    /// stage itself uses the sandbox's deterministic template checks.
    pub fn test_command(&self) -> &'static str {
        match self {
            Template::React | Template::Express => "npm test",
            Template::Flask => "pytest",
        }
    }
}

crate::simple_display! {
    Template {
        React => "react",
        Express => "express",
        Flask => "flask",
    }
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
