// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;
use yare::parameterized;

#[parameterized(
    react = { Template::React, &["package.json", "src/calculator.js", "src/calculator.test.js"] },
    express = { Template::Express, &["package.json", "src/app.js", "src/app.test.js"] },
    flask = { Template::Flask, &["requirements.txt", "app.py", "test_app.py"] },
)]
fn materialize_writes_expected_files(template: Template, files: &[&str]) {
    let dir = tempdir().unwrap();
    materialize(template, dir.path()).unwrap();
    for file in files {
        assert!(dir.path().join(file).exists(), "missing {file}");
    }
}

#[test]
fn react_starter_has_no_divide_yet() {
    let dir = tempdir().unwrap();
    materialize(Template::React, dir.path()).unwrap();
    let calc = std::fs::read_to_string(dir.path().join("src/calculator.js")).unwrap();
    assert!(calc.contains("add(a, b)"));
    assert!(!calc.contains("divide("));
}

#[test]
fn materialize_creates_missing_repo_dir() {
    let dir = tempdir().unwrap();
    let repo = dir.path().join("nested/repo");
    materialize(Template::Flask, &repo).unwrap();
    assert!(repo.join("app.py").exists());
}
