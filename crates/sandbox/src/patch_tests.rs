// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

const DIVIDE_DIFF: &str = r#"--- a/src/calculator.js
+++ b/src/calculator.js
@@ -9,2 +9,9 @@

+  divide(a, b) {
+    if (b === 0) {
+      throw new Error('Division by zero');
+    }
+    return a / b;
+  }
+
   multiply(a, b) {
COMMIT: Add division function with divide-by-zero guard
"#;

fn policy() -> PatchPolicy {
    PatchPolicy {
        protected_files: vec!["package.json".to_string(), "README.md".to_string()],
        max_changed_lines: 50,
    }
}

#[test]
fn parse_extracts_files_and_hunks() {
    let patches = parse(DIVIDE_DIFF).unwrap();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].path, "src/calculator.js");
    assert_eq!(patches[0].hunks.len(), 1);
    assert_eq!(patches[0].hunks[0].old_start, 9);
    assert_eq!(patches[0].added(), 7);
    assert_eq!(patches[0].removed(), 0);
    assert!(!patches[0].is_pure_deletion());
}

#[test]
fn parse_tolerates_git_headers_and_commit_marker() {
    let diff = format!("diff --git a/src/calculator.js b/src/calculator.js\nindex 000..111 100644\n{}", DIVIDE_DIFF);
    assert!(parse(&diff).is_ok());
}

#[test]
fn parse_rejects_garbage() {
    assert!(parse("").is_err());
    assert!(parse("this is not a diff").is_err());
    assert!(parse("--- a/f\n+++ b/f\nno hunk header\n").is_err());
}

#[test]
fn parse_detects_dev_null_deletion() {
    let diff = "--- a/package.json\n+++ /dev/null\n@@ -1,2 +0,0 @@\n-{\n-}\n";
    let patches = parse(diff).unwrap();
    assert!(patches[0].dev_null);
    assert!(patches[0].is_pure_deletion());
    assert_eq!(patches[0].path, "package.json");
}

#[test]
fn parse_rejects_escaping_paths() {
    let up = "--- a/../outside\n+++ b/../outside\n@@ -1 +1 @@\n-x\n+y\n";
    assert!(parse(up).is_err());
    let abs = "--- /etc/passwd\n+++ /etc/passwd\n@@ -1 +1 @@\n-x\n+y\n";
    assert!(parse(abs).is_err());
}

#[test]
fn validate_rejects_protected_file_deletion_first() {
    // Protected deletion AND oversize: the protected rule wins (rule order)
    let mut lines = String::new();
    for i in 0..60 {
        lines.push_str(&format!("-line{}\n", i));
    }
    let diff = format!("--- a/package.json\n+++ b/package.json\n@@ -1,60 +0,0 @@\n{}", lines);
    let patches = parse(&diff).unwrap();
    assert!(matches!(
        validate(&patches, &policy()),
        Some(RejectReason::ProtectedFile { .. })
    ));
}

#[test]
fn validate_rejects_oversize_patch() {
    let mut adds = String::new();
    for i in 0..60 {
        adds.push_str(&format!("+line{}\n", i));
    }
    let diff = format!("--- a/src/big.js\n+++ b/src/big.js\n@@ -0,0 +1,60 @@\n{}", adds);
    let patches = parse(&diff).unwrap();
    match validate(&patches, &policy()) {
        Some(RejectReason::TooLarge { changed, limit }) => {
            assert_eq!(changed, 60);
            assert_eq!(limit, 50);
        }
        other => panic!("expected TooLarge, got {other:?}"),
    }
}

#[test]
fn validate_allows_protected_file_modification() {
    // Modification (adds + removes) of a protected file is not a deletion
    let diff = "--- a/package.json\n+++ b/package.json\n@@ -1,2 +1,2 @@\n-  \"version\": \"1.0.0\",\n+  \"version\": \"1.0.1\",\n another\n";
    let patches = parse(diff).unwrap();
    assert_eq!(validate(&patches, &policy()), None);
}

#[test]
fn stats_aggregate_across_files() {
    let diff = "--- a/one.js\n+++ b/one.js\n@@ -1 +1,2 @@\n context\n+added\n--- a/two.js\n+++ b/two.js\n@@ -1,2 +1 @@\n context\n-removed\n";
    let patches = parse(diff).unwrap();
    let stats = stats(&patches);
    assert_eq!(stats.added, 1);
    assert_eq!(stats.removed, 1);
    assert_eq!(stats.files_modified, 2);
    assert_eq!(stats.net_change, 0);
}

#[test]
fn apply_inserts_added_lines_positionally() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("src")).unwrap();
    std::fs::write(
        dir.path().join("src/calculator.js"),
        "class Calculator {\n  add(a, b) {\n    return a + b;\n  }\n  subtract(a, b) {\n    return a - b;\n  }\n}\n",
    )
    .unwrap();

    let diff = "--- a/src/calculator.js\n+++ b/src/calculator.js\n@@ -7,2 +7,9 @@\n   }\n+\n+  divide(a, b) {\n+    if (b === 0) {\n+      throw new Error('Division by zero');\n+    }\n+    return a / b;\n+  }\n }\n";
    let patches = parse(diff).unwrap();
    let applied = apply(dir.path(), &patches).unwrap();
    assert_eq!(applied, vec!["src/calculator.js".to_string()]);

    let content = std::fs::read_to_string(dir.path().join("src/calculator.js")).unwrap();
    assert!(content.contains("divide(a, b)"));
    assert!(content.contains("Division by zero"));
    assert!(content.contains("add(a, b)"));
    assert!(content.ends_with("}\n"));
}

#[test]
fn apply_creates_new_files() {
    let dir = tempdir().unwrap();
    let diff = "--- a/src/util.js\n+++ b/src/util.js\n@@ -0,0 +1,1 @@\n+export const x = 1;\n";
    let patches = parse(diff).unwrap();
    apply(dir.path(), &patches).unwrap();
    let content = std::fs::read_to_string(dir.path().join("src/util.js")).unwrap();
    assert_eq!(content, "export const x = 1;\n");
}

#[test]
fn apply_removes_lines() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("f.txt"), "one\ntwo\nthree\n").unwrap();
    let diff = "--- a/f.txt\n+++ b/f.txt\n@@ -1,3 +1,2 @@\n one\n-two\n three\n";
    let patches = parse(diff).unwrap();
    apply(dir.path(), &patches).unwrap();
    assert_eq!(
        std::fs::read_to_string(dir.path().join("f.txt")).unwrap(),
        "one\nthree\n"
    );
}

#[test]
fn apply_deletes_dev_null_targets() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("old.txt"), "bye\n").unwrap();
    let diff = "--- a/old.txt\n+++ /dev/null\n@@ -1 +0,0 @@\n-bye\n";
    let patches = parse(diff).unwrap();
    apply(dir.path(), &patches).unwrap();
    assert!(!dir.path().join("old.txt").exists());
}

#[test]
fn apply_leaves_no_temp_files() {
    let dir = tempdir().unwrap();
    let diff = "--- a/f.txt\n+++ b/f.txt\n@@ -0,0 +1 @@\n+hello\n";
    let patches = parse(diff).unwrap();
    apply(dir.path(), &patches).unwrap();
    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["f.txt".to_string()]);
}
