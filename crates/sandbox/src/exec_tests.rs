// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

fn limits(wall_secs: u64) -> ExecLimits {
    ExecLimits {
        wall: Duration::from_secs(wall_secs),
        memory_mb: 512,
        cpu_percent: 80,
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn captures_stdout_and_exit_code() {
    let dir = tempdir().unwrap();
    let result = run(&argv(&["echo", "hello"]), dir.path(), &limits(5))
        .await
        .unwrap();
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout.trim(), "hello");
    assert!(!result.killed);
    assert!(result.success());
}

#[tokio::test]
async fn nonzero_exit_is_reported_not_raised() {
    let dir = tempdir().unwrap();
    let result = run(&argv(&["false"]), dir.path(), &limits(5)).await.unwrap();
    assert_eq!(result.exit_code, 1);
    assert!(!result.success());
}

#[tokio::test]
async fn wall_clock_breach_kills_and_reports() {
    let dir = tempdir().unwrap();
    let started = Instant::now();
    let result = run(&argv(&["sleep", "30"]), dir.path(), &limits(1))
        .await
        .unwrap();
    assert!(result.killed);
    assert_eq!(result.exit_code, -1);
    assert!(result.stderr.contains("wall-clock"));
    // Killed at the ceiling, not after the sleep finished
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn missing_program_is_a_spawn_error() {
    let dir = tempdir().unwrap();
    let err = run(&argv(&["definitely-not-a-real-binary"]), dir.path(), &limits(1)).await;
    assert!(matches!(err, Err(ExecError::Spawn { .. })));
}

#[tokio::test]
async fn environment_is_stripped() {
    let dir = tempdir().unwrap();
    // printenv exits 1 when the variable is unset
    std::env::set_var("MEND_SECRET_PROBE", "leak");
    let result = run(&argv(&["printenv", "MEND_SECRET_PROBE"]), dir.path(), &limits(5))
        .await
        .unwrap();
    std::env::remove_var("MEND_SECRET_PROBE");
    assert_ne!(result.exit_code, 0);
    assert!(result.stdout.trim().is_empty());
}

#[test]
fn limits_come_from_config() {
    let limits = ExecLimits::from_config(&mend_core::EngineConfig::default());
    assert_eq!(limits.wall, Duration::from_secs(30));
    assert_eq!(limits.memory_mb, 512);
    assert_eq!(limits.cpu_percent, 80);
}
