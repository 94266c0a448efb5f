//! Integration tests for the Strata CLI
//!
//! These tests run the actual binary for the non-interactive commands.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get the binary to test
fn strata_cmd() -> Command {
    let mut cmd = Command::cargo_bin("strata").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("STRATA_THEME");
    cmd
}

#[test]
fn test_help_flag() {
    strata_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("layered terminal dashboard"))
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("layout"));
}

#[test]
fn test_layout_default_terminal() {
    strata_cmd()
        .args(["layout", "--width", "80", "--height", "24"])
        .assert()
        .success()
        .stdout(predicate::str::contains("content:"))
        .stdout(predicate::str::contains("76x20"))
        .stdout(predicate::str::contains("(2, 2)"));
}

#[test]
fn test_layout_with_shadow_and_tall_header() {
    // 80 - 2*2 - 2 shadow, 24 - (2+1) - 2 - 1 shadow
    strata_cmd()
        .args(["layout", "--width", "80", "--height", "24", "--shadow", "--header", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("74x18"));
}

#[test]
fn test_layout_floors_on_tiny_terminal() {
    let output = strata_cmd()
        .args(["layout", "--width", "4", "--height", "3"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("content: 0x"), "{stdout}");
}

#[test]
fn test_themes_lists_builtins() {
    strata_cmd()
        .arg("themes")
        .assert()
        .success()
        .stdout(predicate::str::contains("classic"))
        .stdout(predicate::str::contains("midnight"));
}

#[test]
fn test_render_emits_sgr_and_reset() {
    strata_cmd()
        .args(["render", "{{[red::B]}}alert{{[-]}} done"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alert"))
        .stdout(predicate::str::contains("\x1b["))
        .stdout(predicate::str::contains(" done"));
}

#[test]
fn test_render_unknown_theme_fails_with_fix() {
    strata_cmd()
        .args(["render", "x", "--theme", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("STRATA-021"))
        .stderr(predicate::str::contains("strata themes"));
}

#[test]
fn test_render_with_theme_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("mono.yaml");
    fs::write(
        &path,
        "name: mono\ndescription: test theme\nentries:\n  warn: \"yellow::B\"\n",
    )
    .unwrap();

    strata_cmd()
        .args(["render", "{{|warn|}}careful", "--theme"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("careful"));
}

#[test]
fn test_run_rejects_malformed_config() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.yaml");
    fs::write(&path, "ui: [not, a, map").unwrap();

    strata_cmd()
        .args(["run", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("STRATA-020"));
}
