//! CLI integration tests for mdsuite
//!
//! These tests build small documentation trees on disk and check the
//! artifacts the binary writes for them.

use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a command instance for the mdsuite binary
fn mdsuite_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("mdsuite"));
    cmd.env_remove("MDSUITE_MODULE");
    cmd
}

fn write_doc(root: &Path, rel: &str, content: &str) {
    let dir = root.join(rel);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("README.md"), content).unwrap();
}

/// A `docs/` tree: root with children `a` and `b`, and a `spire` fixture that `a` requires
fn setup_docs() -> (TempDir, PathBuf, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let docs = tmp.path().join("docs");
    let out = tmp.path().join("out");

    write_doc(
        &docs,
        "",
        "# Root\n\n## Run\n\n```bash\necho root\n```\n\n## Cleanup\n\n```bash\necho root-cleanup\n```\n",
    );
    write_doc(
        &docs,
        "spire",
        "# Spire\n\n## Run\n\n```bash\necho spire\n```\n\n## Cleanup\n\n```bash\necho spire-down\n```\n",
    );
    write_doc(
        &docs,
        "a",
        "# A\n\n## Requires\n\n- [Spire](../spire)\n\n## Test Ping\n\n```bash\necho ping\n```\n\n## Test Pong\n\n```bash\necho pong\n```\n",
    );
    write_doc(&docs, "b", "# B\n\n## Test Other\n\n```bash\necho other\n```\n");

    (tmp, docs, out)
}

// =============================================================================
// Compiled Suites
// =============================================================================

#[test]
fn test_generates_compiled_suites() {
    let (_tmp, docs, out) = setup_docs();

    mdsuite_cmd()
        .arg(&docs)
        .arg(&out)
        .args(["--module", "example.com/e2e"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 4 suite(s)"));

    let root = fs::read_to_string(out.join("suite.gen.go")).unwrap();
    assert!(root.starts_with("// Code generated by mdsuite DO NOT EDIT."));
    assert!(root.contains("package docs"));
    assert!(root.contains("func (s *Suite) RunIncludedSuites() {"));
    assert!(root.contains("\"example.com/e2e/a\""));
    assert!(root.contains("r.Run(`echo root`)"));

    let a = fs::read_to_string(out.join("a/suite.gen.go")).unwrap();
    assert!(a.contains("package a"));
    assert!(a.contains("func (s *Suite) TestPing() {"));
    assert!(a.contains("func (s *Suite) TestPong() {"));
    assert!(a.contains("suite.Run(s.T(), &s.spireSuite)"));
}

#[test]
fn test_compiled_requires_module() {
    let (_tmp, docs, out) = setup_docs();

    mdsuite_cmd()
        .arg(&docs)
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("module path is required"));

    assert!(!out.exists());
}

#[test]
fn test_module_from_project_config() {
    let (_tmp, docs, _out) = setup_docs();
    fs::write(
        docs.join("mdsuite.toml"),
        "module = \"example.com/e2e\"\noutput_dir = \"gen\"\n",
    )
    .unwrap();

    mdsuite_cmd().arg(&docs).assert().success();

    assert!(docs.join("gen/suite.gen.go").is_file());
    assert!(docs.join("gen/b/suite.gen.go").is_file());
}

#[test]
fn test_rerun_is_idempotent() {
    let (_tmp, docs, out) = setup_docs();

    mdsuite_cmd()
        .arg(&docs)
        .arg(&out)
        .args(["--module", "m"])
        .assert()
        .success();
    let first = fs::read_to_string(out.join("a/suite.gen.go")).unwrap();

    mdsuite_cmd()
        .arg(&docs)
        .arg(&out)
        .args(["--module", "m"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 unchanged"));
    assert_eq!(fs::read_to_string(out.join("a/suite.gen.go")).unwrap(), first);
}

// =============================================================================
// Scripts
// =============================================================================

#[test]
fn test_script_inlines_ancestors_and_fixtures() {
    let (_tmp, docs, out) = setup_docs();

    mdsuite_cmd()
        .arg(&docs)
        .arg(&out)
        .arg("--script")
        .assert()
        .success();

    let script = fs::read_to_string(out.join("a/suite.gen.sh")).unwrap();
    assert!(script.starts_with("#!/usr/bin/env bash\n"));

    let root = script.find("echo root\n").unwrap();
    let spire = script.find("echo spire\n").unwrap();
    let ping = script.find("echo ping").unwrap();
    assert!(root < spire && spire < ping);

    let down = script.find("echo spire-down").unwrap();
    let root_cleanup = script.find("echo root-cleanup").unwrap();
    assert!(down < root_cleanup);
    assert!(script.ends_with("setup\ntestPing\ntestPong\ncleanup\n"));
}

#[test]
fn test_script_match_selects_tests() {
    let (_tmp, docs, out) = setup_docs();

    mdsuite_cmd()
        .arg(&docs)
        .arg(&out)
        .args(["--script", "--match", "Ping"])
        .assert()
        .success();

    let script = fs::read_to_string(out.join("a/suite.gen.sh")).unwrap();
    assert!(script.contains("function testPing()"));
    assert!(!script.contains("testPong"));
    assert!(!out.join("b/suite.gen.sh").exists());
    assert!(!out.join("suite.gen.sh").exists());
}

#[test]
fn test_script_match_suite_name_keeps_all_tests() {
    let (_tmp, docs, out) = setup_docs();

    mdsuite_cmd()
        .arg(&docs)
        .arg(&out)
        .args(["--script", "--match", "^a$"])
        .assert()
        .success();

    let script = fs::read_to_string(out.join("a/suite.gen.sh")).unwrap();
    assert!(script.contains("function testPing()"));
    assert!(script.contains("function testPong()"));
}

#[test]
fn test_script_no_matches_writes_nothing() {
    let (_tmp, docs, out) = setup_docs();

    mdsuite_cmd()
        .arg(&docs)
        .arg(&out)
        .args(["--script", "--match", "Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matches found for pattern: Nope"));

    assert!(!out.exists());
}

#[test]
fn test_match_without_script_is_rejected() {
    let (_tmp, docs, out) = setup_docs();

    mdsuite_cmd()
        .arg(&docs)
        .arg(&out)
        .args(["--module", "m", "--match", "Ping"])
        .assert()
        .failure();

    assert!(!out.exists());
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_include_cycle_fails() {
    let tmp = TempDir::new().unwrap();
    let docs = tmp.path().join("docs");
    write_doc(&docs, "a", "# A\n\n## Includes\n\n- [B](../b)\n");
    write_doc(&docs, "b", "# B\n\n## Includes\n\n- [A](../a)\n");

    mdsuite_cmd()
        .arg(&docs)
        .arg("--script")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot build examples"));
}

#[test]
fn test_missing_dependency_fails() {
    let tmp = TempDir::new().unwrap();
    let docs = tmp.path().join("docs");
    write_doc(&docs, "a", "# A\n\n## Requires\n\n- [Gone](../gone)\n");

    mdsuite_cmd()
        .arg(&docs)
        .arg("--script")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot build examples"));
}

#[test]
fn test_directory_shadowing_runtime_package_fails() {
    let tmp = TempDir::new().unwrap();
    let docs = tmp.path().join("docs");
    let out = tmp.path().join("out");
    write_doc(&docs, "", "# Root\n");
    write_doc(&docs, "base", "# Base\n\n## Test Ping\n\n```bash\necho ping\n```\n");

    mdsuite_cmd()
        .arg(&docs)
        .arg(&out)
        .args(["--module", "example.com/e2e"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("runtime package example.com/e2e/base"));

    assert!(!out.exists());
}

#[test]
fn test_fixture_with_its_own_fixture_sets_both_up() {
    let tmp = TempDir::new().unwrap();
    let docs = tmp.path().join("docs");
    let out = tmp.path().join("out");
    write_doc(&docs, "k8s", "# K8s\n\n## Run\n\n```bash\necho k8s-up\n```\n");
    write_doc(
        &docs,
        "spire",
        "# Spire\n\n## Requires\n\n- [K8s](../k8s)\n\n## Run\n\n```bash\necho spire-up\n```\n",
    );
    write_doc(
        &docs,
        "app",
        "# App\n\n## Requires\n\n- [Spire](../spire)\n\n## Test Ping\n\n```bash\necho ping\n```\n",
    );

    mdsuite_cmd()
        .arg(&docs)
        .arg(&out)
        .arg("--script")
        .assert()
        .success();

    let script = fs::read_to_string(out.join("app/suite.gen.sh")).unwrap();
    let k8s = script.find("echo k8s-up").unwrap();
    let spire = script.find("echo spire-up").unwrap();
    assert!(k8s < spire);
    assert_eq!(script.matches("echo k8s-up").count(), 1);
}

// =============================================================================
// Output
// =============================================================================

#[test]
fn test_json_format() {
    let (_tmp, docs, out) = setup_docs();

    let assert = mdsuite_cmd()
        .arg(&docs)
        .arg(&out)
        .args(["--script", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();

    assert_eq!(json["format"], "script");
    let artifacts = json["artifacts"].as_array().unwrap();
    assert_eq!(artifacts.len(), 4);
    assert!(artifacts.iter().all(|a| a["status"] == "written"));
}

#[test]
fn test_verbose_flag() {
    let (_tmp, docs, out) = setup_docs();

    mdsuite_cmd()
        .arg(&docs)
        .arg(&out)
        .args(["--script", "--verbose"])
        .assert()
        .success()
        .stderr(predicate::str::contains("[verbose:walk]"));
}

#[test]
fn test_empty_tree() {
    let tmp = TempDir::new().unwrap();

    mdsuite_cmd()
        .arg(tmp.path())
        .arg("--script")
        .assert()
        .success()
        .stdout(predicate::str::contains("No examples found."));
}
