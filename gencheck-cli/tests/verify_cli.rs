//! End-to-end runs of the `gencheck` binary against a scratch working directory.
#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn gencheck(root: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("gencheck"));
    cmd.current_dir(root).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn tmp_files(root: &Path) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(root)
        .expect("read_dir")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".tmp"))
        .collect();
    names.sort();
    names
}

#[test]
fn matching_output_exits_zero_and_is_repeatable() {
    let root = TempDir::new().expect("root");
    fs::write(root.path().join("schema.ts"), "export type A = 1;\n").expect("write");

    for _ in 0..2 {
        gencheck(root.path())
            .args(["-p", "schema.ts", "--", "sh", "-c"])
            .arg("printf 'export type A = 1;\\n' > schema.ts")
            .assert()
            .success()
            .stdout(contains("[copy] schema.ts -> schema.ts.tmp"))
            .stdout(contains("[emit] sh -c"))
            .stdout(contains("[diff] schema.ts.tmp schema.ts"))
            .stdout(contains("[move] schema.ts.tmp -> schema.ts"))
            .stdout(contains("no drift"));
    }

    assert_eq!(
        fs::read_to_string(root.path().join("schema.ts")).unwrap(),
        "export type A = 1;\n"
    );
    assert!(tmp_files(root.path()).is_empty());
}

#[test]
fn drift_exits_one_prints_diff_and_restores() {
    let root = TempDir::new().expect("root");
    fs::write(root.path().join("schema.ts"), "A\n").expect("write");

    let assert = gencheck(root.path())
        .args(["-p", "schema.ts", "--", "sh", "-c", "printf 'B\\n' > schema.ts"])
        .assert()
        .code(1)
        .stdout(contains("--- schema.ts.tmp"))
        .stdout(contains("+++ schema.ts"));
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");

    assert!(stdout.lines().any(|l| l == "-A"), "missing removed line:\n{stdout}");
    assert!(stdout.lines().any(|l| l == "+B"), "missing added line:\n{stdout}");
    assert!(stdout.contains("1 drifted"));

    assert_eq!(fs::read_to_string(root.path().join("schema.ts")).unwrap(), "A\n");
    assert!(tmp_files(root.path()).is_empty());
}

#[test]
fn only_changed_files_are_diffed() {
    let root = TempDir::new().expect("root");
    fs::create_dir_all(root.path().join("locales")).expect("mkdir");
    fs::write(root.path().join("locales/en.json"), "{\"hi\":\"hi\"}\n").expect("write");
    fs::write(root.path().join("locales/fr.json"), "{\"hi\":\"salut\"}\n").expect("write");

    let assert = gencheck(root.path())
        .args(["-p", "locales/*.json", "--", "sh", "-c"])
        .arg("printf '{\"hi\":\"bonjour\"}\\n' > locales/fr.json")
        .assert()
        .code(1);
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");

    assert!(stdout.contains("+++ locales/fr.json"));
    assert!(!stdout.contains("+++ locales/en.json"));
    assert!(stdout.contains("2 file(s) checked, 1 drifted"));
    assert_eq!(
        fs::read_to_string(root.path().join("locales/fr.json")).unwrap(),
        "{\"hi\":\"salut\"}\n"
    );
}

#[test]
fn failing_command_is_fatal_but_restores() {
    let root = TempDir::new().expect("root");
    fs::write(root.path().join("schema.ts"), "A").expect("write");

    gencheck(root.path())
        .args(["-p", "schema.ts", "--", "sh", "-c", "printf junk > schema.ts; exit 4"])
        .assert()
        .code(3)
        .stderr(contains("[error]"))
        .stderr(contains("failed"))
        .stderr(contains("no files were modified").not());

    assert_eq!(fs::read_to_string(root.path().join("schema.ts")).unwrap(), "A");
    assert!(tmp_files(root.path()).is_empty());
}

#[test]
fn stale_temp_file_blocks_the_run() {
    let root = TempDir::new().expect("root");
    fs::write(root.path().join("schema.ts"), "A").expect("write");
    fs::write(root.path().join("schema.ts.tmp"), "leftover").expect("write");

    gencheck(root.path())
        .args(["-p", "schema.ts", "--", "touch", "ran"])
        .assert()
        .code(3)
        .stdout(contains("[copy]").not())
        .stderr(contains("stale temp file"))
        .stderr(contains("no files were modified"));

    assert!(!root.path().join("ran").exists(), "command must not run");
    assert_eq!(
        fs::read_to_string(root.path().join("schema.ts.tmp")).unwrap(),
        "leftover"
    );
}

#[test]
fn no_matching_files_is_fatal() {
    let root = TempDir::new().expect("root");

    gencheck(root.path())
        .args(["-p", "gen/*.ts", "--", "touch", "ran"])
        .assert()
        .code(3)
        .stderr(contains("no files matched"));

    assert!(!root.path().join("ran").exists());
    assert!(tmp_files(root.path()).is_empty());
}

#[test]
fn working_directory_is_not_a_target() {
    let root = TempDir::new().expect("root");

    gencheck(root.path())
        .args(["-p", ".", "--", "true"])
        .assert()
        .code(3)
        .stderr(contains("is the working directory"));
}

#[test]
fn path_outside_working_directory_is_rejected() {
    let outer = TempDir::new().expect("outer");
    let root = outer.path().join("repo");
    fs::create_dir_all(&root).expect("mkdir");
    fs::write(outer.path().join("other.ts"), "A").expect("write");

    gencheck(&root)
        .args(["-p", "../other.ts", "--", "true"])
        .assert()
        .code(3)
        .stderr(contains("outside the working directory"));

    assert!(!outer.path().join("other.ts.tmp").exists());
}

#[test]
fn missing_command_is_a_usage_error() {
    let root = TempDir::new().expect("root");
    fs::write(root.path().join("schema.ts"), "A").expect("write");

    gencheck(root.path())
        .args(["-p", "schema.ts"])
        .assert()
        .code(2)
        .stderr(contains("Usage:"));

    assert!(tmp_files(root.path()).is_empty());
}

#[test]
fn config_file_supplies_paths_and_command() {
    let root = TempDir::new().expect("root");
    fs::write(root.path().join("schema.ts"), "A\n").expect("write");
    fs::write(
        root.path().join("gencheck.yaml"),
        "paths: [schema.ts]\ncommand: [sh, -c, \"printf 'B\\\\n' > schema.ts\"]\ncontext: 0\n",
    )
    .expect("write config");

    gencheck(root.path())
        .assert()
        .code(1)
        .stdout(contains("+B"));

    assert_eq!(fs::read_to_string(root.path().join("schema.ts")).unwrap(), "A\n");
}

#[test]
fn command_line_overrides_config_command() {
    let root = TempDir::new().expect("root");
    fs::write(root.path().join("schema.ts"), "A").expect("write");
    fs::write(
        root.path().join("gencheck.yaml"),
        "paths: [schema.ts]\ncommand: [\"false\"]\n",
    )
    .expect("write config");

    gencheck(root.path())
        .args(["--", "true"])
        .assert()
        .success()
        .stdout(contains("[emit] true"));
}

#[test]
fn explicit_missing_config_is_fatal() {
    let root = TempDir::new().expect("root");

    gencheck(root.path())
        .args(["--config", "nope.yaml", "-p", "x", "--", "true"])
        .assert()
        .code(3)
        .stderr(contains("config file not found"));
}
