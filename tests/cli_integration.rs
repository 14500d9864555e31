// CLI integration tests for find, probe, and search-path flows.
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use serde_json::Value;

const TEST_VAR: &str = "MATRYOSHKA_CLI_TEST_DIRS";

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_matryoshka");
    let mut command = Command::new(exe);
    command
        .env_remove("MATRYOSHKA_SEARCH_VAR")
        .env_remove("MATRYOSHKA_LIBRARY")
        .env_remove("RUST_LOG")
        .env_remove(TEST_VAR);
    command
}

fn search_value(dirs: &[&Path]) -> OsString {
    std::env::join_paths(dirs).expect("join")
}

fn parse_json(output: &[u8]) -> Value {
    let text = std::str::from_utf8(output).expect("utf8");
    serde_json::from_str(text.trim()).expect("valid json")
}

fn touch(path: &Path) {
    std::fs::write(path, b"placeholder").expect("write");
}

#[test]
fn find_returns_match_from_second_directory() {
    let a = tempfile::tempdir().expect("tempdir");
    let b = tempfile::tempdir().expect("tempdir");
    touch(&b.path().join("libmatryoshka.so"));

    let output = cmd()
        .env(TEST_VAR, search_value(&[a.path(), b.path()]))
        .args(["find", "libmatryoshka.so", "--var", TEST_VAR])
        .output()
        .expect("find");
    assert!(output.status.success());
    let json = parse_json(&output.stdout);
    assert_eq!(json["name"], "libmatryoshka.so");
    assert_eq!(
        json["path"].as_str().unwrap(),
        b.path().join("libmatryoshka.so").display().to_string()
    );
}

#[test]
fn find_prefers_first_directory_and_all_lists_both() {
    let a = tempfile::tempdir().expect("tempdir");
    let b = tempfile::tempdir().expect("tempdir");
    touch(&a.path().join("Matryoshka.dll"));
    touch(&b.path().join("Matryoshka.dll"));
    let value = search_value(&[a.path(), b.path()]);

    let first = cmd()
        .env(TEST_VAR, &value)
        .args(["find", "--var", TEST_VAR])
        .output()
        .expect("find");
    assert!(first.status.success());
    let json = parse_json(&first.stdout);
    assert_eq!(json["name"], "Matryoshka.dll");
    assert_eq!(
        json["path"].as_str().unwrap(),
        a.path().join("Matryoshka.dll").display().to_string()
    );

    let all = cmd()
        .env(TEST_VAR, &value)
        .args(["find", "--all", "--var", TEST_VAR])
        .output()
        .expect("find --all");
    assert!(all.status.success());
    let json = parse_json(&all.stdout);
    let paths = json["paths"].as_array().expect("paths");
    assert_eq!(paths.len(), 2);
    assert_eq!(
        paths[0].as_str().unwrap(),
        a.path().join("Matryoshka.dll").display().to_string()
    );
    assert_eq!(
        paths[1].as_str().unwrap(),
        b.path().join("Matryoshka.dll").display().to_string()
    );
}

#[test]
fn find_with_explicit_dirs_ignores_environment() {
    let env_dir = tempfile::tempdir().expect("tempdir");
    let explicit = tempfile::tempdir().expect("tempdir");
    touch(&env_dir.path().join("libmatryoshka.so"));
    touch(&explicit.path().join("libmatryoshka.so"));

    let output = cmd()
        .env(TEST_VAR, search_value(&[env_dir.path()]))
        .args(["find", "libmatryoshka.so", "--var", TEST_VAR, "--dir"])
        .arg(explicit.path())
        .output()
        .expect("find --dir");
    assert!(output.status.success());
    let json = parse_json(&output.stdout);
    assert_eq!(
        json["path"].as_str().unwrap(),
        explicit.path().join("libmatryoshka.so").display().to_string()
    );
}

#[test]
fn find_missing_exits_not_found_with_json_error() {
    let a = tempfile::tempdir().expect("tempdir");

    let output = cmd()
        .env(TEST_VAR, search_value(&[a.path()]))
        .args(["find", "libmatryoshka.so", "--var", TEST_VAR])
        .output()
        .expect("find");
    assert_eq!(output.status.code().unwrap(), 3);
    assert!(output.stdout.is_empty());
    let err = parse_json(&output.stderr);
    assert_eq!(err["error"]["kind"], "NotFound");
    assert!(err["error"]["hint"].as_str().unwrap().contains(TEST_VAR));
}

#[test]
fn find_with_unset_variable_is_not_found() {
    let output = cmd()
        .args(["find", "--var", TEST_VAR])
        .output()
        .expect("find");
    assert_eq!(output.status.code().unwrap(), 3);
}

#[test]
fn library_name_override_changes_default() {
    let a = tempfile::tempdir().expect("tempdir");
    touch(&a.path().join("libcustom.so"));

    let output = cmd()
        .env(TEST_VAR, search_value(&[a.path()]))
        .env("MATRYOSHKA_SEARCH_VAR", TEST_VAR)
        .env("MATRYOSHKA_LIBRARY", "libcustom.so")
        .arg("find")
        .output()
        .expect("find");
    assert!(output.status.success());
    let json = parse_json(&output.stdout);
    assert_eq!(json["name"], "libcustom.so");
}

#[test]
fn probe_missing_explicit_path_reports_unusable() {
    let temp = tempfile::tempdir().expect("tempdir");
    let target = temp.path().join("libmatryoshka.so");

    let output = cmd()
        .arg("probe")
        .arg(&target)
        .output()
        .expect("probe");
    assert_eq!(output.status.code().unwrap(), 9);
    let json = parse_json(&output.stdout);
    assert_eq!(json["usable"], false);
    assert_eq!(json["path"].as_str().unwrap(), target.display().to_string());
    assert_eq!(json["error"]["kind"], "Unavailable");
}

#[test]
fn probe_located_non_library_reports_unusable() {
    let a = tempfile::tempdir().expect("tempdir");
    touch(&a.path().join("Matryoshka.dll"));

    let output = cmd()
        .env(TEST_VAR, search_value(&[a.path()]))
        .args(["probe", "--var", TEST_VAR])
        .output()
        .expect("probe");
    assert_eq!(output.status.code().unwrap(), 9);
    let json = parse_json(&output.stdout);
    assert_eq!(json["usable"], false);
    assert_eq!(
        json["path"].as_str().unwrap(),
        a.path().join("Matryoshka.dll").display().to_string()
    );
}

#[test]
fn probe_unlocatable_name_is_not_found() {
    let output = cmd()
        .args(["probe", "libmatryoshka.so", "--var", TEST_VAR])
        .output()
        .expect("probe");
    assert_eq!(output.status.code().unwrap(), 3);
    let err = parse_json(&output.stderr);
    assert_eq!(err["error"]["kind"], "NotFound");
}

#[test]
fn search_path_lists_directories_in_order() {
    let a = tempfile::tempdir().expect("tempdir");
    let b = tempfile::tempdir().expect("tempdir");

    let output = cmd()
        .env(TEST_VAR, search_value(&[a.path(), b.path()]))
        .args(["search-path", "--var", TEST_VAR])
        .output()
        .expect("search-path");
    assert!(output.status.success());
    let json = parse_json(&output.stdout);
    assert_eq!(json["var"], TEST_VAR);
    let dirs = json["dirs"].as_array().expect("dirs");
    assert_eq!(dirs.len(), 2);
    assert_eq!(dirs[0].as_str().unwrap(), a.path().display().to_string());
    assert_eq!(dirs[1].as_str().unwrap(), b.path().display().to_string());
}

#[test]
fn usage_error_exit_code() {
    let output = cmd().args(["find", "--bogus"]).output().expect("run");
    assert_eq!(output.status.code().unwrap(), 2);
    let err = parse_json(&output.stderr);
    assert_eq!(err["error"]["kind"], "Usage");
}

#[test]
fn version_emits_json_when_piped() {
    let output = cmd().arg("version").output().expect("version");
    assert!(output.status.success());
    let json = parse_json(&output.stdout);
    assert_eq!(json["name"], "matryoshka");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}
