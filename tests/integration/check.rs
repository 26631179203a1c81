//! Integration tests for the `abaplens check` and `abaplens init` commands

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper function to get the path to the abaplens binary
fn abaplens_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_abaplens"))
}

/// Helper function to create a test file
fn create_test_file(
    dir: &TempDir,
    name: &str,
    content: &str,
) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Run `abaplens check` with the temp dir as project directory
fn check(
    project: &Path,
    args: &[&str],
) -> Output {
    Command::new(abaplens_bin())
        .arg("check")
        .arg("--project")
        .arg(project)
        .arg("--color")
        .arg("never")
        .args(args)
        .output()
        .expect("Failed to execute abaplens")
}

#[test]
fn test_check_valid_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = create_test_file(
        &temp_dir,
        "zvalid.prog.abap",
        "REPORT zvalid.\nDATA lv_count TYPE i.\nlv_count = lv_count + 1.\n",
    );

    let output = check(temp_dir.path(), &[file.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("All checks passed (1 file)"), "stdout: {}", stdout);
}

#[test]
fn test_check_reports_errors() {
    let temp_dir = TempDir::new().unwrap();
    let file = create_test_file(&temp_dir, "zbad.prog.abap", "lv_missing = 1.\n");

    let output = check(temp_dir.path(), &[file.to_str().unwrap()]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("\"lv_missing\" not found"), "stderr: {}", stderr);
}

#[test]
fn test_check_json_output() {
    let temp_dir = TempDir::new().unwrap();
    let file = create_test_file(&temp_dir, "zjson.prog.abap", "DATA lv_a TYPE i.\nlv_a = lv_b.\n");

    let output = check(temp_dir.path(), &["--json", file.to_str().unwrap()]);
    assert!(!output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let files = json.as_array().unwrap();
    assert_eq!(files.len(), 1);
    let diagnostics = files[0]["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["message"], "\"lv_b\" not found");
    assert_eq!(diagnostics[0]["severity"], 1);
    assert_eq!(diagnostics[0]["range"]["start"]["line"], 1);
}

#[test]
fn test_check_directory_across_files() {
    let temp_dir = TempDir::new().unwrap();
    create_test_file(
        &temp_dir,
        "zif_shape.intf.abap",
        "INTERFACE zif_shape PUBLIC.\n  METHODS area RETURNING VALUE(rv_area) TYPE i.\nENDINTERFACE.\n",
    );
    create_test_file(
        &temp_dir,
        "zshapes.prog.abap",
        "REPORT zshapes.\nDATA lo_shape TYPE REF TO zif_shape.\nDATA lv_area TYPE i.\nlv_area = lo_shape->area( ).\n",
    );
    create_test_file(&temp_dir, "notes.txt", "not abap");

    let output = check(temp_dir.path(), &[temp_dir.path().to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("All checks passed (2 files)"), "stdout: {}", stdout);
}

#[test]
fn test_check_project_config_namespace() {
    let temp_dir = TempDir::new().unwrap();
    let file = create_test_file(
        &temp_dir,
        "zns.prog.abap",
        "DATA lo_obj TYPE REF TO zcl_not_in_repo.\n",
    );

    let output = check(temp_dir.path(), &[file.to_str().unwrap()]);
    assert!(!output.status.success());

    fs::write(
        temp_dir.path().join("abaplens.json"),
        r#"{ "syntax": { "error_namespace": "^ZZ" } }"#,
    )
    .unwrap();
    let output = check(temp_dir.path(), &[file.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn test_check_nonexistent_path() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.abap");

    let output = check(temp_dir.path(), &[missing.to_str().unwrap()]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("Path does not exist"), "stderr: {}", stderr);
}

#[test]
fn test_init_writes_config_once() {
    let temp_dir = TempDir::new().unwrap();

    let output = Command::new(abaplens_bin())
        .arg("init")
        .arg(temp_dir.path())
        .output()
        .expect("Failed to execute abaplens");
    assert!(output.status.success());

    let written = fs::read_to_string(temp_dir.path().join("abaplens.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(json["syntax"]["error_namespace"], "^(Z|Y|LCL_|TY_|LIF_)");
    assert_eq!(json["files"]["extensions"][0], "abap");

    let again = Command::new(abaplens_bin())
        .arg("init")
        .arg(temp_dir.path())
        .output()
        .expect("Failed to execute abaplens");
    assert!(!again.status.success());
}
