//! Integration tests for the sql-dialect-converter binary.

use std::{fs, io::Write};

use assert_cmd::{Command, cargo::cargo_bin_cmd};
use predicates::prelude::*;
use tempfile::{NamedTempFile, tempdir};

fn cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("sql-dialect-converter");
    cmd.env("HOME", "/nonexistent-home")
        .env_remove("SQL_CONVERTER_SOURCE")
        .env_remove("SQL_CONVERTER_TARGET")
        .env_remove("SQL_CONVERTER_WORKERS")
        .env_remove("SQL_CONVERTER_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

fn script(sql: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", sql).unwrap();
    file
}

#[test]
fn test_convert_with_warning_exits_one() {
    let input = script("SEL a, b FROM t;");

    cmd()
        .args([
            "convert",
            input.path().to_str().unwrap(),
            "--from",
            "teradata",
            "--to",
            "db2",
            "--no-color"
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("SELECT a, b FROM t;"))
        .stdout(predicate::str::contains("(sel-abbrev)"));
}

#[test]
fn test_convert_clean_script_succeeds() {
    let input = script("SELECT id FROM users WHERE id = 1;");

    cmd()
        .args(["convert", input.path().to_str().unwrap(), "--to", "postgresql", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"));
}

#[test]
fn test_convert_error_exits_two() {
    let input = script("SELECT a FROM t QUALIFY RANK() OVER (ORDER BY a) <= 3;");

    cmd()
        .args(["convert", input.path().to_str().unwrap(), "--from", "teradata", "--no-color"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("[ERROR]"));
}

#[test]
fn test_convert_detects_source_dialect() {
    let input = script("SEL a FROM t;");

    cmd()
        .args(["convert", input.path().to_str().unwrap(), "--to", "db2", "-f", "json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"targetText\": \"SELECT a FROM t;\""));
}

#[test]
fn test_convert_from_stdin() {
    cmd()
        .args(["convert", "-", "--from", "teradata", "--to", "mysql", "-f", "yaml"])
        .write_stdin("SELECT DATE '2024-01-01';")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("stdin"))
        .stdout(predicate::str::contains("DATE("));
}

#[test]
fn test_convert_writes_output_file() {
    let input = script("DEL FROM t;");
    let dir = tempdir().unwrap();
    let out = dir.path().join("converted.sql");

    cmd()
        .args([
            "convert",
            input.path().to_str().unwrap(),
            "--from",
            "teradata",
            "--to",
            "db2",
            "-o",
            out.to_str().unwrap(),
            "--no-color"
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("DELETE FROM t;").not());

    assert_eq!(fs::read_to_string(out).unwrap(), "DELETE FROM t;");
}

#[test]
fn test_convert_batch_into_directory() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.sql");
    let second = dir.path().join("second.sql");
    fs::write(&first, "SEL a FROM t;").unwrap();
    fs::write(&second, "SELECT b FROM u;").unwrap();
    let out = dir.path().join("out");

    cmd()
        .args([
            "convert",
            first.to_str().unwrap(),
            second.to_str().unwrap(),
            "--from",
            "teradata",
            "--to",
            "db2",
            "--workers",
            "2",
            "-o",
            out.to_str().unwrap(),
            "--no-color"
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Summary: 2 script(s)"));

    assert_eq!(
        fs::read_to_string(out.join("first.db2.sql")).unwrap(),
        "SELECT a FROM t;"
    );
    assert_eq!(
        fs::read_to_string(out.join("second.db2.sql")).unwrap(),
        "SELECT b FROM u;"
    );
}

#[test]
fn test_convert_validate_flag() {
    let input = script("SELECT a FROM t WHERE (b = 1;");

    cmd()
        .args([
            "convert",
            input.path().to_str().unwrap(),
            "--from",
            "other",
            "--to",
            "postgresql",
            "--validate",
            "--no-color"
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Validation: converted SQL does not parse"));
}

#[test]
fn test_convert_file_not_found() {
    cmd()
        .args(["convert", "/nonexistent/script.sql", "--to", "db2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_convert_zero_workers_rejected() {
    let input = script("SELECT 1;");

    cmd()
        .args(["convert", input.path().to_str().unwrap(), "--workers", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_invalid_env_target_fails_fast() {
    let input = script("SELECT 1;");

    cmd()
        .env("SQL_CONVERTER_TARGET", "sybase")
        .args(["convert", input.path().to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn test_rules_listing() {
    cmd()
        .args(["rules", "--from", "teradata", "--to", "db2", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sel-abbrev"))
        .stdout(predicate::str::contains("qualify-rownum"));
}

#[test]
fn test_rules_json() {
    cmd()
        .args(["rules", "--from", "oracle", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("schema-qualify-hint"))
        .stdout(predicate::str::contains("sel-abbrev").not());
}

#[test]
fn test_probe_missing_fields() {
    cmd()
        .args(["probe", "--host", "localhost", "-f", "json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"success\": false"))
        .stdout(predicate::str::contains("Missing required fields: port"));
}

#[test]
fn test_probe_unknown_connection() {
    cmd()
        .args(["probe", "--connection", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("convert"))
        .stdout(predicate::str::contains("probe"));
}

#[test]
fn test_version() {
    cmd().arg("--version").assert().success();
}
