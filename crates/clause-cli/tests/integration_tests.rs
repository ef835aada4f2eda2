//! Integration tests for clause-cli's `analyze` subcommand.

use std::io::Write;
use std::process::Command;

use tempfile::NamedTempFile;

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .args(["run", "-q", "-p", "clause-cli", "--"])
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    file.write_all(content.as_bytes()).expect("failed to write temp file");
    file
}

#[test]
fn test_help() {
    let output = run_cli(&["--help"]);
    let out = stdout(&output);
    assert!(out.contains("analyze"));
}

#[test]
fn test_version() {
    let output = run_cli(&["--version"]);
    let out = stdout(&output);
    assert!(out.contains("clause-cli"));
}

#[test]
fn test_analyze_requires_input() {
    let output = run_cli(&["analyze"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("input") || stderr(&output).contains("required"));
}

#[test]
fn test_analyze_text_output() {
    let input = write_csv("Id,Tekst\nrow_1,Dekking van brandschade tot 10000 euro per jaar.\nrow_2,Dekking van brandschade tot 10000 euro per jaar.\n");
    let path = input.path().to_str().unwrap();

    let output = run_cli(&["analyze", "--input", path, "--mode", "fast"]);
    let out = stdout(&output);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(out.contains("row_1"));
    assert!(out.contains("row_2"));
    assert!(out.contains("rows -> "));
}

#[test]
fn test_analyze_json_output() {
    let input = write_csv("Id,Tekst\nrow_1,Dekking van brandschade tot 10000 euro per jaar.\n");
    let path = input.path().to_str().unwrap();

    let output = run_cli(&["analyze", "--input", path, "--mode", "fast", "--format", "json"]);
    let out = stdout(&output);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&out).expect("output should be valid JSON");
    assert!(value.get("rows").and_then(|r| r.as_array()).is_some());
    assert!(value.get("statistics").is_some());
}

#[test]
fn test_analyze_rejects_malformed_as_of_date() {
    let input = write_csv("Id,Tekst\nrow_1,Dekking van brandschade.\n");
    let path = input.path().to_str().unwrap();

    let output = run_cli(&["analyze", "--input", path, "--as-of", "15-01-2026"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("as-of") || stderr(&output).contains("date"));
}

#[test]
fn test_analyze_with_missing_input_file() {
    let output = run_cli(&["analyze", "--input", "/nonexistent/file.csv"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("IO error") || stderr(&output).contains("error"));
}

#[test]
fn test_analyze_with_standard_clause_library() {
    let input = write_csv("Id,Tekst\nrow_1,Dekking van brandschade.\n");
    let library = write_csv("Code,Tekst,Categorie\n9NX3,Dekking van brandschade,BRAND\n");
    let input_path = input.path().to_str().unwrap();
    let library_path = library.path().to_str().unwrap();

    let output = run_cli(&["analyze", "--input", input_path, "--library", library_path, "--mode", "fast"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("DELETE") || out.contains("MANUAL_CHECK"));
}
