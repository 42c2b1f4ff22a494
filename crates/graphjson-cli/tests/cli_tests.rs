//! Integration tests for the `graphjson` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the encode, decode,
//! stats and types subcommands through the actual binary, including
//! stdin/stdout piping, file I/O, error handling, and roundtrip correctness.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: path to the sample.json fixture.
fn sample_json_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/sample.json")
}

/// Helper: path to the sample.graph fixture.
fn sample_graph_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/sample.graph")
}

/// Helper: read the sample.json fixture as parsed JSON.
fn sample_json() -> serde_json::Value {
    let raw = std::fs::read_to_string(sample_json_path()).expect("sample.json fixture must exist");
    serde_json::from_str(&raw).expect("sample.json fixture must be valid JSON")
}

fn graphjson() -> Command {
    Command::cargo_bin("graphjson").unwrap()
}

const SHARED_SAMPLE: &str = r#"{"members": [{"active": true, "name": "Alice", "role": {"__id": 4, "value": "Site Reliability Engineering Lead"}}, {"active": false, "name": "Bob", "role": {"__ref": 4}}, {"active": true, "name": "Carol", "role": "Staff Software Engineer, Storage"}], "notes": null, "scores": [95, 87.5, 92], "team": "Platform Infrastructure"}"#;

// ─────────────────────────────────────────────────────────────────────────────
// Encode subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn encode_stdin_to_stdout() {
    graphjson()
        .arg("encode")
        .write_stdin(r#"{"name":"Alice","age":30,"ratio":1.0}"#)
        .assert()
        .success()
        .stdout(r#"{"age": 30, "name": "Alice", "ratio": 1.0}"#);
}

#[test]
fn encode_without_sharing_writes_no_references() {
    graphjson()
        .args(["encode", "-i", sample_json_path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("__ref").not())
        .stdout(predicate::str::contains("Site Reliability Engineering Lead").count(2));
}

#[test]
fn encode_share_strings_references_repeats() {
    graphjson()
        .args(["encode", "--share-strings", "-i", sample_json_path()])
        .assert()
        .success()
        .stdout(SHARED_SAMPLE);
}

#[test]
fn encode_file_to_file() {
    let output_path = std::env::temp_dir().join("graphjson-test-encode-output.graph");
    let _ = std::fs::remove_file(&output_path);

    graphjson()
        .args(["encode", "--share-strings", "-i", sample_json_path(), "-o"])
        .arg(&output_path)
        .assert()
        .success()
        .stdout("");

    let content = std::fs::read_to_string(&output_path).expect("output file must exist");
    assert_eq!(content, SHARED_SAMPLE);
    let _ = std::fs::remove_file(&output_path);
}

#[test]
fn encode_invalid_json_fails() {
    graphjson()
        .arg("encode")
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse input as JSON"));
}

#[test]
fn encode_missing_input_file_fails() {
    graphjson()
        .args(["encode", "-i", "/nonexistent/graphjson/input.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Decode subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn decode_expands_references() {
    let output = graphjson()
        .args(["decode", "-i", sample_graph_path()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "members": [
                {"name": "Alice", "role": "Site Reliability Engineering Lead"},
                {"name": "Alice", "role": "Site Reliability Engineering Lead"},
                {"name": "Bob", "role": "Site Reliability Engineering Lead"}
            ],
            "since": {"__type": "timestamp", "value": 1700000000000i64},
            "team": "Platform Infrastructure"
        })
    );
}

#[test]
fn decode_undefined_reference_fails() {
    graphjson()
        .arg("decode")
        .write_stdin(r#"[{"__ref": 7}]"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to decode graph text"))
        .stderr(predicate::str::contains("undefined object id 7"));
}

#[test]
fn decode_unregistered_type_fails() {
    graphjson()
        .arg("decode")
        .write_stdin(r#"{"__type": "celsius", "value": 1.0}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("celsius"));
}

#[test]
fn encode_decode_roundtrip() {
    let encoded = graphjson()
        .args(["encode", "--share-strings", "-i", sample_json_path()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let decoded = graphjson()
        .arg("decode")
        .write_stdin(encoded)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&decoded).unwrap();
    assert_eq!(json, sample_json());
}

// ─────────────────────────────────────────────────────────────────────────────
// Stats subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn stats_prints_sharing_counts() {
    graphjson()
        .args(["stats", "-i", sample_json_path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("JSON size:"))
        .stdout(predicate::str::contains("Graph size:"))
        .stdout(predicate::str::contains("Definitions:  1"))
        .stdout(predicate::str::contains("References:   1"));
}

#[test]
fn stats_json_output() {
    let output = graphjson()
        .args(["stats", "--json", "-i", sample_json_path()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["tracked"], 9);
    assert_eq!(report["definitions"], 1);
    assert_eq!(report["references"], 1);
    assert_eq!(report["bytes"], SHARED_SAMPLE.len());
    assert!(report["json_bytes"].as_u64().unwrap() > 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Types subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn types_lists_standard_and_extended() {
    graphjson()
        .arg("types")
        .assert()
        .success()
        .stdout(predicate::str::contains("bool\n"))
        .stdout(predicate::str::contains("timestamp (extended)"))
        .stdout(predicate::str::contains("int (extended, alias of i32)"));
}

#[test]
fn types_json_output() {
    let output = graphjson()
        .args(["types", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let entries: Vec<serde_json::Value> = serde_json::from_slice(&output).unwrap();
    let int = entries
        .iter()
        .find(|e| e["name"] == "int")
        .expect("int must be listed");
    assert_eq!(int["standard"], false);
    assert_eq!(int["canonical"], "i32");
    let text = entries
        .iter()
        .find(|e| e["name"] == "text")
        .expect("text must be listed");
    assert_eq!(text["standard"], true);
    assert!(text.get("canonical").is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Global flags
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn verbose_logs_go_to_stderr() {
    graphjson()
        .args(["-vv", "encode"])
        .write_stdin("[1]")
        .assert()
        .success()
        .stdout("[1]")
        .stderr(predicate::str::contains("encoded value graph"));
}

#[test]
fn no_subcommand_shows_usage() {
    graphjson()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
