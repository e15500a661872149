// CLI integration tests for the validate/show/select/partition/set flows.
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

const PEOPLE: &str = "\"name\",\"age\"\n\"Alice\",30\n\"Bob\",-5\n\"Cy\",12.5\n";

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_csvtab");
    let mut command = Command::new(exe);
    command.env_remove("RUST_LOG");
    command
}

fn write_input(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write input");
    path
}

fn parse_json(output: &[u8]) -> Value {
    let text = std::str::from_utf8(output).expect("utf8");
    let line = text.lines().next().expect("json line");
    serde_json::from_str(line).expect("valid json")
}

fn stdout_text(output: &std::process::Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf8")
}

#[test]
fn validate_accepts_and_reports_shape() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_input(temp.path(), "people.csv", PEOPLE);

    let output = cmd()
        .args(["validate", "--json"])
        .arg(&path)
        .output()
        .expect("validate");
    assert!(output.status.success());
    let report = parse_json(&output.stdout);
    assert_eq!(report["status"], "ok");
    assert_eq!(report["records"], 3);
    assert_eq!(report["columns"], 2);
    assert_eq!(report["kinds"], serde_json::json!(["string", "number"]));
}

#[test]
fn validate_rejects_with_grammar_exit_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_input(
        temp.path(),
        "bad.csv",
        "\"name\",\"age\"\n\"Alice\",30\n\"Bob\",\"old\"\n",
    );

    let output = cmd().arg("validate").arg(&path).output().expect("validate");
    assert_eq!(output.status.code(), Some(5));
    assert_eq!(stdout_text(&output).trim(), "rejected");
}

#[test]
fn validate_honors_no_header() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_input(temp.path(), "nums.csv", "1,2\n3,4\n");

    let with_header = cmd().arg("validate").arg(&path).output().expect("validate");
    assert_eq!(with_header.status.code(), Some(5));

    let headerless = cmd()
        .args(["validate", "--no-header"])
        .arg(&path)
        .output()
        .expect("validate");
    assert!(headerless.status.success());
    assert_eq!(
        stdout_text(&headerless).trim(),
        "ok: 2 records, 2 columns (number, number)"
    );
}

#[test]
fn show_prints_fields_and_records() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_input(temp.path(), "people.csv", PEOPLE);

    let output = cmd().arg("show").arg(&path).output().expect("show");
    assert!(output.status.success());
    let text = stdout_text(&output);
    assert!(text.starts_with("Fields:\n  name: string\n  age: number\n"));
    assert!(text.contains("Record 1:\n  name: Bob\n  age: -5"));

    let json = cmd()
        .args(["show", "--format", "json"])
        .arg(&path)
        .output()
        .expect("show json");
    assert!(json.status.success());
    let value = parse_json(&json.stdout);
    assert_eq!(value["fields"][0]["name"], "name");
    assert_eq!(value["fields"][1]["kind"], "number");
    assert_eq!(value["records"][1][0], "Bob");
    assert_eq!(value["records"][1][1], -5);
}

#[test]
fn select_writes_matching_rows_as_csv() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_input(temp.path(), "people.csv", PEOPLE);

    let output = cmd()
        .args(["select", "--where", "age LT 0", "--format", "csv", "--eol", "lf"])
        .arg(&path)
        .output()
        .expect("select");
    assert!(output.status.success());
    assert_eq!(stdout_text(&output), "\"name\",\"age\"\n\"Bob\",-5\n");

    let intersected = cmd()
        .args([
            "select", "-w", "age >= 0", "-w", "name SNE Alice", "--format", "csv", "--eol", "crlf",
        ])
        .arg(&path)
        .output()
        .expect("select");
    assert!(intersected.status.success());
    assert_eq!(stdout_text(&intersected), "\"name\",\"age\"\r\n\"Cy\",12.5\r\n");
}

#[test]
fn set_prints_hex_and_feeds_back_into_select() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_input(temp.path(), "people.csv", PEOPLE);

    let output = cmd()
        .args(["set", "--where", "2 MOD 0"])
        .arg(&path)
        .output()
        .expect("set");
    assert!(output.status.success());
    let hex = stdout_text(&output).trim().to_string();
    assert_eq!(hex, "05");

    let selected = cmd()
        .args(["select", "--set", &hex, "--format", "csv", "--eol", "lf"])
        .arg(&path)
        .output()
        .expect("select");
    assert!(selected.status.success());
    assert_eq!(
        stdout_text(&selected),
        "\"name\",\"age\"\n\"Alice\",30\n\"Cy\",12.5\n"
    );
}

#[test]
fn partition_splits_into_matching_and_complement() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_input(temp.path(), "people.csv", PEOPLE);

    let output = cmd()
        .args(["partition", "--where", "name SEQ Bob", "--format", "json"])
        .arg(&path)
        .output()
        .expect("partition");
    assert!(output.status.success());
    let value = parse_json(&output.stdout);
    assert_eq!(value["matching"]["records"].as_array().map(Vec::len), Some(1));
    assert_eq!(value["complement"]["records"].as_array().map(Vec::len), Some(2));
    assert_eq!(value["complement"]["records"][1][0], "Cy");
}

#[test]
fn errors_are_json_on_non_tty_stderr() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_input(temp.path(), "people.csv", PEOPLE);

    let output = cmd()
        .args(["select", "--where", "height LT 0"])
        .arg(&path)
        .output()
        .expect("select");
    assert_eq!(output.status.code(), Some(3));
    let err = parse_json(&output.stderr);
    assert_eq!(err["error"]["kind"], "NotFound");
    assert_eq!(err["error"]["field"], "height");

    let kind = cmd()
        .args(["select", "--where", "name LT 0"])
        .arg(&path)
        .output()
        .expect("select");
    assert_eq!(kind.status.code(), Some(6));

    let missing = cmd()
        .arg("show")
        .arg(temp.path().join("missing.csv"))
        .output()
        .expect("show");
    assert_eq!(missing.status.code(), Some(3));
    let err = parse_json(&missing.stderr);
    assert!(err["error"]["path"].as_str().is_some());
}

#[test]
fn show_rejects_invalid_input_with_grammar_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_input(temp.path(), "bad.csv", "\"a\"\n1\n2,3\n");

    let output = cmd().arg("show").arg(&path).output().expect("show");
    assert_eq!(output.status.code(), Some(5));
    let err = parse_json(&output.stderr);
    assert_eq!(err["error"]["kind"], "Grammar");
    assert!(err["error"]["hint"].as_str().is_some());
}

#[test]
fn bad_set_length_is_a_size_mismatch() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_input(temp.path(), "people.csv", PEOPLE);

    let output = cmd()
        .args(["select", "--set", "0000"])
        .arg(&path)
        .output()
        .expect("select");
    assert_eq!(output.status.code(), Some(9));
}

#[test]
fn usage_errors_exit_two() {
    let output = cmd().args(["select"]).output().expect("select");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn version_emits_json_when_piped() {
    let output = cmd().arg("version").output().expect("version");
    assert!(output.status.success());
    let value = parse_json(&output.stdout);
    assert_eq!(value["name"], "csvtab");
}
