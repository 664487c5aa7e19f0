//! Integration tests for reading input and rendering each output format.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

#[allow(deprecated)]
fn lognorm() -> Command {
    let mut cmd = Command::cargo_bin("lognorm").unwrap();
    cmd.env("XDG_CONFIG_HOME", "/tmp/lognorm-test-no-config");
    cmd.env_remove("RUST_LOG");
    cmd
}

const STACK_TRACE_INPUT: &str = "2024-06-01 12:00:00 INFO start\n2024-06-01 12:00:01 ERROR boom\n    at foo.bar(x.js:1)\n";

fn parse_ndjson(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn empty_stdin_exits_zero() {
    lognorm().write_stdin("").assert().success().stdout("");
}

#[test]
fn blank_lines_produce_no_records() {
    lognorm().write_stdin("\n   \n\t\n").assert().success().stdout("");
}

#[test]
fn stack_trace_is_one_record() {
    let output = lognorm().write_stdin(STACK_TRACE_INPUT).output().unwrap();
    assert!(output.status.success());
    let records = parse_ndjson(&output.stdout);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["timestamp"], "2024-06-01T12:00:00Z");
    assert_eq!(records[0]["level"], "INFO");
    assert_eq!(records[0]["message"], "start");
    assert_eq!(records[1]["level"], "ERROR");
    assert_eq!(records[1]["message"], "boom\nat foo.bar(x.js:1)");
    assert_eq!(
        records[1]["rawData"],
        "2024-06-01 12:00:01 ERROR boom\n    at foo.bar(x.js:1)"
    );
    assert_eq!(records[1]["metadata"]["parsing_method"], "regex_fallback");
}

#[test]
fn json_line_takes_fast_path() {
    let input = r#"{"timestamp":"2024-01-01T00:00:00Z","level":"INFO","message":"hi"}"#;
    let output = lognorm().write_stdin(input).output().unwrap();
    let records = parse_ndjson(&output.stdout);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["timestamp"], "2024-01-01T00:00:00Z");
    assert_eq!(records[0]["level"], "INFO");
    assert_eq!(records[0]["message"], "hi");
    assert_eq!(records[0]["metadata"]["parsing_method"], "json");
}

#[test]
fn access_log_takes_fast_path() {
    let input = r#"127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 404 2326"#;
    lognorm()
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""level":"WARN""#))
        .stdout(predicate::str::contains(r#""path":"/apache_pb.gif""#))
        .stdout(predicate::str::contains(r#""timestamp":"2000-10-10T20:55:36Z""#));
}

#[test]
fn no_fast_paths_sends_json_through_extractor() {
    let input = r#"{"level":"info","msg":"hi"}"#;
    lognorm()
        .arg("--no-fast-paths")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""parsing_method":"regex_fallback""#));
}

#[test]
fn json_array_output() {
    let output = lognorm()
        .args(["-o", "json"])
        .write_stdin(STACK_TRACE_INPUT)
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed.as_array().map(Vec::len), Some(2));
}

#[test]
fn pretty_output_without_color() {
    lognorm()
        .args(["-o", "pretty", "--color=never"])
        .write_stdin(STACK_TRACE_INPUT)
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-06-01T12:00:01Z  ERROR: boom"))
        .stdout(predicate::str::contains("\n    at foo.bar(x.js:1)"))
        .stdout(predicate::str::contains("parsing_method: regex_fallback"))
        .stdout(predicate::str::contains("\x1b[").not());
}

#[test]
fn pretty_output_forced_color() {
    lognorm()
        .args(["-o", "pretty", "--color=always"])
        .write_stdin(STACK_TRACE_INPUT)
        .assert()
        .success()
        .stdout(predicate::str::contains("\x1b["));
}

#[test]
fn pretty_output_truncates_long_values() {
    let long_value = "x".repeat(50);
    lognorm()
        .args(["-o", "pretty", "--color=never", "-M", "10"])
        .write_stdin(format!("2024-06-01 12:00:00 INFO hello data={long_value}"))
        .assert()
        .success()
        .stdout(predicate::str::contains("xxxxxxxxxx…"))
        .stdout(predicate::str::contains(long_value.as_str()).not());
}

#[test]
fn reads_files_in_order() {
    let mut first = tempfile::NamedTempFile::new().unwrap();
    writeln!(first, "2024-06-01 12:00:00 INFO from first").unwrap();
    let mut second = tempfile::NamedTempFile::new().unwrap();
    writeln!(second, "2024-06-01 12:00:01 WARN from second").unwrap();

    let output = lognorm().arg(first.path()).arg(second.path()).output().unwrap();
    assert!(output.status.success());
    let records = parse_ndjson(&output.stdout);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["message"], "from first");
    assert_eq!(records[1]["message"], "from second");
}

#[test]
fn missing_input_file_exits_two() {
    lognorm()
        .arg("/nonexistent/lognorm-input.log")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("lognorm:"));
}

#[test]
fn invalid_utf8_lines_are_skipped() {
    let mut input = b"2024-06-01 12:00:00 INFO good\n".to_vec();
    input.extend_from_slice(&[0xff, 0xfe, b'\n']);
    input.extend_from_slice(b"2024-06-01 12:00:01 INFO also good\n");
    let output = lognorm().write_stdin(input).output().unwrap();
    assert!(output.status.success());
    assert_eq!(parse_ndjson(&output.stdout).len(), 2);
}

#[test]
fn verbose_logs_to_stderr_only() {
    let output = lognorm().arg("-vv").write_stdin(STACK_TRACE_INPUT).output().unwrap();
    assert!(output.status.success());
    assert_eq!(parse_ndjson(&output.stdout).len(), 2);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("selected template-mining algorithm"), "stderr: {stderr}");
}
