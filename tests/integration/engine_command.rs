//! Integration tests for external template-mining engines.
//!
//! The engine is a small `sh` script that echoes every input line back as
//! its own template.

#![cfg(unix)]

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

const ECHO_ENGINE: &str = r#"
while [ $# -gt 0 ]; do
  case "$1" in
    --input) in="$2"; shift ;;
    --output) out="$2"; shift ;;
  esac
  shift
done
while IFS= read -r line; do
  printf '{"Content":"%s","EventTemplate":"<*>"}\n' "$line"
done < "$in" > "$out/input.log_structured.jsonl"
"#;

const INPUT: &str = "\
2024-06-01 12:00:00 INFO start
2024-06-01 12:00:01 WARN slow query
2024-06-01 12:00:02 ERROR upstream timeout
";

fn with_engine(cmd: &mut Command, script: &str) {
    cmd.args(["--engine-command", "sh", "--engine-arg=-c"])
        .arg(format!("--engine-arg={script}"))
        .arg("--engine-arg=engine");
}

fn parse_ndjson(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn engine_output_is_tagged_with_algorithm() {
    let mut cmd = lognorm();
    with_engine(&mut cmd, ECHO_ENGINE);
    let output = cmd.write_stdin(INPUT).output().unwrap();
    assert!(output.status.success());

    let records = parse_ndjson(&output.stdout);
    assert_eq!(records.len(), 3);
    for record in &records {
        // three distinct lines: the diverse-batch rule picks logmine
        assert_eq!(record["metadata"]["parsing_method"], "logmine");
        assert_eq!(record["metadata"]["ml_template"], "<*>");
        assert_eq!(record["metadata"]["ml_confidence"], "0.8");
    }
    assert_eq!(records[1]["level"], "WARN");
    assert_eq!(records[1]["message"], "slow query");
    assert_eq!(records[2]["timestamp"], "2024-06-01T12:00:02Z");
}

#[test]
fn failing_engine_falls_back_to_regex() {
    let mut cmd = lognorm();
    with_engine(&mut cmd, "echo boom >&2; exit 1");
    cmd.write_stdin(INPUT)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""parsing_method":"regex_fallback""#))
        .stdout(predicate::str::contains(r#""message":"upstream timeout""#))
        .stderr(predicate::str::contains("template mining failed"));
}

#[test]
fn silent_engine_falls_back_to_regex() {
    let mut cmd = lognorm();
    with_engine(&mut cmd, "exit 0");
    let output = cmd.write_stdin(INPUT).output().unwrap();
    assert!(output.status.success());
    let records = parse_ndjson(&output.stdout);
    assert_eq!(records.len(), 3);
    assert!(
        records
            .iter()
            .all(|r| r["metadata"]["parsing_method"] == "regex_fallback")
    );
}

#[test]
fn engine_from_config_file() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    let toml = format!(
        "[engine]\ncommand = \"sh\"\nargs = [\"-c\", {}, \"engine\"]\n",
        serde_json::to_string(ECHO_ENGINE).unwrap()
    );
    config.write_all(toml.as_bytes()).unwrap();

    lognorm()
        .arg("--config")
        .arg(config.path())
        .write_stdin(INPUT)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""parsing_method":"logmine""#));
}

#[test]
fn fast_path_lines_never_reach_the_engine() {
    let mut cmd = lognorm();
    with_engine(&mut cmd, "exit 1");
    cmd.write_stdin(r#"{"level":"info","msg":"hi"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""parsing_method":"json""#))
        .stderr(predicate::str::contains("template mining failed").not());
}
