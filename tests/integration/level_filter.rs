//! Integration tests for minimum-level filtering.

use assert_cmd::Command;
use predicates::prelude::*;

#[allow(deprecated)]
fn lognorm() -> Command {
    let mut cmd = Command::cargo_bin("lognorm").unwrap();
    cmd.env("XDG_CONFIG_HOME", "/tmp/lognorm-test-no-config");
    cmd
}

const MIXED_LEVELS: &str = "\
2024-06-01 12:00:00 DEBUG cache warmed
2024-06-01 12:00:01 INFO listening on 8080
2024-06-01 12:00:02 WARN slow query
2024-06-01 12:00:03 ERROR upstream timeout
";

#[test]
fn level_warn_drops_lower_levels() {
    lognorm()
        .args(["--level", "warn"])
        .write_stdin(MIXED_LEVELS)
        .assert()
        .success()
        .stdout(predicate::str::contains("cache warmed").not())
        .stdout(predicate::str::contains("listening on 8080").not())
        .stdout(predicate::str::contains("slow query"))
        .stdout(predicate::str::contains("upstream timeout"));
}

#[test]
fn level_is_case_insensitive() {
    lognorm()
        .args(["-l", "ERROR"])
        .write_stdin(MIXED_LEVELS)
        .assert()
        .success()
        .stdout(predicate::str::contains("slow query").not())
        .stdout(predicate::str::contains("upstream timeout"));
}

#[test]
fn records_without_level_are_kept() {
    lognorm()
        .args(["--level", "error", "--no-fast-paths"])
        .write_stdin("just some text\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("just some text"));
}

#[test]
fn invalid_level_is_rejected() {
    lognorm()
        .args(["--level", "verbose"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid level"));
}
