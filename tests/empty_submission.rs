use assert_cmd::Command;
use predicates::prelude::*;
use std::time::Duration;

fn cargo_bin() -> Command {
    Command::cargo_bin("bfrun").unwrap()
}

#[test]
fn empty_stdin_in_bare_mode_is_a_clean_no_op() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn whitespace_only_submission_executes_nothing() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .arg("repl")
        .write_stdin("  \n\t\n")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn comment_only_submission_still_runs() {
    // Non-instruction characters are a valid (no-op) program, so the
    // trailing newline marker is still printed.
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .write_stdin("hello")
        .assert()
        .success()
        .stdout("\n");
}
