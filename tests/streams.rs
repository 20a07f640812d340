use assert_cmd::Command;
use predicates::prelude::*;
use std::time::Duration;

fn cargo_bin() -> Command {
    Command::cargo_bin("bfrun").unwrap()
}

#[test]
fn program_output_goes_to_stdout_only() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .arg("run")
        .arg("+++.")
        .assert()
        .success()
        .stdout(predicate::str::contains("\u{3}"))
        .stderr(predicate::str::contains("\u{3}").not());
}

#[test]
fn trace_table_goes_to_stderr_only() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .arg("run")
        .arg("--trace")
        .arg("+++.")
        .assert()
        .success()
        .stdout(predicate::str::contains("STEP").not())
        .stderr(predicate::str::contains("STEP"));
}

#[test]
fn errors_go_to_stderr_not_stdout() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .arg("run")
        .arg("<")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("pointer out of bounds"));
}
