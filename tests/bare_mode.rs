use assert_cmd::Command;
use predicates::prelude::*;
use std::time::Duration;

fn cargo_bin() -> Command {
    Command::cargo_bin("bfrun").unwrap()
}

fn small_valid_program() -> &'static str {
    "+++."
}

#[test]
fn piped_stdin_without_subcommand_executes_once() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .write_stdin(small_valid_program())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("\u{3}"));
}

#[test]
fn repl_on_piped_stdin_falls_back_to_bare() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .arg("repl")
        .write_stdin(small_valid_program())
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn repl_once_env_is_respected() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .env("BFRUN_REPL_ONCE", "1")
        .arg("repl")
        .write_stdin(small_valid_program())
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn forced_editor_on_non_tty_errors() {
    // Piped stdin (non-tty) + --editor should error out with a helpful message.
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .arg("repl")
        .arg("--editor")
        .write_stdin(small_valid_program())
        .assert()
        .failure()
        .stderr(predicate::str::contains("stdin is not a TTY"));
}

#[test]
fn invalid_repl_mode_env_is_rejected() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .arg("repl")
        .env("BFRUN_REPL_MODE", "fancy")
        .write_stdin(small_valid_program())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid BFRUN_REPL_MODE value"));
}

#[test]
fn bare_errors_are_reported_without_a_program_prefix() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .write_stdin("]")
        .assert()
        .success()
        .stderr(predicate::str::contains("dangling closing bracket at index 0"));
}
