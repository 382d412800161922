use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_the_check_command() {
    Command::cargo_bin("headlamp")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"));
}

#[test]
fn check_help_documents_the_surfaces() {
    Command::cargo_bin("headlamp")
        .unwrap()
        .args(["check", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--xml"))
        .stdout(predicate::str::contains("--html"))
        .stdout(predicate::str::contains("--inherit-from-idea"))
        .stdout(predicate::str::contains("--max-errors"));
}

#[test]
fn missing_config_file_fails_with_context() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("headlamp")
        .unwrap()
        .current_dir(dir.path())
        .args(["check", "--config", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.json"));
}

#[test]
fn empty_project_fails_before_spawning_a_runner() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("headlamp")
        .unwrap()
        .current_dir(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no source files to analyze"));
}
