//! Integration tests verifying that diagnostics and logs go to stderr.
//!
//! These tests exercise the production logging path by invoking the compiled
//! binary. Standard output carries only command echo and notices.

use predicates::prelude::*;
use test_support::Project;

fn tsumiki(project: &Project) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("tsumiki").expect("tsumiki binary");
    cmd.current_dir(project.root())
        .env_remove("TSUMIKI_FILE")
        .env_remove("TSUMIKI_DIRECTORY");
    cmd
}

/// A missing build file fails quickly; the report must appear on stderr.
#[test]
fn main_reports_errors_to_stderr() {
    let project = Project::new().expect("project");
    tsumiki(&project)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found in"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn verbose_logs_go_to_stderr() {
    let project = Project::new().expect("project");
    project.write_build_file("noop:\n").expect("build file");
    tsumiki(&project)
        .arg("--verbose")
        .assert()
        .success()
        .stderr(predicate::str::contains("parsed build file"))
        .stdout(predicate::eq("noop is up to date.\n"));
}

#[test]
fn quiet_by_default() {
    let project = Project::new().expect("project");
    project.write_build_file("noop:\n").expect("build file");
    tsumiki(&project)
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}
