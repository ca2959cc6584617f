#![cfg(feature = "cli_api")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.write_stdin(script.to_string()).assert()
}

#[test]
fn cli_rejects_reversed_date_range() {
    run_cli("add 1 TaskA\ndates 1 2024-01-05 2024-01-01\nquit\n")
        .success()
        .stdout(str_contains("must be on or after"));
}

#[test]
fn cli_accepts_equal_dates_and_charts_them() {
    run_cli("add 1 Milestone\nwindow 2024-01-01 2024-01-31\ndates 1 2024-01-05 2024-01-05\nchart\nquit\n")
        .success()
        .stdout(str_contains("Dates updated."))
        .stdout(str_contains("Milestone"));
}

#[test]
fn cli_delete_command_removes_task() {
    run_cli("add 1 TaskA\nadd 2 TaskB\ndelete 2\nquit\n")
        .success()
        .stdout(str_contains("Deleted task 2."));
}

#[test]
fn cli_reports_window_validation_errors() {
    run_cli("window 2025-01-10 2025-01-05\nquit\n")
        .success()
        .stdout(str_contains(
            "window start 2025-01-10 must be on or before window end 2025-01-05",
        ));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().replace('\\', "\\\\");
    let script = format!(
        "add 1 TaskPersist\nsave json {}\nadd 2 Temp\nload json {}\nshow\nquit\n",
        path, path
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(
        output.contains("View loaded from"),
        "expected output to mention load completion"
    );
    assert!(
        output.contains("TaskPersist"),
        "expected persisted task to remain"
    );
    let after_reload = output.split("View loaded from").last().unwrap_or_default();
    assert!(
        !after_reload.contains("Temp"),
        "temporary task should not appear after reload:\n{}",
        after_reload
    );
}

#[test]
fn cli_summary_reports_counters() {
    run_cli("add 1 TaskA\nwindow 2024-01-01 2024-01-31\ndates 1 2024-01-02 2024-01-06\nsummary\nquit\n")
        .success()
        .stdout(str_contains("stored=1"))
        .stdout(str_contains("rendered=1"));
}
