//! End-to-end tests for the gauntlet-demo CLI.
//!
//! These tests run the real binary over the bundled sample suites and
//! check the report, the exit status and the informational flags.

use assert_cmd::Command;
use predicates::prelude::*;

/// Get a Command for the demo binary, with the environment overrides
/// cleared so the host settings cannot leak in.
#[allow(deprecated)]
fn demo_cmd() -> Command {
    let mut cmd = Command::cargo_bin("gauntlet-demo").unwrap();
    for var in [
        "GAUNTLET_WIDTH",
        "GAUNTLET_COLOR",
        "GAUNTLET_BACKTRACE",
        "GAUNTLET_ABORT_ON_FAILURE",
        "GAUNTLET_FILTER",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

// =============================================================================
// Report Tests
// =============================================================================

mod report {
    use super::*;

    #[test]
    fn test_full_run_exits_with_failure_count() {
        demo_cmd()
            .arg("--no-color")
            .assert()
            .code(1)
            .stdout(predicate::str::contains("UNIT TESTS"))
            .stdout(predicate::str::contains("Testing 4 suite(s):"))
            .stdout(predicate::str::contains("TEST RESULTS"))
            .stdout(predicate::str::contains("GRAPH COLORS:"));
    }

    #[test]
    fn test_status_lines() {
        demo_cmd()
            .arg("--no-color")
            .assert()
            .code(1)
            .stdout(predicate::str::contains(
                "[PASS] Testing 'addition(i32, i32, i32)' with (10, -10, 0)",
            ))
            .stdout(predicate::str::contains("[FAIL] Testing 'always_fails()'"))
            .stdout(predicate::str::contains("[SKIP] Testing 'marked_skipped()'"))
            .stdout(predicate::str::contains("Testing 'displays(bool)' with (true)"));
    }

    #[test]
    fn test_plain_output_has_no_escape_codes() {
        demo_cmd()
            .arg("--no-color")
            .assert()
            .stdout(predicate::str::contains("\u{1b}[").not());
    }

    #[test]
    fn test_priority_order_in_listing() {
        let output = demo_cmd().arg("--no-color").output().unwrap();
        let stdout = String::from_utf8(output.stdout).unwrap();
        let collections = stdout.find("suites::Collections").unwrap();
        let sample = stdout.find("suites::Sample").unwrap();
        assert!(collections < sample);
    }
}

// =============================================================================
// Flag Tests
// =============================================================================

mod flags {
    use super::*;

    #[test]
    fn test_filter_leaves_only_passing_cases() {
        demo_cmd()
            .args(["--no-color", "--filter", "addition"])
            .assert()
            .success()
            .stdout(predicate::str::contains("always_fails").not());
    }

    #[test]
    fn test_abort_on_failure_is_a_session_fault() {
        demo_cmd()
            .args(["--no-color", "--abort-on-failure"])
            .assert()
            .code(255)
            .stdout(predicate::str::contains("--- A CRITICAL ERROR OCCURRED ---"));
    }

    #[test]
    fn test_narrow_width_is_a_session_fault() {
        demo_cmd()
            .args(["--no-color", "--width", "20"])
            .assert()
            .code(255)
            .stdout(predicate::str::contains("below the minimum of 40"));
    }

    #[test]
    fn test_env_width_is_used() {
        demo_cmd()
            .arg("--print-config")
            .env("GAUNTLET_WIDTH", "64")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"width\": 64"));
    }

    #[test]
    fn test_env_flags_bind_through_cli() {
        demo_cmd()
            .arg("--no-color")
            .env("GAUNTLET_ABORT_ON_FAILURE", "1")
            .assert()
            .code(255)
            .stdout(predicate::str::contains("aborted after 'Sample::always_fails' failed"));

        demo_cmd()
            .arg("--no-color")
            .env("GAUNTLET_FILTER", "addition")
            .assert()
            .success()
            .stdout(predicate::str::contains("always_fails").not());
    }

    #[test]
    fn test_flag_wins_over_env() {
        demo_cmd()
            .args(["--print-config", "--width", "72"])
            .env("GAUNTLET_WIDTH", "64")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"width\": 72"));
    }

    #[test]
    fn test_invalid_env_is_reported() {
        demo_cmd()
            .env("GAUNTLET_COLOR", "rainbow")
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid GAUNTLET_* environment"));
    }

    #[test]
    fn test_list_prints_run_order() {
        demo_cmd()
            .arg("--list")
            .assert()
            .success()
            .stdout(predicate::str::contains("(priority 10)"))
            .stdout(predicate::str::contains("TEST RESULTS").not());
    }

    #[test]
    fn test_help() {
        demo_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("--abort-on-failure"));
    }
}
