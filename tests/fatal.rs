//! Fatal records end the process, so each case re-runs this test binary
//! with `FATAL_CASE` set and inspects the child from outside.

use std::io::Write;
use std::process::{Command, Output};
use std::sync::Arc;

use sublog::{fatalf, logger_for, register_reporter, ContextMap, SharedError};

const CASE_ENV: &str = "FATAL_CASE";
const REPORTED: &str = "reporter ran";

/// Run in the child: reporters write straight to stderr, bypassing test
/// output capture, so the parent can see whether any ran.
fn child(case: &str) -> ! {
    for explicit in [false, true] {
        register_reporter(
            Arc::new(|_: &SharedError, _: &str, _: &ContextMap| {
                let _ = writeln!(std::io::stderr(), "{}", REPORTED);
            }),
            explicit,
        );
    }
    let log = logger_for("f");
    match case {
        "value" => log.fatal("bye"),
        _ => fatalf!(log, "bye {}", 1),
    }
}

fn run_case(test: &str, case: &str) -> Output {
    Command::new(std::env::current_exe().unwrap())
        .args(["--exact", test, "--nocapture", "--test-threads=1"])
        .env(CASE_ENV, case)
        .env_remove("TRACE")
        .env_remove("PRINT_STACK")
        .output()
        .unwrap()
}

fn fatal_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stderr)
        .lines()
        .filter(|l| l.starts_with("FATAL "))
        .map(str::to_owned)
        .collect()
}

#[test]
fn test_fatalf_writes_and_exits_without_reporting() {
    if let Ok(case) = std::env::var(CASE_ENV) {
        child(&case);
    }
    let output = run_case("test_fatalf_writes_and_exits_without_reporting", "template");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1), "{}", stderr);
    let lines = fatal_lines(&output);
    assert_eq!(lines.len(), 1, "{}", stderr);
    assert!(lines[0].starts_with("FATAL f: fatal.rs:"), "{}", lines[0]);
    assert!(lines[0].ends_with(" bye 1"), "{}", lines[0]);
    assert!(!stderr.contains(REPORTED), "{}", stderr);
}

#[test]
fn test_fatal_value_writes_and_exits_without_reporting() {
    if let Ok(case) = std::env::var(CASE_ENV) {
        child(&case);
    }
    let output = run_case("test_fatal_value_writes_and_exits_without_reporting", "value");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1), "{}", stderr);
    let lines = fatal_lines(&output);
    assert_eq!(lines.len(), 1, "{}", stderr);
    assert!(lines[0].starts_with("FATAL f: fatal.rs:"), "{}", lines[0]);
    assert!(lines[0].ends_with(" bye"), "{}", lines[0]);
    assert!(!stderr.contains(REPORTED), "{}", stderr);
}
