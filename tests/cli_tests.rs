//! Integration tests for the numseq binary

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};

fn numseq() -> Command {
    Command::cargo_bin("numseq").unwrap()
}

#[test]
fn test_factorial_prints_result() {
    numseq()
        .args(["factorial", "10"])
        .assert()
        .success()
        .stdout("3628800\n");
}

#[test]
fn test_factorial_digits() {
    numseq()
        .args(["factorial", "25", "--digits"])
        .assert()
        .success()
        .stdout("26\n");
}

#[test]
fn test_fib_each_strategy() {
    for strategy in ["iterative", "fold", "recursive"] {
        numseq()
            .args(["fib", "100", "--strategy", strategy])
            .assert()
            .success()
            .stdout("354224848179261915075\n");
    }
}

#[test]
fn test_fib_time_reports_elapsed() {
    numseq()
        .args(["fib", "10", "--time"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("55\ntook ").and(predicate::str::ends_with("seconds\n")));
}

#[test]
fn test_fizzbuzz_default_length() {
    let output = numseq().arg("fizzbuzz").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 100);
    assert_eq!(lines[99], "Buzz");
}

#[test]
fn test_fizzbuzz_fifteen() {
    numseq()
        .args(["fizzbuzz", "15"])
        .assert()
        .success()
        .stdout("1\n2\nFizz\n4\nBuzz\nFizz\n7\n8\nFizz\nBuzz\n11\nFizz\n13\n14\nFizzBuzz\n");
}

#[test]
fn test_reader_closing_early_exits_cleanly() {
    let mut child = numseq()
        .args(["fizzbuzz", "1000000"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let mut first = String::new();
    BufReader::new(child.stdout.take().unwrap())
        .read_line(&mut first)
        .unwrap();
    assert_eq!(first, "1\n");

    // stdout is dropped here, like `| head -1`
    let output = child.wait_with_output().unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(0), "stderr: {stderr}");
    assert!(!stderr.contains("panicked"), "{stderr}");
}

#[test]
fn test_negative_input_fails() {
    numseq()
        .args(["factorial", "-3"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("negative value `-3`"));
}

#[test]
fn test_non_integer_input_fails() {
    numseq()
        .args(["fib", "abc"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("expected a non-negative integer, got `abc`"));
}

#[test]
fn test_zero_length_fizzbuzz_fails() {
    numseq()
        .args(["fizzbuzz", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("length must be at least 1"));
}

#[test]
fn test_unknown_strategy_is_usage_error() {
    numseq()
        .args(["fib", "10", "--strategy", "matrix"])
        .assert()
        .failure()
        .code(2);
}
