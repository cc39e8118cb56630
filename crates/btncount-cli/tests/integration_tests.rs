//! Integration tests for btncountd

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn btncountd() -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("btncountd")?;
    cmd.env_remove("BTNCOUNT_PIN").env_remove("RUST_LOG");
    Ok(cmd)
}

fn export_line(root: &Path, pin: u32, level: &str, edge: bool) -> TestResult {
    let dir = root.join(format!("gpio{pin}"));
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("value"), format!("{level}\n"))?;
    if edge {
        fs::write(dir.join("edge"), "none\n")?;
    }
    Ok(())
}

#[test]
fn simulated_session_counts_clicks() -> TestResult {
    btncountd()?
        .args(["--pin", "3", "--backend", "simulated"])
        .write_stdin("read\nstart\nclick 5\nread\nstop\nread\n")
        .assert()
        .success()
        .stdout("-1\nok\nok\n5\nok\n-1\n");
    Ok(())
}

#[test]
fn pin_from_environment() -> TestResult {
    btncountd()?
        .env("BTNCOUNT_PIN", "8")
        .args(["--backend", "simulated"])
        .write_stdin("status\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"pin\":8"));
    Ok(())
}

#[test]
fn invalid_command_reports_einval() -> TestResult {
    btncountd()?
        .args(["--pin", "3", "--backend", "simulated"])
        .write_stdin("restart\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("(errno 22)"));
    Ok(())
}

#[test]
fn missing_pin_is_a_usage_error() -> TestResult {
    btncountd()?.write_stdin("").assert().failure().code(2);
    Ok(())
}

#[test]
fn unexported_sysfs_line_fails_registration() -> TestResult {
    let root = TempDir::new()?;
    btncountd()?
        .args(["--pin", "21", "--sysfs-root"])
        .arg(root.path())
        .write_stdin("start\n")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("gpio21 is not a valid input line"));
    Ok(())
}

#[test]
fn sysfs_line_without_edge_cannot_start() -> TestResult {
    let root = TempDir::new()?;
    export_line(root.path(), 12, "1", false)?;
    btncountd()?
        .args(["--pin", "12", "--sysfs-root"])
        .arg(root.path())
        .write_stdin("start\nread\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("errno 5"))
        .stdout(predicate::str::ends_with("-1\n"));
    Ok(())
}

#[test]
fn sysfs_line_starts_and_arms_edges() -> TestResult {
    let root = TempDir::new()?;
    export_line(root.path(), 12, "1", true)?;
    btncountd()?
        .args(["--pin", "12", "--sysfs-root"])
        .arg(root.path())
        .write_stdin("start\nread\nstop\n")
        .assert()
        .success()
        .stdout("ok\n0\nok\n");
    let edge = fs::read_to_string(root.path().join("gpio12").join("edge"))?;
    assert_eq!(edge.trim(), "none");
    Ok(())
}

#[test]
fn drivers_are_rejected_on_sysfs() -> TestResult {
    let root = TempDir::new()?;
    export_line(root.path(), 12, "1", true)?;
    btncountd()?
        .args(["--pin", "12", "--sysfs-root"])
        .arg(root.path())
        .write_stdin("press\n")
        .assert()
        .success()
        .stdout("error: `press` needs the simulated backend\n");
    Ok(())
}
