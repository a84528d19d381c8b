//! Binary-level tests: report on stdout, progress on stderr, exit codes.

use assert_cmd::Command;
use dupgroups::scanner::Hasher;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const HI_SHA256: &str = "8f434346648f6b96df89dda901c5176b10a6d83961dd3c1ac88b59b2dc327aa4";

fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

fn sha256_hex(content: &[u8]) -> String {
    Hasher::new().hash_bytes(content).to_hex()
}

/// Command running inside `dir`, isolated from user config and environment.
fn dupgroups(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dupgroups").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("no-config"))
        .env_remove("RUST_LOG");
    for var in [
        "DUPGROUPS_ESCAPE",
        "DUPGROUPS_DELIMITER",
        "DUPGROUPS_COMMENT_MARKER",
        "DUPGROUPS_ALGORITHM",
        "DUPGROUPS_BUFFER_SIZE",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_single_file_root() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"hi");

    dupgroups(&dir)
        .arg("a.txt")
        .assert()
        .success()
        .stdout(format!("{HI_SHA256}|a.txt\n"))
        .stderr(predicate::str::contains("#Reading arg: a.txt"));
}

#[test]
fn test_same_content_in_two_roots() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("x/1.txt"), b"hi");
    write_file(&dir.path().join("y/1.txt"), b"hi");

    dupgroups(&dir)
        .args(["y", "x"])
        .assert()
        .success()
        .stdout(format!("{HI_SHA256}|x/1.txt|y/1.txt\n"));
}

#[test]
fn test_distinct_files_are_separate_lines_ordered_by_path() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("b.txt"), b"b");
    write_file(&dir.path().join("a.txt"), b"a");

    let expected = format!("{}|a.txt\n{}|b.txt\n", sha256_hex(b"a"), sha256_hex(b"b"));
    dupgroups(&dir)
        .args(["b.txt", "a.txt"])
        .assert()
        .success()
        .stdout(expected);
}

#[cfg(unix)]
#[test]
fn test_delimiter_in_path_is_escaped() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a|b.txt"), b"hi");

    dupgroups(&dir)
        .arg("a|b.txt")
        .assert()
        .success()
        .stdout(format!("{HI_SHA256}|a\\|b.txt\n"));
}

#[test]
fn test_custom_markers() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a,b.txt"), b"hi");

    dupgroups(&dir)
        .args(["--delimiter", ",", "--escape", "~", "a,b.txt"])
        .assert()
        .success()
        .stdout(format!("{HI_SHA256},a~,b.txt\n"));
}

#[test]
fn test_progress_lines_go_to_stderr() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("d/sub/f.txt"), b"hi");

    let assert = dupgroups(&dir).arg("d").assert().success();
    let output = assert.get_output();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().all(|l| !l.starts_with('#')));

    let stderr = String::from_utf8_lossy(&output.stderr);
    let comments: Vec<&str> = stderr.lines().filter(|l| l.starts_with('#')).collect();
    assert_eq!(
        comments,
        vec![
            "#Reading arg: d",
            "#- Found directory: d",
            "#- Found directory: d/sub",
            "#- Files found for arg: 1",
            "#- Calculating hashes.",
        ]
    );
}

#[test]
fn test_quiet_silences_progress() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"hi");

    dupgroups(&dir)
        .args(["--quiet", "a.txt"])
        .assert()
        .success()
        .stdout(format!("{HI_SHA256}|a.txt\n"))
        .stderr("");
}

#[test]
fn test_output_file_with_progress_on_stdout() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"hi");

    let assert = dupgroups(&dir)
        .args(["--output", "report.txt", "--progress-to-stdout", "a.txt"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    assert!(!stdout.is_empty());
    assert!(stdout.lines().all(|l| l.starts_with('#')));

    let report = fs::read_to_string(dir.path().join("report.txt")).unwrap();
    assert_eq!(report, format!("{HI_SHA256}|a.txt\n"));
}

#[test]
fn test_progress_to_stdout_requires_output() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"hi");

    dupgroups(&dir)
        .args(["--progress-to-stdout", "a.txt"])
        .assert()
        .code(2)
        .stdout("")
        .stderr(predicate::str::contains("--output"));
}

#[test]
fn test_progress_to_stdout_with_dash_output_keeps_stdout_clean() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"hi");

    dupgroups(&dir)
        .args(["--output", "-", "--progress-to-stdout", "a.txt"])
        .assert()
        .success()
        .stdout(format!("{HI_SHA256}|a.txt\n"))
        .stderr(predicate::str::contains("#Reading arg: a.txt"));
}

#[test]
fn test_no_roots_gives_empty_report() {
    let dir = tempdir().unwrap();

    dupgroups(&dir).assert().success().stdout("");
}

#[test]
fn test_missing_root_is_not_fatal() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"hi");

    dupgroups(&dir)
        .args(["absent", "a.txt"])
        .assert()
        .success()
        .stdout(format!("{HI_SHA256}|a.txt\n"));
}

#[test]
fn test_runs_are_idempotent() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("t/a.txt"), b"one");
    write_file(&dir.path().join("t/b/c.txt"), b"one");
    write_file(&dir.path().join("t/b/d.txt"), b"two");

    let first = dupgroups(&dir).arg("t").assert().success().get_output().stdout.clone();
    let second = dupgroups(&dir).arg("t").assert().success().get_output().stdout.clone();

    assert_eq!(first, second);
    assert_eq!(String::from_utf8(first).unwrap().lines().count(), 2);
}

#[test]
fn test_unknown_algorithm_fails_before_scanning() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"hi");

    dupgroups(&dir)
        .env("DUPGROUPS_ALGORITHM", "md5")
        .arg("a.txt")
        .assert()
        .code(2)
        .stdout("")
        .stderr(predicate::str::contains("[DG002] Error:"))
        .stderr(predicate::str::contains("md5"))
        .stderr(predicate::str::contains("#Reading arg").not());
}

#[test]
fn test_empty_delimiter_rejected() {
    let dir = tempdir().unwrap();

    dupgroups(&dir)
        .args(["--delimiter", "", "."])
        .assert()
        .code(2)
        .stdout("")
        .stderr(predicate::str::contains("delimiter must not be empty"));
}

#[test]
fn test_double_colon_delimiter() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"hi");

    dupgroups(&dir)
        .args(["--delimiter", "::", "a.txt"])
        .assert()
        .success()
        .stdout(format!("{HI_SHA256}::a.txt\n"))
        .stderr(predicate::str::contains("cannot be split back"));
}

#[cfg(unix)]
#[test]
fn test_double_colon_in_path_gets_escaped() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("x::y"), b"hi");

    dupgroups(&dir)
        .args(["--delimiter", "::", "x::y"])
        .assert()
        .success()
        .stdout(format!("{HI_SHA256}::x\\::y\n"));
}

#[test]
fn test_same_marker_for_escape_and_delimiter_runs() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"hi");

    dupgroups(&dir)
        .args(["--escape", "|", "--delimiter", "|", "a.txt"])
        .assert()
        .success()
        .stdout(format!("{HI_SHA256}|a.txt\n"));
}

#[test]
fn test_json_errors() {
    let dir = tempdir().unwrap();

    let assert = dupgroups(&dir)
        .args(["--json-errors", "--delimiter", "", "."])
        .assert()
        .code(2);

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    let json: serde_json::Value = serde_json::from_str(stderr.trim()).unwrap();
    assert_eq!(json["code"], "DG002");
    assert_eq!(json["exit_code"], 2);
}

#[test]
fn test_missing_config_file() {
    let dir = tempdir().unwrap();

    dupgroups(&dir)
        .args(["--config", "nope.toml", "."])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_unwritable_output_is_general_error() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"hi");

    dupgroups(&dir)
        .args(["--output", "missing/dir/report.txt", "a.txt"])
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("[DG001] Error:"));
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_fails_without_report() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    write_file(&dir.path().join("t/ok.txt"), b"fine");
    let secret = dir.path().join("t/secret.txt");
    write_file(&secret, b"secret");
    fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read(&secret).is_ok() {
        // Root ignores file modes. error_tests::test_vanished_file_aborts_scan
        // covers the fatal path without relying on them.
        eprintln!("skipping test_unreadable_file_fails_without_report: file still readable");
        return;
    }

    let assert = dupgroups(&dir)
        .args(["--output", "report.txt", "t"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("[DG003] Error:"));
    let stdout = assert.get_output().stdout.clone();

    fs::set_permissions(&secret, fs::Permissions::from_mode(0o644)).unwrap();

    assert!(stdout.is_empty());
    assert!(!dir.path().join("report.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_leaves_stdout_empty() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let secret = dir.path().join("secret.txt");
    write_file(&secret, b"secret");
    fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read(&secret).is_ok() {
        eprintln!("skipping test_unreadable_file_leaves_stdout_empty: file still readable");
        return;
    }

    dupgroups(&dir)
        .arg("secret.txt")
        .assert()
        .code(3)
        .stdout("");

    fs::set_permissions(&secret, fs::Permissions::from_mode(0o644)).unwrap();
}

#[test]
fn test_help_and_version() {
    let dir = tempdir().unwrap();
    dupgroups(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--delimiter"));
    dupgroups(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dupgroups"));
}
