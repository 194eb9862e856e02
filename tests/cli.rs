//! CLI surface tests: flag validation, advice listing, and a
//! snippet run end to end through the binary.

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

#[test]
fn advice_list_names_advisors_and_exits_zero() {
    Command::cargo_bin("pyt")
        .unwrap()
        .arg("--advice-list")
        .assert()
        .success()
        .stdout(predicate::str::contains("mutable_default"))
        .stdout(predicate::str::contains("Warning: "));
}

#[test]
fn conflicting_sources_exit_nonzero_with_usage() {
    Command::cargo_bin("pyt")
        .unwrap()
        .args(["-c", "x = 1", "-f", "demo.py"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn snippet_run_prints_advice() {
    Command::cargo_bin("pyt")
        .unwrap()
        .args(["-c", "pet = 'cat'", "-o", "md", "-d", "brief"])
        .assert()
        .success()
        .stdout(predicate::str::contains("`pet` is a string"));
}

#[test]
fn file_run_reads_the_script() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let script = tmp.child("demo.py");
    script.write_str("mixed = {1: 'a', '1': 'b'}\n").unwrap();

    Command::cargo_bin("pyt")
        .unwrap()
        .args(["-o", "md", "-f"])
        .arg(script.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("`mixed`"));
}

#[test]
fn warnings_only_drops_plain_advice() {
    Command::cargo_bin("pyt")
        .unwrap()
        .args(["-c", "pet = 'cat'", "-o", "md", "--warnings-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("`pet` is a string").not());
}

#[test]
fn syntax_error_still_exits_zero_with_message() {
    Command::cargo_bin("pyt")
        .unwrap()
        .args(["-c", "def broken(:", "-o", "md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No advice sorry"));
}
