use std::fs;

use assert_cmd::assert::Assert;
use assert_cmd::cargo::cargo_bin_cmd;

mod common;

use common::make_venv;

fn stdout_of(assert: &Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).to_string()
}

/// Drop a `virtualenv` stub with a fixed exit status into `dir` and return a
/// PATH value that resolves it first.
#[cfg(unix)]
fn stub_virtualenv(dir: &std::path::Path, code: i32) -> String {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(dir).expect("stub dir");
    let stub = dir.join("virtualenv");
    fs::write(&stub, format!("#!/bin/sh\nexit {code}\n")).expect("stub script");
    fs::set_permissions(&stub, fs::Permissions::from_mode(0o755)).expect("stub perms");
    format!(
        "{}:{}",
        dir.display(),
        std::env::var("PATH").unwrap_or_default()
    )
}

#[test]
fn reinit_without_lib_folder_reports_user_error() {
    let temp = tempfile::tempdir().expect("tempdir");

    let assert = cargo_bin_cmd!("revenv")
        .current_dir(temp.path())
        .args(["--substitute-python", "/usr/bin/python3"])
        .assert()
        .code(1);
    assert!(stdout_of(&assert).contains("error: "));
    assert!(stdout_of(&assert).contains("is not a virtualenv lib folder"));
}

#[test]
fn reinit_without_version_tag_reports_user_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(temp.path().join("lib/site-packages")).expect("lib dir");

    let assert = cargo_bin_cmd!("revenv")
        .current_dir(temp.path())
        .args(["--substitute-python", "/usr/bin/python3"])
        .assert()
        .code(1);
    assert!(stdout_of(&assert).contains("could not detect python version"));
}

#[cfg(unix)]
#[test]
fn reinit_child_failure_maps_to_exit_code_2() {
    let (temp, root) = make_venv("revenv-child-fail-");
    let path = stub_virtualenv(&temp.path().join("stub-bin"), 9);

    let assert = cargo_bin_cmd!("revenv")
        .current_dir(&root)
        .env("PATH", &path)
        .args(["--substitute-python", "/usr/bin/python3"])
        .assert()
        .code(2);
    assert!(stdout_of(&assert).contains("error: virtualenv exited with status 9"));
}

#[cfg(unix)]
#[test]
fn reinit_child_success_reports_ok() {
    let (temp, root) = make_venv("revenv-child-ok-");
    let path = stub_virtualenv(&temp.path().join("stub-bin"), 0);

    cargo_bin_cmd!("revenv")
        .current_dir(&root)
        .env("PATH", &path)
        .args(["--substitute-python", "/usr/bin/python3"])
        .assert()
        .success();
}

#[cfg(unix)]
#[test]
fn worst_exit_code_wins_across_flows() {
    // Reinit fails through the child while the rewrite flow succeeds; the
    // process must exit with the worse of the two codes.
    let (temp, root) = make_venv("revenv-worst-code-");
    let path = stub_virtualenv(&temp.path().join("stub-bin"), 3);

    let assert = cargo_bin_cmd!("revenv")
        .current_dir(&root)
        .env("PATH", &path)
        .args([
            "--substitute-python",
            "/usr/bin/python3",
            "--update-path",
            "/srv/app/venv",
        ])
        .assert()
        .code(2);
    let stdout = stdout_of(&assert);
    assert!(stdout.contains("error: virtualenv exited with status 3"));
    assert!(stdout.contains("A "));
    assert_eq!(
        common::read(&root, "bin/activate.fish"),
        "set -gx VIRTUAL_ENV \"/srv/app/venv\"\n"
    );
}

#[test]
fn reinit_failure_still_runs_the_rewrite_flow() {
    // A lib/ tree without a versioned directory makes both flows fail before
    // any mutation; each must report its own error line.
    let (_temp, root) = make_venv("revenv-both-flows-");
    fs::remove_dir_all(root.join("lib/python3.11")).expect("drop versioned lib");

    let assert = cargo_bin_cmd!("revenv")
        .current_dir(&root)
        .args([
            "--substitute-python",
            "/usr/bin/python3",
            "--update-path",
            "/srv/app/venv",
        ])
        .assert()
        .code(1);
    let stdout = stdout_of(&assert);
    assert!(stdout.contains("could not detect python version"));
    assert!(stdout.contains("does not refer to a python installation"));
    assert_eq!(
        common::read(&root, "bin/activate.fish"),
        "set -gx VIRTUAL_ENV \"/old/env\"\n"
    );
}
