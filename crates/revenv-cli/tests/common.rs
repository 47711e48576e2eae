#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const OLD_PREFIX: &str = "/old/env";

/// Build a minimal POSIX virtualenv shaped like the layouts revenv supports:
/// `bin/python`, activation scripts in three dialects, a console script, and
/// a versioned lib tree with stale bytecode caches.
pub fn make_venv(prefix: &str) -> (TempDir, PathBuf) {
    let temp = tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("tempdir");
    let root = temp.path().join("venv");

    let bin = root.join("bin");
    fs::create_dir_all(&bin).expect("bin dir");
    fs::write(bin.join("python"), b"\x7fELF\x02\x01\x01\x00").expect("python marker");
    fs::write(
        bin.join("activate"),
        format!(
            "# This file must be used with \"source bin/activate\"\nVIRTUAL_ENV=\"{OLD_PREFIX}\"\nexport VIRTUAL_ENV\n"
        ),
    )
    .expect("activate");
    fs::write(
        bin.join("activate.csh"),
        format!("setenv VIRTUAL_ENV \"{OLD_PREFIX}\"\n"),
    )
    .expect("activate.csh");
    fs::write(
        bin.join("activate.fish"),
        format!("set -gx VIRTUAL_ENV \"{OLD_PREFIX}\"\n"),
    )
    .expect("activate.fish");
    fs::write(
        bin.join("console-tool"),
        format!("#!{OLD_PREFIX}/bin/python -O\nimport sys\nsys.exit(0)\n"),
    )
    .expect("console script");
    fs::write(
        bin.join("portable-tool"),
        "#!/usr/bin/env python\nprint('portable')\n",
    )
    .expect("portable script");

    let site = root.join("lib/python3.11/site-packages/__pycache__");
    fs::create_dir_all(&site).expect("lib tree");
    fs::write(site.join("mod.cpython-311.pyc"), b"stale").expect("pyc");
    fs::write(site.join("mod.pyo"), b"stale").expect("pyo");
    fs::write(root.join("lib/python3.11/site-packages/mod.py"), b"x = 1\n").expect("source");

    (temp, root)
}

pub fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).expect("read file")
}

#[cfg(unix)]
pub fn add_link_farm(root: &Path) {
    use std::os::unix::fs::symlink;
    let local = root.join("local");
    fs::create_dir_all(&local).expect("local dir");
    symlink("../wrong", local.join("bin")).expect("bin link");
    symlink("../lib", local.join("lib")).expect("lib link");
    symlink("../include", local.join("include")).expect("include link");
}
