use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::core::report::{ActionKind, Report};

/// Shell-sourced files that assign VIRTUAL_ENV instead of carrying a shebang.
const ACTIVATION_SCRIPTS: [&str; 3] = ["activate", "activate.csh", "activate.fish"];

/// The one indirect interpreter form that must never be rewritten.
const ENV_PYTHON: &[u8] = b"/usr/bin/env python";

static ACTIVATION_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:set -gx |setenv |)VIRTUAL_ENV[ =]"(.*?)"\s*$"#).expect("activation pattern")
});

/// Rewrite every direct child of `bin_dir` that embeds the old prefix.
/// Traversal is non-recursive; files without an embedded path are untouched.
pub fn update_scripts(bin_dir: &Path, new_prefix: &Path, report: &mut Report) -> Result<()> {
    for entry in
        fs::read_dir(bin_dir).with_context(|| format!("failed to list {}", bin_dir.display()))?
    {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", bin_dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name();
        if name
            .to_str()
            .is_some_and(|name| ACTIVATION_SCRIPTS.contains(&name))
        {
            update_activation_script(&path, new_prefix, report)?;
        } else {
            update_script(&path, new_prefix, report)?;
        }
    }
    Ok(())
}

fn update_activation_script(path: &Path, new_prefix: &Path, report: &mut Report) -> Result<()> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let mut changed = false;
    let mut rewritten = String::with_capacity(contents.len());
    for line in contents.split_inclusive('\n') {
        match rewrite_virtual_env_line(line, new_prefix) {
            Some(new_line) if new_line != line => {
                rewritten.push_str(&new_line);
                changed = true;
            }
            _ => rewritten.push_str(line),
        }
    }

    if changed {
        fs::write(path, rewritten)
            .with_context(|| format!("failed to rewrite {}", path.display()))?;
        report.record(ActionKind::ActivationUpdated, path);
    }
    Ok(())
}

/// Replace only the quoted path payload of a VIRTUAL_ENV assignment. Every
/// character outside the capture span survives verbatim, so quoting, the
/// dialect keyword, and trailing whitespace are preserved.
fn rewrite_virtual_env_line(line: &str, new_prefix: &Path) -> Option<String> {
    let caps = ACTIVATION_PATH_RE.captures(line)?;
    let span = caps.get(1)?;
    let mut out = String::with_capacity(line.len());
    out.push_str(&line[..span.start()]);
    out.push_str(&new_prefix.to_string_lossy());
    out.push_str(&line[span.end()..]);
    Some(out)
}

/// Rewrite the interpreter directive of a generic script. The first line is
/// inspected at the byte level, so binary payloads after the directive (or
/// outright binary files) never fail decoding.
fn update_script(path: &Path, new_prefix: &Path, report: &mut Report) -> Result<()> {
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if !data.starts_with(b"#!") {
        return Ok(());
    }

    let line_end = data
        .iter()
        .position(|&byte| byte == b'\n')
        .unwrap_or(data.len());
    let mut parts = data[2..line_end]
        .split(|byte: &u8| byte.is_ascii_whitespace())
        .filter(|part| !part.is_empty());
    let Some(interpreter) = parts.next() else {
        return Ok(());
    };
    if !interpreter.ends_with(b"/bin/python") || contains_env_python(interpreter) {
        return Ok(());
    }

    let new_bin = new_prefix.join("bin").join("python");
    let new_bin = new_bin.as_os_str().as_encoded_bytes();
    if interpreter == new_bin {
        return Ok(());
    }

    debug!(path = %path.display(), "rewriting interpreter directive");
    let mut rewritten = Vec::with_capacity(data.len());
    rewritten.extend_from_slice(b"#!");
    rewritten.extend_from_slice(new_bin);
    for arg in parts {
        rewritten.push(b' ');
        rewritten.extend_from_slice(arg);
    }
    rewritten.push(b'\n');
    if line_end < data.len() {
        rewritten.extend_from_slice(&data[line_end + 1..]);
    }

    fs::write(path, rewritten).with_context(|| format!("failed to rewrite {}", path.display()))?;
    report.record(ActionKind::ScriptUpdated, path);
    Ok(())
}

fn contains_env_python(interpreter: &[u8]) -> bool {
    interpreter
        .windows(ENV_PYTHON.len())
        .any(|window| window == ENV_PYTHON)
}
