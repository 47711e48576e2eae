use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::json;
use tracing::debug;

use crate::core::layout::find_version_tag;
use crate::core::outcome::ExecutionOutcome;
use crate::core::process::run_command_passthrough;

/// Configuration-namespace prefix stripped from the child environment so
/// stale settings in the current process do not leak into the new
/// environment.
const RESERVED_ENV_PREFIX: &str = "VIRTUALENV_";

/// Marker file signaling the environment was created without system
/// site-packages.
const ISOLATION_MARKER: &str = "no-global-site-packages.txt";

#[derive(Debug, Clone)]
pub struct ReinitRequest {
    pub root: PathBuf,
    pub python: String,
}

/// Re-create interpreter-version-specific files by invoking the external
/// `virtualenv` tool against a substitute interpreter. The child runs
/// synchronously with inherited stdio; a nonzero exit becomes a failure
/// outcome.
pub fn reinitialize(request: &ReinitRequest) -> Result<ExecutionOutcome> {
    let lib_root = request.root.join("lib");
    if !lib_root.is_dir() {
        return Ok(ExecutionOutcome::user_error(
            format!("{} is not a virtualenv lib folder", lib_root.display()),
            json!({}),
        ));
    }
    let Some(version_tag) = find_version_tag(&lib_root) else {
        return Ok(ExecutionOutcome::user_error(
            format!(
                "could not detect python version of virtualenv {}",
                request.root.display()
            ),
            json!({}),
        ));
    };

    let lib_dir = lib_root.join(&version_tag);
    let args = virtualenv_args(&request.root, &lib_dir, &request.python)?;
    let envs = filtered_environment();
    debug!(?args, "invoking virtualenv");

    let code = run_command_passthrough("virtualenv", &args, &envs)?;
    if code != 0 {
        return Ok(ExecutionOutcome::failure(
            format!("virtualenv exited with status {code}"),
            json!({ "exit_code": code, "args": args }),
        ));
    }

    Ok(ExecutionOutcome::success(
        format!(
            "reinitialized {} with {}",
            request.root.display(),
            request.python
        ),
        json!({ "version_tag": version_tag, "args": args }),
    ))
}

fn virtualenv_args(root: &Path, lib_dir: &Path, python: &str) -> Result<Vec<String>> {
    let mut args = vec!["-p".to_string(), python.to_string()];
    if !lib_dir.join(ISOLATION_MARKER).is_file() {
        args.push("--system-site-packages".to_string());
    }
    if has_distribute_egg(lib_dir)? {
        args.push("--distribute".to_string());
    }
    args.push(root.display().to_string());
    Ok(args)
}

fn has_distribute_egg(lib_dir: &Path) -> Result<bool> {
    let entries = fs::read_dir(lib_dir)
        .with_context(|| format!("failed to list {}", lib_dir.display()))?;
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", lib_dir.display()))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with("distribute-") && name.ends_with(".egg") {
            return Ok(true);
        }
    }
    Ok(false)
}

fn filtered_environment() -> Vec<(String, String)> {
    filter_reserved(env::vars())
}

fn filter_reserved(vars: impl Iterator<Item = (String, String)>) -> Vec<(String, String)> {
    vars.filter(|(key, _)| !key.starts_with(RESERVED_ENV_PREFIX))
        .collect()
}
