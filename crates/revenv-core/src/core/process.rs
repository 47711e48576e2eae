use std::process::{Command, Stdio};

use anyhow::{Context, Result};

/// Execute a program with inherited stdio and an explicit environment.
///
/// The child sees only the `envs` snapshot; nothing from the ambient process
/// environment leaks through.
///
/// # Errors
///
/// Returns an error when the program cannot be spawned.
pub fn run_command_passthrough(
    program: &str,
    args: &[String],
    envs: &[(String, String)],
) -> Result<i32> {
    let mut command = Command::new(program);
    command.args(args);
    command.env_clear();
    for (key, value) in envs {
        command.env(key, value);
    }
    command.stdin(Stdio::inherit());
    command.stdout(Stdio::inherit());
    command.stderr(Stdio::inherit());

    let status = command
        .status()
        .with_context(|| format!("failed to start {program}"))?;
    Ok(status.code().unwrap_or(-1))
}
