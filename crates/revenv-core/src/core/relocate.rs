use std::path::PathBuf;

use anyhow::Result;
use serde_json::json;
use tracing::debug;

use crate::core::layout::EnvLayout;
use crate::core::links::update_local;
use crate::core::outcome::ExecutionOutcome;
use crate::core::pyc::remove_pycs;
use crate::core::report::Report;
use crate::core::scripts::update_scripts;

#[derive(Debug, Clone)]
pub struct RelocateRequest {
    pub root: PathBuf,
    pub new_prefix: PathBuf,
}

/// Rewrite every embedded path in the environment at `root` to point at
/// `new_prefix`.
///
/// Validation failures (relative prefix, unrecognized layout) return a
/// user-error outcome before any file is touched. Stages run in a fixed
/// order with no rollback; a filesystem error in a later stage propagates
/// with earlier stages already applied, and the whole operation is safe to
/// re-run.
pub fn relocate(request: &RelocateRequest) -> Result<ExecutionOutcome> {
    if !request.new_prefix.is_absolute() {
        return Ok(ExecutionOutcome::user_error(
            format!("{} is not an absolute path", request.new_prefix.display()),
            json!({ "actions": [] }),
        ));
    }

    let layout = match EnvLayout::detect(&request.root) {
        Ok(layout) => layout,
        Err(err) => {
            return Ok(ExecutionOutcome::user_error(
                format!(
                    "{} does not refer to a python installation: {err}",
                    request.root.display()
                ),
                json!({ "actions": [] }),
            ));
        }
    };
    debug!(tag = %layout.version_tag, root = %layout.root.display(), "detected environment");

    let mut report = Report::new();
    update_scripts(&layout.bin_dir, &request.new_prefix, &mut report)?;
    remove_pycs(&layout.lib_dir, &mut report)?;
    update_local(&layout.root, &mut report)?;
    debug!(mutations = report.actions().len(), "relocation complete");

    Ok(ExecutionOutcome::success(
        format!(
            "relocated {} to prefix {}",
            layout.root.display(),
            request.new_prefix.display()
        ),
        report.to_details(),
    ))
}
