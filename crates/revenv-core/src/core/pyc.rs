use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::core::report::{ActionKind, Report};

/// Byte-compiled caches embed the absolute source path; deleting them forces
/// recompilation against the new prefix on next import.
const CACHE_SUFFIXES: [&str; 2] = [".pyc", ".pyo"];

/// Delete every bytecode-cache file anywhere beneath `lib_dir`.
pub fn remove_pycs(lib_dir: &Path, report: &mut Report) -> Result<()> {
    for entry in WalkDir::new(lib_dir) {
        let entry = entry.with_context(|| format!("failed to walk {}", lib_dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !CACHE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            continue;
        }
        fs::remove_file(entry.path())
            .with_context(|| format!("failed to remove {}", entry.path().display()))?;
        report.record(ActionKind::ArtifactRemoved, entry.path());
    }
    Ok(())
}
