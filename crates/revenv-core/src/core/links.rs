use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::report::{ActionKind, Report};

/// Members of the `local/` symlink farm some distributions ship; each is
/// expected to point one level up at its namesake.
const FARM_MEMBERS: [&str; 3] = ["bin", "lib", "include"];

/// Repair the optional `local/{bin,lib,include}` farm so its relative links
/// stay internally consistent. Missing `local/` is a no-op; correct links and
/// non-symlink entries are left untouched.
pub fn update_local(root: &Path, report: &mut Report) -> Result<()> {
    let local_dir = root.join("local");
    if !local_dir.is_dir() {
        return Ok(());
    }

    for name in FARM_MEMBERS {
        let link = local_dir.join(name);
        let expected = Path::new("..").join(name);
        let Ok(meta) = fs::symlink_metadata(&link) else {
            continue;
        };
        if !meta.file_type().is_symlink() {
            continue;
        }
        let target = fs::read_link(&link)
            .with_context(|| format!("failed to read symlink {}", link.display()))?;
        if target == expected {
            continue;
        }
        fs::remove_file(&link)
            .with_context(|| format!("failed to remove symlink {}", link.display()))?;
        symlink(&expected, &link).with_context(|| {
            format!(
                "failed to create symlink {} -> {}",
                link.display(),
                expected.display()
            )
        })?;
        report.record(ActionKind::LinkUpdated, &link);
    }
    Ok(())
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn symlink(_target: &Path, _link: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "symlink farms are only supported on POSIX systems",
    ))
}
