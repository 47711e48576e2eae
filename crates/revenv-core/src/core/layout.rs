use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static VERSION_DIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^python\d+\.\d+$").expect("version pattern"));

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("no versioned python directory under {}", .0.display())]
    MissingVersionDir(PathBuf),
    #[error("missing bin directory at {}", .0.display())]
    MissingBinDir(PathBuf),
    #[error("missing python interpreter at {}", .0.display())]
    MissingInterpreter(PathBuf),
}

/// Resolved shape of a supported POSIX virtualenv.
#[derive(Debug, Clone)]
pub struct EnvLayout {
    pub root: PathBuf,
    pub bin_dir: PathBuf,
    pub lib_dir: PathBuf,
    pub version_tag: String,
}

impl EnvLayout {
    /// Inspect `root` and resolve the `bin/` and `lib/python<tag>/`
    /// directories. Detection never mutates the tree.
    pub fn detect(root: &Path) -> Result<Self, LayoutError> {
        let bin_dir = root.join("bin");
        let lib_root = root.join("lib");

        let Some(version_tag) = find_version_tag(&lib_root) else {
            return Err(LayoutError::MissingVersionDir(lib_root));
        };
        if !bin_dir.is_dir() {
            return Err(LayoutError::MissingBinDir(bin_dir));
        }
        let interpreter = bin_dir.join("python");
        if !interpreter.is_file() {
            return Err(LayoutError::MissingInterpreter(interpreter));
        }

        let lib_dir = lib_root.join(&version_tag);
        Ok(Self {
            root: root.to_path_buf(),
            bin_dir,
            lib_dir,
            version_tag,
        })
    }
}

/// First `python<major>.<minor>` entry under `lib_root`, in directory-listing
/// order. Multiple matches are not disambiguated.
#[must_use]
pub fn find_version_tag(lib_root: &Path) -> Option<String> {
    let entries = fs::read_dir(lib_root).ok()?;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if VERSION_DIR_RE.is_match(name) {
            return Some(name.to_string());
        }
    }
    None
}
