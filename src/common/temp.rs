//! Temporary work directory management.

use super::paths::remove_tree;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Create a fresh work directory under `parent_dir`.
///
/// A leftover directory from an earlier aborted run is removed first, so
/// the returned directory is always empty.
pub fn prepare_work_dir(parent_dir: &Path, name: &str) -> Result<PathBuf> {
    let work_dir = parent_dir.join(name);

    if work_dir.exists() {
        remove_tree(&work_dir)?;
    }
    fs::create_dir_all(&work_dir)
        .with_context(|| format!("Failed to create {}", work_dir.display()))?;

    Ok(work_dir)
}
