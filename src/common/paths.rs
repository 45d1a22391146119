//! Directory creation and removal utilities.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(())
}

/// Recursively delete a directory and everything under it.
///
/// Entries are removed depth-first, children before their parent
/// directory. The first entry that cannot be deleted aborts the whole
/// operation; already-deleted entries stay deleted.
pub fn remove_tree(path: &Path) -> Result<()> {
    for entry in WalkDir::new(path).contents_first(true) {
        let entry =
            entry.with_context(|| format!("Failed to walk {}", path.display()))?;
        if entry.file_type().is_dir() {
            fs::remove_dir(entry.path())
                .with_context(|| format!("Failed to remove {}", entry.path().display()))?;
        } else {
            fs::remove_file(entry.path())
                .with_context(|| format!("Failed to remove {}", entry.path().display()))?;
        }
    }
    Ok(())
}
