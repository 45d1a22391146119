//! File copy and write utilities.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::Path;

/// Copy a file byte-for-byte via buffered streaming.
///
/// Content moves through a fixed-size buffer, so sources larger than
/// available memory are fine. With `preserve_metadata`, permissions and
/// the modification time are carried over from the source after the
/// content copy completes.
pub fn copy_file(src: &Path, dst: &Path, preserve_metadata: bool) -> Result<()> {
    let mut reader =
        File::open(src).with_context(|| format!("Failed to open {}", src.display()))?;
    let mut writer =
        File::create(dst).with_context(|| format!("Failed to create {}", dst.display()))?;

    io::copy(&mut reader, &mut writer)
        .with_context(|| format!("Failed to copy {} to {}", src.display(), dst.display()))?;
    drop(writer);

    if preserve_metadata {
        copy_metadata(src, dst)?;
    }
    Ok(())
}

/// Copy permissions and modification time from `src` to `dst`.
pub fn copy_metadata(src: &Path, dst: &Path) -> Result<()> {
    let meta =
        fs::metadata(src).with_context(|| format!("Failed to stat {}", src.display()))?;

    fs::set_permissions(dst, meta.permissions())
        .with_context(|| format!("Failed to set permissions on {}", dst.display()))?;

    let modified = meta
        .modified()
        .with_context(|| format!("Failed to read mtime of {}", src.display()))?;
    let dst_file = File::options()
        .write(true)
        .open(dst)
        .with_context(|| format!("Failed to open {} for metadata update", dst.display()))?;
    dst_file
        .set_modified(modified)
        .with_context(|| format!("Failed to set mtime on {}", dst.display()))?;

    Ok(())
}

/// Write a file, creating parent directories as needed.
pub fn write_file_with_dirs<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, content: C) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
