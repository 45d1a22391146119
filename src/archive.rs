//! Gzip tar extraction and repacking for release bundles.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::env;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Extract a gzip-compressed tar archive into `dest`, preserving relative
/// entry paths. `dest` is created if missing.
pub fn extract(archive: &Path, dest: &Path) -> Result<()> {
    let file =
        File::open(archive).with_context(|| format!("Failed to open {}", archive.display()))?;
    fs::create_dir_all(dest).with_context(|| format!("Failed to create {}", dest.display()))?;

    let mut tar = tar::Archive::new(GzDecoder::new(file));
    tar.unpack(dest)
        .with_context(|| format!("Failed to extract {}", archive.display()))?;
    Ok(())
}

/// Overwrite `archive` with a gzip-compressed tar of the bundle's fixed
/// top-level entry set under `root`: `bin`, the versioned runtime
/// directory, `releases`, `lib`.
///
/// Entries are added with the process cwd switched to `root` so archive
/// paths stay relative; the previous cwd is restored on every exit path.
pub fn repack(archive: &Path, root: &Path, erts_version: &str) -> Result<()> {
    // Open the output before changing directory so a relative archive path
    // still resolves against the caller's cwd.
    let file =
        File::create(archive).with_context(|| format!("Failed to create {}", archive.display()))?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

    let _cwd = ScopedCwd::enter(root)?;

    let runtime_dir = format!("erts-{erts_version}");
    for entry in ["bin", runtime_dir.as_str(), "releases", "lib"] {
        builder
            .append_dir_all(entry, entry)
            .with_context(|| format!("Failed to archive {entry}"))?;
    }

    let encoder = builder
        .into_inner()
        .with_context(|| format!("Failed to finalize {}", archive.display()))?;
    encoder
        .finish()
        .with_context(|| format!("Failed to compress {}", archive.display()))?;
    Ok(())
}

/// Scoped change of the process working directory.
///
/// Restores the previous cwd in `Drop`, so early returns and error paths
/// cannot leave the process stranded in the archive root.
struct ScopedCwd {
    previous: PathBuf,
}

impl ScopedCwd {
    fn enter(dir: &Path) -> Result<Self> {
        let previous = env::current_dir().context("Failed to read current directory")?;
        env::set_current_dir(dir)
            .with_context(|| format!("Failed to change directory to {}", dir.display()))?;
        Ok(Self { previous })
    }
}

impl Drop for ScopedCwd {
    fn drop(&mut self) {
        let _ = env::set_current_dir(&self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn make_bundle_tree(root: &Path, erts_version: &str) {
        for dir in ["bin", "releases", "lib"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        let erts_bin = root.join(format!("erts-{erts_version}")).join("bin");
        fs::create_dir_all(&erts_bin).unwrap();
        fs::write(erts_bin.join("epmd"), "epmd binary").unwrap();
        fs::write(root.join("bin/start.boot"), "boot image").unwrap();
        fs::write(root.join("releases/start_erl.data"), "5.3 1.0\n").unwrap();
        fs::write(root.join("lib/app.txt"), "lib content").unwrap();
    }

    #[test]
    #[serial]
    fn test_repack_then_extract_round_trip() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("tree");
        fs::create_dir_all(&root).unwrap();
        make_bundle_tree(&root, "5.3");
        // Content outside the fixed entry set must not be archived.
        fs::write(root.join("stray.txt"), "not packed").unwrap();

        let archive = dir.path().join("bundle.tar.gz");
        repack(&archive, &root, "5.3").unwrap();

        let out = dir.path().join("out");
        extract(&archive, &out).unwrap();

        assert_eq!(fs::read_to_string(out.join("bin/start.boot")).unwrap(), "boot image");
        assert_eq!(
            fs::read_to_string(out.join("erts-5.3/bin/epmd")).unwrap(),
            "epmd binary"
        );
        assert_eq!(
            fs::read_to_string(out.join("releases/start_erl.data")).unwrap(),
            "5.3 1.0\n"
        );
        assert!(out.join("lib/app.txt").exists());
        assert!(!out.join("stray.txt").exists());
    }

    #[test]
    #[serial]
    fn test_repack_restores_cwd() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("tree");
        fs::create_dir_all(&root).unwrap();
        make_bundle_tree(&root, "5.3");

        let before = env::current_dir().unwrap();
        repack(&dir.path().join("bundle.tar.gz"), &root, "5.3").unwrap();
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    #[serial]
    fn test_repack_restores_cwd_on_failure() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("tree");
        // Only `bin` exists; archiving the runtime dir fails partway.
        fs::create_dir_all(root.join("bin")).unwrap();

        let before = env::current_dir().unwrap();
        let err = repack(&dir.path().join("bundle.tar.gz"), &root, "5.3").unwrap_err();
        assert!(err.to_string().contains("erts-5.3"));
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_extract_missing_archive_fails() {
        let dir = TempDir::new().unwrap();
        let err = extract(&dir.path().join("absent.tar.gz"), &dir.path().join("out")).unwrap_err();
        assert!(err.to_string().contains("absent.tar.gz"));
    }

    #[test]
    fn test_extract_corrupt_archive_fails() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("bad.tar.gz");
        fs::write(&archive, "this is not gzip data").unwrap();
        let err = extract(&archive, &dir.path().join("out")).unwrap_err();
        assert!(err.to_string().contains("Failed to extract"));
    }
}
