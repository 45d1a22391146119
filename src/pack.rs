//! Bundle assembly pipeline.
//!
//! Turns a release descriptor into a standalone bundle: a gzip tar holding
//! a trimmed runtime, the release's boot scripts, and a version marker.
//! Every step is fatal on failure; the temporary workspace and generated
//! intermediates are removed only when the whole pipeline succeeds.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::archive;
use crate::common::{copy_file, prepare_work_dir, remove_tree};
use crate::config::Config;
use crate::descriptor::ReleaseDescriptor;
use crate::marker::{VersionMarker, START_ERL_DATA};
use crate::systools::{ScriptGenerator, TarGenerator};

/// Stem of the minimal descriptor written beside the source descriptor.
const MINIMAL_STEM: &str = "plain";

/// Launchers removed from the bundled runtime's bin directory. The bundle
/// ships substituted launcher scripts instead (written at install time).
const RUNTIME_LAUNCHERS: &[&str] = &["erl", "start"];

/// Support executables copied from the runtime bin directory into `bin/`.
const RUNTIME_SUPPORT: &[&str] = &["epmd", "run_erl", "to_erl"];

/// Assemble `<name>.tar.gz` from `<name>.rel`. Returns the bundle path.
pub fn create_bundle(
    rel_file: &Path,
    config: &Config,
    scripts: &dyn ScriptGenerator,
    tars: &dyn TarGenerator,
) -> Result<PathBuf> {
    let dir = match rel_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let Some(stem) = rel_file.file_stem().and_then(|s| s.to_str()) else {
        bail!("Invalid release descriptor path: {}", rel_file.display());
    };

    println!("Reading release descriptor {}...", rel_file.display());
    let descriptor = ReleaseDescriptor::from_file(rel_file)?;

    let minimal = descriptor.minimal(MINIMAL_STEM);
    minimal.write_to(&dir.join(format!("{MINIMAL_STEM}.rel")))?;

    println!("Generating boot scripts...");
    scripts.generate(&dir.join(MINIMAL_STEM))?;
    scripts.generate(&dir.join(stem))?;

    println!("Generating {stem}.tar.gz...");
    tars.generate(&dir.join(stem))?;
    let archive_path = dir.join(format!("{stem}.tar.gz"));
    if !archive_path.exists() {
        bail!(
            "Tar generation reported success but {} was not produced",
            archive_path.display()
        );
    }

    println!("Repackaging bundle...");
    let work_dir = prepare_work_dir(dir, &config.work_dir_name)?;
    archive::extract(&archive_path, &work_dir)?;

    let erts_bin = work_dir
        .join(format!("erts-{}", descriptor.erts_version))
        .join("bin");
    for launcher in RUNTIME_LAUNCHERS {
        let path = erts_bin.join(launcher);
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove launcher {}", path.display()))?;
    }

    let top_bin = work_dir.join("bin");
    fs::create_dir_all(&top_bin)
        .with_context(|| format!("Failed to create {}", top_bin.display()))?;
    copy_file(
        &dir.join(format!("{MINIMAL_STEM}.boot")),
        &top_bin.join("start.boot"),
        false,
    )?;
    for name in RUNTIME_SUPPORT {
        copy_file(&erts_bin.join(name), &top_bin.join(name), true)?;
    }

    let marker = VersionMarker {
        erts_version: descriptor.erts_version.clone(),
        release_version: descriptor.version.clone(),
    };
    marker.write_to(&work_dir.join(START_ERL_DATA))?;

    archive::repack(&archive_path, &work_dir, &descriptor.erts_version)?;

    println!("Cleaning up...");
    remove_tree(&work_dir)?;
    for name in [
        format!("{MINIMAL_STEM}.rel"),
        format!("{MINIMAL_STEM}.script"),
        format!("{MINIMAL_STEM}.boot"),
        format!("{stem}.script"),
        format!("{stem}.boot"),
    ] {
        let path = dir.join(name);
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove {}", path.display()))?;
    }

    println!("Bundle created at {}", archive_path.display());
    Ok(archive_path)
}
