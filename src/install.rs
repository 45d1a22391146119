//! Bundle installation into a target root directory.
//!
//! Extracts a previously packed bundle, resolves the bundled runtime from
//! the version marker, and materializes the launcher scripts from their
//! `.src` templates with the install root substituted in.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use crate::archive;
use crate::common::copy_metadata;
use crate::marker::{VersionMarker, START_ERL_DATA};
use crate::subst::substitute;
use crate::systools::ReleaseRegistry;

/// Emulator name substituted for `%EMU%` in launcher templates.
const EMU: &str = "beam";

/// Launcher templates shipped as `<name>.src` in the runtime bin directory.
const LAUNCHER_TEMPLATES: &[&str] = &["erl", "start", "start_erl"];

/// Install `<stem>.tar.gz` into `root_dir` and register the release.
pub fn install_bundle(
    bundle_stem: &Path,
    root_dir: &Path,
    registry: &dyn ReleaseRegistry,
) -> Result<()> {
    let Some(stem) = bundle_stem.file_name().and_then(|n| n.to_str()) else {
        bail!("Invalid bundle stem: {}", bundle_stem.display());
    };
    let archive_path = match bundle_stem.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(format!("{stem}.tar.gz")),
        _ => Path::new(".").join(format!("{stem}.tar.gz")),
    };
    let Some(root_str) = root_dir.to_str() else {
        bail!("Install root is not valid UTF-8: {}", root_dir.display());
    };

    println!("Extracting {}...", archive_path.display());
    archive::extract(&archive_path, root_dir)?;

    let marker = VersionMarker::read_from(&root_dir.join(START_ERL_DATA))?;
    let erts_bin = root_dir
        .join(format!("erts-{}", marker.erts_version))
        .join("bin");
    let bin_dir = root_dir.join("bin");
    fs::create_dir_all(&bin_dir)
        .with_context(|| format!("Failed to create {}", bin_dir.display()))?;

    println!("Installing launcher scripts...");
    let vars = [("FINAL_ROOTDIR", root_str), ("EMU", EMU)];
    for name in LAUNCHER_TEMPLATES {
        let template = erts_bin.join(format!("{name}.src"));
        let content = fs::read_to_string(&template)
            .with_context(|| format!("Failed to read launcher template {}", template.display()))?;
        let target = bin_dir.join(name);
        fs::write(&target, substitute(&content, &vars))
            .with_context(|| format!("Failed to write {}", target.display()))?;
        copy_metadata(&template, &target)?;
    }

    println!("Registering release...");
    registry.register(root_dir, &root_dir.join("releases").join(format!("{stem}.rel")))?;

    println!("Installed {} into {}", stem, root_dir.display());
    Ok(())
}
