//! Install command - extracts a bundle into a root directory.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::install::install_bundle;
use crate::systools::ErlSystools;

/// Execute the install command.
pub fn cmd_install(bundle_stem: &Path, root_dir: &Path, config: &Config) -> Result<()> {
    let toolchain = ErlSystools::new(&config.erl_program)?;

    // Launcher scripts embed the root path, so resolve it up front.
    fs::create_dir_all(root_dir)
        .with_context(|| format!("Failed to create {}", root_dir.display()))?;
    let root_dir = root_dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", root_dir.display()))?;

    install_bundle(bundle_stem, &root_dir, &toolchain)?;
    Ok(())
}
