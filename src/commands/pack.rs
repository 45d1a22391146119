//! Pack command - assembles a release bundle.

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::pack::create_bundle;
use crate::systools::ErlSystools;

/// Execute the pack command.
pub fn cmd_pack(rel_file: &Path, config: &Config) -> Result<()> {
    let toolchain = ErlSystools::new(&config.erl_program)?;
    create_bundle(rel_file, config, &toolchain, &toolchain)?;
    Ok(())
}
