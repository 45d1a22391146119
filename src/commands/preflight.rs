//! Preflight command - checks the external toolchain before a build.

use anyhow::{bail, Result};

use crate::config::Config;

/// Execute the preflight command.
pub fn cmd_preflight(config: &Config, strict: bool) -> Result<()> {
    println!("Checking external toolchain...");

    match which::which(&config.erl_program) {
        Ok(path) => {
            println!("  {}: {}", config.erl_program, path.display());
            println!("All checks passed.");
        }
        Err(_) => {
            println!("  {}: NOT FOUND", config.erl_program);
            println!("  Install the Erlang runtime, or set ERL_PROGRAM in .env.");
            if strict {
                bail!("Preflight failed: '{}' not found in PATH", config.erl_program);
            }
        }
    }
    Ok(())
}
