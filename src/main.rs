//! Relpack - standalone release bundle packager.
//!
//! Assembles a minimal runtime bundle from a release descriptor and
//! installs such bundles into a target root directory.

mod archive;
mod commands;
mod common;
mod config;
mod descriptor;
mod install;
mod marker;
mod pack;
mod process;
mod subst;
mod systools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use config::Config;

#[derive(Parser)]
#[command(name = "relpack")]
#[command(about = "Standalone release bundle packager")]
#[command(
    after_help = "QUICK START:\n  relpack pack myrel.rel          Build myrel.tar.gz\n  relpack install myrel /opt/app  Install a bundle\n  relpack preflight               Check the external toolchain"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a release bundle from a release descriptor (.rel)
    Pack {
        /// Path to the release descriptor
        rel_file: PathBuf,
    },

    /// Install a bundle into a target root directory
    Install {
        /// Bundle stem (path without the .tar.gz extension)
        bundle: PathBuf,
        /// Target root directory
        root: PathBuf,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },

    /// Check the external toolchain before a build
    Preflight {
        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env if present
    dotenvy::dotenv().ok();
    let base_dir = std::env::current_dir()?;
    let config = Config::load(&base_dir);

    match cli.command {
        Commands::Pack { rel_file } => {
            commands::cmd_pack(&rel_file, &config)?;
        }

        Commands::Install { bundle, root } => {
            commands::cmd_install(&bundle, &root, &config)?;
        }

        Commands::Show { what } => {
            let show_target = match what {
                ShowTarget::Config => commands::show::ShowTarget::Config,
            };
            commands::cmd_show(show_target, &config)?;
        }

        Commands::Preflight { strict } => {
            commands::cmd_preflight(&config, strict)?;
        }
    }

    Ok(())
}
