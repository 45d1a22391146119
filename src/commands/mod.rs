//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `pack` - Assemble a release bundle
//! - `install` - Install a bundle into a root directory
//! - `show` - Display information
//! - `preflight` - Check the external toolchain

mod install;
mod pack;
mod preflight;
pub mod show;

pub use install::cmd_install;
pub use pack::cmd_pack;
pub use preflight::cmd_preflight;
pub use show::cmd_show;
