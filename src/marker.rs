//! Version marker file (`releases/start_erl.data`).
//!
//! One line, two whitespace-separated tokens: runtime version, release
//! version. Written while packing, read back at install time to locate the
//! bundled runtime directory.

use crate::common::write_file_with_dirs;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// Marker location relative to the bundle root.
pub const START_ERL_DATA: &str = "releases/start_erl.data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMarker {
    pub erts_version: String,
    pub release_version: String,
}

impl VersionMarker {
    /// Parse a marker file. Token order is fixed: runtime version first.
    pub fn read_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read version marker {}", path.display()))?;
        let mut tokens = content.split_whitespace();
        let (Some(erts_version), Some(release_version)) = (tokens.next(), tokens.next()) else {
            bail!(
                "Malformed version marker {}: expected '<erts_version> <release_version>'",
                path.display()
            );
        };
        Ok(Self {
            erts_version: erts_version.to_string(),
            release_version: release_version.to_string(),
        })
    }

    /// Write the marker, creating parent directories as needed.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        write_file_with_dirs(path, format!("{} {}\n", self.erts_version, self.release_version))
    }
}
