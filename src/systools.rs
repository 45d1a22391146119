//! External toolchain collaborators.
//!
//! Boot-script generation, tar bundling, and release registration are the
//! Erlang toolchain's job, not ours. The default implementation drives
//! `erl -noshell -eval`; tests substitute fakes through the traits.

use crate::process::Cmd;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Generates `<stem>.script` / `<stem>.boot` from `<stem>.rel`.
pub trait ScriptGenerator {
    fn generate(&self, rel_stem: &Path) -> Result<()>;
}

/// Generates `<stem>.tar.gz` from `<stem>.rel` plus the runtime binaries.
pub trait TarGenerator {
    fn generate(&self, rel_stem: &Path) -> Result<()>;
}

/// Records an installed release in the target's release registry.
pub trait ReleaseRegistry {
    fn register(&self, root_dir: &Path, rel_file: &Path) -> Result<()>;
}

/// Default collaborator backed by the `systools` and `release_handler`
/// modules of an installed Erlang runtime.
#[derive(Debug)]
pub struct ErlSystools {
    program: PathBuf,
}

impl ErlSystools {
    /// Resolve the runtime program on PATH.
    pub fn new(program: &str) -> Result<Self> {
        let program = which::which(program).with_context(|| {
            format!(
                "Could not find '{program}' in PATH.\n\
                 Install the Erlang runtime, or set ERL_PROGRAM in .env or\n\
                 the environment to the runtime binary."
            )
        })?;
        Ok(Self { program })
    }

    /// Split a rel stem path into its directory and file stem.
    fn split_stem(rel_stem: &Path) -> Result<(&Path, &str)> {
        let dir = match rel_stem.parent() {
            Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
            Some(parent) => parent,
            None => Path::new("."),
        };
        let Some(stem) = rel_stem.file_name().and_then(|n| n.to_str()) else {
            bail!("Invalid release stem: {}", rel_stem.display());
        };
        Ok((dir, stem))
    }

    fn eval(&self, dir: &Path, expr: &str, error_msg: &str) -> Result<()> {
        Cmd::new(self.program.to_string_lossy())
            .args(["-noshell", "-eval", expr])
            .dir(dir)
            .error_msg(error_msg)
            .run()?;
        Ok(())
    }
}

impl ScriptGenerator for ErlSystools {
    fn generate(&self, rel_stem: &Path) -> Result<()> {
        let (dir, stem) = Self::split_stem(rel_stem)?;
        let expr = format!(
            "case systools:make_script(\"{stem}\", []) of \
             ok -> init:stop(); \
             Error -> io:format(standard_error, \"~p~n\", [Error]), halt(1) end."
        );
        self.eval(dir, &expr, &format!("systools:make_script failed for {stem}"))
    }
}

impl TarGenerator for ErlSystools {
    fn generate(&self, rel_stem: &Path) -> Result<()> {
        let (dir, stem) = Self::split_stem(rel_stem)?;
        let expr = format!(
            "case systools:make_tar(\"{stem}\", [{{erts, code:root_dir()}}]) of \
             ok -> init:stop(); \
             Error -> io:format(standard_error, \"~p~n\", [Error]), halt(1) end."
        );
        self.eval(dir, &expr, &format!("systools:make_tar failed for {stem}"))
    }
}

impl ReleaseRegistry for ErlSystools {
    fn register(&self, root_dir: &Path, rel_file: &Path) -> Result<()> {
        let root = root_dir.display();
        let expr = format!(
            "case release_handler:create_RELEASES(\"{root}\", \"{root}/releases\", \"{}\", []) of \
             ok -> init:stop(); \
             Error -> io:format(standard_error, \"~p~n\", [Error]), halt(1) end.",
            rel_file.display()
        );
        self.eval(root_dir, &expr, "release_handler:create_RELEASES failed")
    }
}
