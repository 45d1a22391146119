//! Shared test utilities for relpack tests.

use anyhow::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use relpack::config::Config;
use relpack::systools::{ReleaseRegistry, ScriptGenerator, TarGenerator};
use std::cell::RefCell;
use std::fs::{self, File};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test environment rooted in a temporary directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Working directory for descriptors, bundles, and install roots
    pub dir: PathBuf,
}

impl TestEnv {
    /// Create a new test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            dir,
        }
    }

    /// Configuration with defaults, independent of the ambient environment.
    pub fn config(&self) -> Config {
        Config {
            erl_program: "erl".into(),
            work_dir_name: "relpack-tmp".into(),
        }
    }
}

/// Write a release descriptor file.
pub fn write_rel_file(
    path: &Path,
    name: &str,
    version: &str,
    erts_version: &str,
    applications: &[(&str, &str)],
) {
    let apps = applications
        .iter()
        .map(|(app, vsn)| format!("{{{app}, \"{vsn}\"}}"))
        .collect::<Vec<_>>()
        .join(", ");
    let text = format!(
        "{{release, {{\"{name}\", \"{version}\"}}, {{erts, \"{erts_version}\"}},\n [{apps}]}}.\n"
    );
    fs::write(path, text).expect("Failed to write rel file");
}

/// Write an executable file, creating parent directories.
pub fn write_executable(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(path, content).expect("Failed to write executable");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .expect("Failed to set permissions");
}

/// Pack every child of `staging` into a gzip tar at `archive`.
pub fn tar_up(staging: &Path, archive: &Path) {
    let file = File::create(archive).expect("Failed to create archive");
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for entry in fs::read_dir(staging).expect("Failed to read staging dir") {
        let entry = entry.expect("Failed to read staging entry");
        let name = PathBuf::from(entry.file_name());
        if entry.file_type().expect("Failed to stat entry").is_dir() {
            builder
                .append_dir_all(&name, entry.path())
                .expect("Failed to append dir");
        } else {
            builder
                .append_path_with_name(entry.path(), &name)
                .expect("Failed to append file");
        }
    }

    let encoder = builder.into_inner().expect("Failed to finalize tar");
    encoder.finish().expect("Failed to finish gzip");
}

/// Build an installable bundle at `<dir>/<stem>.tar.gz`, shaped like the
/// output of the pack pipeline.
pub fn write_fake_bundle(dir: &Path, stem: &str, erts_version: &str, release_version: &str) {
    let staging = TempDir::new().expect("Failed to create staging dir");
    let root = staging.path();
    let erts_bin = root.join(format!("erts-{erts_version}")).join("bin");

    write_executable(&root.join("bin/start.boot"), "boot image");
    for name in ["epmd", "run_erl", "to_erl"] {
        write_executable(&erts_bin.join(name), &format!("runtime {name}"));
    }
    for name in ["erl", "start", "start_erl"] {
        write_executable(
            &erts_bin.join(format!("{name}.src")),
            "ROOTDIR=%FINAL_ROOTDIR%\nEMU=%EMU%\n",
        );
    }
    fs::create_dir_all(root.join("releases")).expect("Failed to create releases dir");
    fs::write(
        root.join("releases/start_erl.data"),
        format!("{erts_version} {release_version}\n"),
    )
    .expect("Failed to write marker");
    write_rel_file(
        &root.join("releases").join(format!("{stem}.rel")),
        stem,
        release_version,
        erts_version,
        &[("kernel", "2.0"), ("stdlib", "1.5")],
    );
    fs::create_dir_all(root.join("lib/kernel-2.0/ebin")).expect("Failed to create lib dir");
    fs::write(
        root.join("lib/kernel-2.0/ebin/kernel.app"),
        "{application, kernel, []}.",
    )
    .expect("Failed to write app file");

    tar_up(root, &dir.join(format!("{stem}.tar.gz")));
}

/// Script generator fake: writes `<stem>.script` / `<stem>.boot` and
/// records each call with the descriptor text it was given.
#[derive(Default)]
pub struct FakeScriptGenerator {
    calls: RefCell<Vec<(String, String)>>,
}

impl FakeScriptGenerator {
    /// Recorded (stem, descriptor text) pairs, in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.borrow().clone()
    }

    /// Recorded stems, in call order.
    pub fn stems(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(stem, _)| stem.clone()).collect()
    }
}

impl ScriptGenerator for FakeScriptGenerator {
    fn generate(&self, rel_stem: &Path) -> Result<()> {
        let dir = rel_stem.parent().expect("stem has a parent");
        let stem = rel_stem
            .file_name()
            .and_then(|n| n.to_str())
            .expect("stem is valid UTF-8")
            .to_string();

        let rel_text = fs::read_to_string(dir.join(format!("{stem}.rel")))?;
        fs::write(dir.join(format!("{stem}.script")), format!("%% script for {stem}\n"))?;
        fs::write(dir.join(format!("{stem}.boot")), format!("boot image for {stem}"))?;

        self.calls.borrow_mut().push((stem, rel_text));
        Ok(())
    }
}

/// Tar generator fake: produces `<stem>.tar.gz` shaped like the external
/// tar bundler's output (no top-level `bin`, runtime launchers present).
pub struct FakeTarGenerator {
    erts_version: String,
}

impl FakeTarGenerator {
    pub fn new(erts_version: &str) -> Self {
        Self {
            erts_version: erts_version.to_string(),
        }
    }
}

impl TarGenerator for FakeTarGenerator {
    fn generate(&self, rel_stem: &Path) -> Result<()> {
        let dir = rel_stem.parent().expect("stem has a parent");
        let stem = rel_stem
            .file_name()
            .and_then(|n| n.to_str())
            .expect("stem is valid UTF-8");

        let staging = TempDir::new()?;
        let root = staging.path();
        let erts_bin = root.join(format!("erts-{}", self.erts_version)).join("bin");

        for name in ["erl", "start", "epmd", "run_erl", "to_erl"] {
            write_executable(&erts_bin.join(name), &format!("runtime {name}"));
        }
        for name in ["erl", "start", "start_erl"] {
            write_executable(
                &erts_bin.join(format!("{name}.src")),
                "ROOTDIR=%FINAL_ROOTDIR%\nEMU=%EMU%\n",
            );
        }
        fs::create_dir_all(root.join("releases"))?;
        fs::copy(
            dir.join(format!("{stem}.rel")),
            root.join("releases").join(format!("{stem}.rel")),
        )?;
        fs::create_dir_all(root.join("lib/kernel-2.0/ebin"))?;
        fs::write(
            root.join("lib/kernel-2.0/ebin/kernel.app"),
            "{application, kernel, []}.",
        )?;

        tar_up(root, &dir.join(format!("{stem}.tar.gz")));
        Ok(())
    }
}

/// Registry fake recording every registration.
#[derive(Default)]
pub struct RecordingRegistry {
    calls: RefCell<Vec<(PathBuf, PathBuf)>>,
}

impl RecordingRegistry {
    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.borrow().clone()
    }
}

impl ReleaseRegistry for RecordingRegistry {
    fn register(&self, root_dir: &Path, rel_file: &Path) -> Result<()> {
        self.calls
            .borrow_mut()
            .push((root_dir.to_path_buf(), rel_file.to_path_buf()));
        Ok(())
    }
}
