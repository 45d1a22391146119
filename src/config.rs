//! Configuration management for relpack.
//!
//! Reads configuration from a .env file and environment variables.
//! Environment variables take precedence over the .env file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Default name of the external runtime program.
pub const DEFAULT_ERL_PROGRAM: &str = "erl";

/// Default name of the temporary extraction directory.
pub const DEFAULT_WORK_DIR: &str = "relpack-tmp";

/// Relpack configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// External runtime program driving script/tar generation (ERL_PROGRAM).
    pub erl_program: String,
    /// Name of the temporary extraction directory (RELPACK_WORK_DIR).
    pub work_dir_name: String,
}

impl Config {
    /// Load configuration from `<base_dir>/.env` and the environment.
    pub fn load(base_dir: &Path) -> Self {
        let mut env_vars = HashMap::new();

        let env_path = base_dir.join(".env");
        if env_path.exists() {
            if let Ok(content) = fs::read_to_string(&env_path) {
                for line in content.lines() {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some((key, value)) = line.split_once('=') {
                        let value = value.trim().trim_matches('"').trim_matches('\'');
                        env_vars.insert(key.trim().to_string(), value.to_string());
                    }
                }
            }
        }

        // Environment variables override the .env file.
        for (key, value) in std::env::vars() {
            env_vars.insert(key, value);
        }

        let erl_program = env_vars
            .get("ERL_PROGRAM")
            .cloned()
            .unwrap_or_else(|| DEFAULT_ERL_PROGRAM.to_string());

        let work_dir_name = env_vars
            .get("RELPACK_WORK_DIR")
            .cloned()
            .unwrap_or_else(|| DEFAULT_WORK_DIR.to_string());

        Self {
            erl_program,
            work_dir_name,
        }
    }

    /// Check if the external runtime is available.
    pub fn has_runtime(&self) -> bool {
        which::which(&self.erl_program).is_ok()
    }

    /// Print configuration for `show config`.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  ERL_PROGRAM: {}", self.erl_program);
        println!("  RELPACK_WORK_DIR: {}", self.work_dir_name);
        if self.has_runtime() {
            println!("  Runtime: FOUND");
        } else {
            println!("  Runtime: NOT FOUND (install Erlang or set ERL_PROGRAM)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_env_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path());
        assert_eq!(config.erl_program, DEFAULT_ERL_PROGRAM);
        assert_eq!(config.work_dir_name, DEFAULT_WORK_DIR);
    }

    #[test]
    fn test_env_file_values_are_read() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".env"),
            "# toolchain\nRELPACK_WORK_DIR=\"scratch\"\n\nignored line\n",
        )
        .unwrap();
        let config = Config::load(dir.path());
        assert_eq!(config.work_dir_name, "scratch");
    }
}
