// Application configuration
// Loaded from leetlocal.json (optional) and overridden by LEETLOCAL_* environment variables

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "leetlocal.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub problems_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub progress_file: PathBuf,
    pub python_command: String,
    pub timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            problems_dir: PathBuf::from("problems"),
            templates_dir: PathBuf::from("templates"),
            progress_file: PathBuf::from(".progress.json"),
            python_command: "python3".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl Config {
    /// Load from an explicit file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `leetlocal.json` from the working directory, then apply environment overrides.
    pub fn load_default() -> Result<Self, ConfigError> {
        let mut config = Self::load(Path::new(CONFIG_FILE))?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup. Takes a closure so tests need not touch the
    /// process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("LEETLOCAL_PROBLEMS_DIR") {
            self.problems_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("LEETLOCAL_TEMPLATES_DIR") {
            self.templates_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("LEETLOCAL_PROGRESS_FILE") {
            self.progress_file = PathBuf::from(file);
        }
        if let Some(python) = lookup("LEETLOCAL_PYTHON") {
            self.python_command = python;
        }
        if let Some(raw) = lookup("LEETLOCAL_TIMEOUT_MS") {
            self.timeout_ms = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "LEETLOCAL_TIMEOUT_MS",
                value: raw.clone(),
            })?;
        }
        Ok(())
    }
}
