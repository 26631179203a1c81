//! abaplens project configuration
//!
//! Loads `abaplens.json` from a project root. The `syntax` section mirrors
//! [`AnalyzeConfig`]; every field is optional.
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high → low):
//! 1. CLI arguments
//! 2. Project-level (abaplens.json)
//! 3. Default values
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use abaplens::util::config::ProjectConfig;
//!
//! let config = ProjectConfig::load_from_dir(".")?;
//! let analyze = config.syntax;
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::frontend::config::AnalyzeConfig;

/// Project configuration file name
pub const CONFIG_FILE_NAME: &str = "abaplens.json";

/// Project-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProjectConfig {
    /// File collection settings
    #[serde(default)]
    pub files: FilesConfig,
    /// Syntax analysis settings
    #[serde(default)]
    pub syntax: AnalyzeConfig,
}

/// Which files belong to the project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Extensions collected by `abaplens check`
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec!["abap".to_string()]
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Config parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Config serialize error: {0}")]
    SerializeError(#[from] serde_json::Error),
}

impl ProjectConfig {
    /// Load `abaplens.json` from `dir`; a missing file yields defaults
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = dir.as_ref().join(CONFIG_FILE_NAME);
        if !path.exists() {
            tracing::debug!("no {} in {}, using defaults", CONFIG_FILE_NAME, dir.as_ref().display());
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Render as pretty JSON (used by `abaplens init`)
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
