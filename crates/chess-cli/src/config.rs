//! Configuration file loading for the chess command-line tool.
//!
//! Settings come from `chess.toml` in the current directory unless another
//! path is given. Every key is optional, and a missing file means defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings for the `chess` tool.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ChessConfig {
    /// Maximum log level: error, warn, info, debug or trace.
    pub log_level: Option<String>,
    /// Position used when a command is given no `--fen`.
    pub start_fen: Option<String>,
    /// Perft depth used when `perft` is given no `--depth`. Defaults to 3.
    pub perft_depth: u32,
}

impl Default for ChessConfig {
    fn default() -> Self {
        ChessConfig {
            log_level: None,
            start_fen: None,
            perft_depth: default_perft_depth(),
        }
    }
}

fn default_perft_depth() -> u32 {
    3
}

impl ChessConfig {
    /// Loads the configuration from `path`, or from [`Self::config_path()`]
    /// when no path is given.
    ///
    /// If the file does not exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file exists but cannot be read,
    /// or [`ConfigError::Parse`] if the file contains invalid TOML.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = path.map_or_else(Self::config_path, Path::to_path_buf);
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default path to the configuration file.
    pub fn config_path() -> PathBuf {
        PathBuf::from("chess.toml")
    }
}
