//! Limits applied while parsing and evaluating filters.
//!
//! Filter text arrives verbatim from query strings, so parsing is bounded by
//! length and nesting depth, and regex compilation by compiled program size.
//! The defaults suit most services; a TOML file can override any of them:
//!
//! ```toml
//! max_length = 2048
//! max_depth = 32
//! regex_size_limit = 262144
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default maximum filter length in bytes.
pub const DEFAULT_MAX_LENGTH: usize = 4096;

/// Default maximum nesting of parentheses and `not`.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default compiled-regex size limit in bytes.
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Errors that can occur when loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The contents are not valid TOML for [`FilterConfig`].
    #[error("invalid filter config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Parser and evaluator limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Maximum filter length in bytes.
    pub max_length: usize,

    /// Maximum nesting of parentheses and `not`.
    pub max_depth: usize,

    /// Size limit passed to the regex compiler for `~` and `!~` patterns.
    pub regex_size_limit: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
            regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
        }
    }
}

impl FilterConfig {
    /// Parses a configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}
