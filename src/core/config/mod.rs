//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (applied by the command layer through the accessors here)
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. `$JSONLD_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/jsonld/config.toml`
//! 3. `~/.jsonld/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use jsonld_cli::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("indent: {}", config.indent());
//! println!("network: {}", config.network_enabled());
//! ```

pub mod schema;

pub use schema::{FileConfig, InputConfig, OutputConfig};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::types::{Encoding, OutputSpec};

/// Default indentation width.
pub const DEFAULT_INDENT: usize = 2;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}'")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Loaded configuration.
///
/// Accessors apply defaults for anything the file leaves unset.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents
    pub file: FileConfig,
    /// Path the file was loaded from (if any)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed.
    /// A missing file is not an error (defaults are used).
    pub fn load() -> Result<Self, ConfigError> {
        match Self::locate() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: FileConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;

        Ok(Self {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    /// Find the first existing config file.
    fn locate() -> Option<PathBuf> {
        // 1. Check $JSONLD_CONFIG
        if let Ok(path) = std::env::var("JSONLD_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/jsonld/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("jsonld/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.jsonld/config.toml
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".jsonld/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    /// Path the configuration came from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Indentation width.
    pub fn indent(&self) -> usize {
        self.file
            .output
            .as_ref()
            .and_then(|o| o.indent)
            .unwrap_or(DEFAULT_INDENT)
    }

    /// Whether a trailing newline is written.
    pub fn newline(&self) -> bool {
        self.file
            .output
            .as_ref()
            .and_then(|o| o.newline)
            .unwrap_or(true)
    }

    /// Encoding for file and stdin sources.
    pub fn encoding(&self) -> Encoding {
        self.file
            .input
            .as_ref()
            .and_then(|i| i.encoding)
            .unwrap_or_default()
    }

    /// Whether remote fetches are allowed by configuration.
    pub fn network_enabled(&self) -> bool {
        self.file
            .input
            .as_ref()
            .and_then(|i| i.network)
            .unwrap_or(true)
    }

    /// User-Agent for remote fetches.
    pub fn user_agent(&self) -> String {
        self.file
            .input
            .as_ref()
            .and_then(|i| i.user_agent.clone())
            .unwrap_or_else(|| format!("jsonld-cli/{}", env!("CARGO_PKG_VERSION")))
    }

    /// Build the output spec, letting CLI flags override configured values.
    ///
    /// `no_newline` can only turn the newline off.
    pub fn output_spec(&self, indent: Option<usize>, no_newline: bool) -> OutputSpec {
        OutputSpec {
            indent_width: indent.unwrap_or_else(|| self.indent()),
            emit_trailing_newline: self.newline() && !no_newline,
        }
    }
}
