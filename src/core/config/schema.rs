//! core::config::schema
//!
//! Configuration schema types.
//!
//! Located at (in order of precedence):
//! 1. `$JSONLD_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/jsonld/config.toml`
//! 3. `~/.jsonld/config.toml`
//!
//! # Validation
//!
//! Unknown keys are rejected at parse time; values are checked after
//! parsing.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::Encoding;

/// User configuration.
///
/// # Example
///
/// ```toml
/// [output]
/// indent = 4
/// newline = true
///
/// [input]
/// encoding = "utf8"
/// network = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Output defaults
    pub output: Option<OutputConfig>,

    /// Input defaults
    pub input: Option<InputConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(input) = &self.input {
            if let Some(agent) = &input.user_agent {
                if agent.trim().is_empty() {
                    return Err(ConfigError::InvalidValue(
                        "input.user_agent cannot be empty".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// `[output]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Spaces per indentation level
    pub indent: Option<usize>,

    /// Append a trailing newline
    pub newline: Option<bool>,
}

/// `[input]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Encoding for file and stdin sources
    pub encoding: Option<Encoding>,

    /// Allow fetching http(s) sources
    pub network: Option<bool>,

    /// User-Agent header for remote fetches
    pub user_agent: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full() {
        let toml = r#"
            [output]
            indent = 4
            newline = false

            [input]
            encoding = "latin1"
            network = false
            user_agent = "test-agent"
        "#;
        let config: FileConfig = toml::from_str(toml).unwrap();
        let output = config.output.unwrap();
        assert_eq!(output.indent, Some(4));
        assert_eq!(output.newline, Some(false));
        let input = config.input.unwrap();
        assert_eq!(input.encoding, Some(Encoding::Latin1));
        assert_eq!(input.network, Some(false));
        assert_eq!(input.user_agent.as_deref(), Some("test-agent"));
    }

    #[test]
    fn empty_is_default() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn unknown_keys_rejected() {
        let result: Result<FileConfig, _> = toml::from_str("[output]\ncolor = true\n");
        assert!(result.is_err());
    }

    #[test]
    fn bad_encoding_rejected() {
        let result: Result<FileConfig, _> = toml::from_str("[input]\nencoding = \"ebcdic\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn empty_user_agent_invalid() {
        let config: FileConfig = toml::from_str("[input]\nuser_agent = \" \"\n").unwrap();
        assert!(config.validate().is_err());
    }
}
