//! core::types
//!
//! Small value types shared across the pipeline.
//!
//! # Types
//!
//! - [`Encoding`] - Character encoding used to decode file and stdin sources
//! - [`OutputSpec`] - Indentation and trailing-newline policy for one write
//! - [`DocumentFormat`] - Recognized `--format` tokens
//!
//! # Examples
//!
//! ```
//! use jsonld_cli::core::types::{DocumentFormat, Encoding};
//!
//! assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
//! assert_eq!(DocumentFormat::parse("N-Quads"), Some(DocumentFormat::NQuads));
//! assert_eq!(DocumentFormat::parse("yaml"), None);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),
}

/// Character encoding for textual sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Encoding {
    /// UTF-8; a leading byte-order mark is dropped.
    #[default]
    Utf8,
    /// ISO-8859-1, every byte maps to the code point of the same value.
    Latin1,
}

impl Encoding {
    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf8",
            Encoding::Latin1 => "latin1",
        }
    }

    /// Decode raw bytes.
    ///
    /// Returns `None` if the bytes are not valid in this encoding.
    pub fn decode(&self, bytes: Vec<u8>) -> Option<String> {
        match self {
            Encoding::Utf8 => {
                let mut text = String::from_utf8(bytes).ok()?;
                if text.starts_with('\u{feff}') {
                    text.drain(..'\u{feff}'.len_utf8());
                }
                Some(text)
            }
            Encoding::Latin1 => Some(bytes.into_iter().map(char::from).collect()),
        }
    }
}

impl FromStr for Encoding {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "latin1" | "latin-1" | "iso-8859-1" | "binary" => Ok(Encoding::Latin1),
            _ => Err(TypeError::UnsupportedEncoding(s.to_string())),
        }
    }
}

impl TryFrom<String> for Encoding {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Encoding> for String {
    fn from(value: Encoding) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the single result write is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSpec {
    /// Spaces per nesting level for structured values; 0 writes compact JSON.
    pub indent_width: usize,
    /// Whether a newline follows the value.
    pub emit_trailing_newline: bool,
}

impl Default for OutputSpec {
    fn default() -> Self {
        Self {
            indent_width: 2,
            emit_trailing_newline: true,
        }
    }
}

/// A recognized document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Any JSON-LD flavour; the document is written as JSON.
    JsonLd,
    /// Line-oriented N-Quads.
    NQuads,
}

impl DocumentFormat {
    /// Tokens that denote JSON-LD.
    pub const JSON_TOKENS: [&'static str; 5] = [
        "application/json",
        "json",
        "application/ld+json",
        "json-ld",
        "ld+json",
    ];

    /// Tokens that denote N-Quads.
    pub const NQUADS_TOKENS: [&'static str; 4] =
        ["application/nquads", "application/n-quads", "nquads", "n-quads"];

    /// Media type passed to the processor.
    pub const NQUADS_MEDIA_TYPE: &'static str = "application/nquads";

    /// Parse a format token, case-insensitively.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.to_lowercase();
        if Self::JSON_TOKENS.contains(&token.as_str()) {
            Some(DocumentFormat::JsonLd)
        } else if Self::NQUADS_TOKENS.contains(&token.as_str()) {
            Some(DocumentFormat::NQuads)
        } else {
            None
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::JsonLd => write!(f, "application/ld+json"),
            DocumentFormat::NQuads => write!(f, "{}", Self::NQUADS_MEDIA_TYPE),
        }
    }
}
