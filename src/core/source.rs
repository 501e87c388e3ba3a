//! core::source
//!
//! Classification of positional `[filename|URL|-]` arguments.
//!
//! # Invariants
//!
//! Classification is purely syntactic and checked in a fixed order:
//! 1. the literal `-` is standard input
//! 2. an `http://` or `https://` prefix is a network resource
//! 3. anything else is a local file
//!
//! Nothing is inferred from content or from the file system, so `-` is
//! standard input even when a file named `-` exists.

use std::fmt;
use std::path::PathBuf;

/// Descriptor used when the positional argument is omitted.
pub const STDIN_DESCRIPTOR: &str = "-";

/// A classified input source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDescriptor {
    /// The standard input stream.
    Stdin,
    /// An `http://` or `https://` resource.
    Network(String),
    /// A local file path.
    File(PathBuf),
}

impl SourceDescriptor {
    /// Classify a raw descriptor.
    ///
    /// # Example
    ///
    /// ```
    /// use jsonld_cli::core::source::SourceDescriptor;
    ///
    /// assert_eq!(SourceDescriptor::parse("-"), SourceDescriptor::Stdin);
    /// assert!(matches!(
    ///     SourceDescriptor::parse("https://example.org/doc"),
    ///     SourceDescriptor::Network(_)
    /// ));
    /// assert!(matches!(SourceDescriptor::parse("./doc.json"), SourceDescriptor::File(_)));
    /// ```
    pub fn parse(raw: &str) -> Self {
        if raw == STDIN_DESCRIPTOR {
            SourceDescriptor::Stdin
        } else if raw.starts_with("http://") || raw.starts_with("https://") {
            SourceDescriptor::Network(raw.to_string())
        } else {
            SourceDescriptor::File(PathBuf::from(raw))
        }
    }

    /// Short name of the source kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceDescriptor::Stdin => "stdin",
            SourceDescriptor::Network(_) => "network",
            SourceDescriptor::File(_) => "file",
        }
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceDescriptor::Stdin => write!(f, "<stdin>"),
            SourceDescriptor::Network(url) => write!(f, "{}", url),
            SourceDescriptor::File(path) => write!(f, "{}", path.display()),
        }
    }
}
