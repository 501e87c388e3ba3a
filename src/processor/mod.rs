//! processor
//!
//! The document processing engine seam.
//!
//! # Architecture
//!
//! The `Processor` trait is the contract the command layer depends on. It
//! covers the six JSON-LD operations; each is a single async call taking a
//! document, zero or more secondary documents and an options struct.
//! Commands never reach past the trait.
//!
//! # Modules
//!
//! - [`basic`]: In-process engine used by the binary
//! - [`mock`]: Recording test double
//!
//! # Example
//!
//! ```
//! use jsonld_cli::processor::{ExpandOptions, Processor};
//! use jsonld_cli::processor::basic::BasicProcessor;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let processor = BasicProcessor::new();
//! let doc = json!({
//!     "@context": {"name": "http://schema.org/name"},
//!     "name": "Jane"
//! });
//! let expanded = processor.expand(doc, &ExpandOptions::default()).await.unwrap();
//! assert_eq!(
//!     expanded,
//!     json!([{"http://schema.org/name": [{"@value": "Jane"}]}])
//! );
//! # });
//! ```

pub mod basic;
pub mod mock;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::input::Resolver;

/// Errors surfaced by a processor.
///
/// The command layer treats these as opaque and reports them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessorError {
    /// A local or remote context is malformed.
    #[error("invalid context: {0}")]
    InvalidContext(String),

    /// A term's IRI mapping refers back to itself.
    #[error("cyclic IRI mapping for term '{0}'")]
    CyclicIriMapping(String),

    /// The input document is not valid JSON-LD.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// The frame is not a valid frame.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// A referenced document could not be loaded.
    #[error("failed to load document {iri}: {message}")]
    LoadingDocumentFailed { iri: String, message: String },

    /// The requested output format is not supported.
    #[error("unknown output format: {0}")]
    UnknownFormat(String),

    /// A feature outside what this processor implements.
    #[error("{0} is not supported")]
    Unsupported(String),
}

/// Options for `expand`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Base IRI for relative references
    pub base: Option<String>,
    /// Keep top-level node objects that only carry `@id`
    pub keep_free_floating_nodes: bool,
}

/// Options for `compact`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactOptions {
    /// Base IRI for relative references
    pub base: Option<String>,
    /// Drop properties that do not expand to absolute IRIs
    pub strict: bool,
    /// Replace single-element arrays with their element
    pub compact_arrays: bool,
    /// Always emit a top-level `@graph`
    pub graph: bool,
    /// Treat the input as already expanded
    pub skip_expansion: bool,
}

impl Default for CompactOptions {
    fn default() -> Self {
        Self {
            base: None,
            strict: true,
            compact_arrays: true,
            graph: false,
            skip_expansion: false,
        }
    }
}

/// Options for `flatten`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Base IRI for relative references
    pub base: Option<String>,
}

/// Options for `frame`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameOptions {
    /// Base IRI for relative references
    pub base: Option<String>,
    /// Embed matched nodes in place of references
    pub embed: bool,
    /// Only output properties named in the frame
    pub explicit: bool,
    /// Skip adding defaults for missing frame properties
    pub omit_default: bool,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            base: None,
            embed: true,
            explicit: false,
            omit_default: false,
        }
    }
}

/// Options for `to_rdf` and `normalize`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RdfOptions {
    /// Base IRI for relative references
    pub base: Option<String>,
    /// Output media type; `None` yields a JSON dataset object
    pub format: Option<String>,
}

/// Result of `compact`: the compacted document and the context it used.
#[derive(Debug, Clone, PartialEq)]
pub struct Compacted {
    pub document: Value,
    pub context: Value,
}

/// A JSON-LD processing engine.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so one instance can be shared
/// across tasks.
///
/// # Secondary Documents
///
/// Contexts and frames arrive as parsed values. `Value::Null` means the
/// caller had none; whether that is acceptable is up to the operation.
#[async_trait]
pub trait Processor: Send + Sync {
    /// Processor name for diagnostics.
    fn name(&self) -> &'static str;

    /// Convert a document to RDF.
    async fn to_rdf(&self, input: Value, options: &RdfOptions) -> Result<Value, ProcessorError>;

    /// Compact a document with a context.
    async fn compact(
        &self,
        input: Value,
        context: Value,
        options: &CompactOptions,
    ) -> Result<Compacted, ProcessorError>;

    /// Expand a document.
    async fn expand(&self, input: Value, options: &ExpandOptions) -> Result<Value, ProcessorError>;

    /// Flatten a document, compacting with `context` when it is not null.
    async fn flatten(
        &self,
        input: Value,
        context: Value,
        options: &FlattenOptions,
    ) -> Result<Value, ProcessorError>;

    /// Frame a document.
    async fn frame(
        &self,
        input: Value,
        frame: Value,
        options: &FrameOptions,
    ) -> Result<Value, ProcessorError>;

    /// Canonicalize a document's RDF dataset.
    async fn normalize(&self, input: Value, options: &RdfOptions)
        -> Result<Value, ProcessorError>;
}

/// Loads documents referenced from inside other documents (remote contexts).
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Load and parse the document at `iri`.
    async fn load_document(&self, iri: &str) -> Result<Value, ProcessorError>;
}

#[async_trait]
impl DocumentLoader for Resolver {
    async fn load_document(&self, iri: &str) -> Result<Value, ProcessorError> {
        self.resolve_reference(iri)
            .await
            .map_err(|e| ProcessorError::LoadingDocumentFailed {
                iri: iri.to_string(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Encoding;

    #[test]
    fn option_defaults_match_cli_defaults() {
        let compact = CompactOptions::default();
        assert!(compact.strict);
        assert!(compact.compact_arrays);
        assert!(!compact.graph);
        assert!(!compact.skip_expansion);

        let frame = FrameOptions::default();
        assert!(frame.embed);
        assert!(!frame.explicit);
        assert!(!frame.omit_default);

        assert!(!ExpandOptions::default().keep_free_floating_nodes);
        assert_eq!(RdfOptions::default().format, None);
    }

    #[tokio::test]
    async fn resolver_loads_files_as_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("context.jsonld");
        let body = br#"{"@context": {"name": "http://schema.org/name"}}"#;
        std::fs::write(&path, body).unwrap();

        let resolver = Resolver::new(Encoding::Utf8).with_stdin(&b""[..]);
        let doc = resolver
            .load_document(path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(doc["@context"]["name"], "http://schema.org/name");
    }

    #[tokio::test]
    async fn loader_errors_name_the_iri() {
        let resolver = Resolver::new(Encoding::Utf8).with_stdin(&b""[..]);
        let err = resolver
            .load_document("https://example.org/context.jsonld")
            .await
            .unwrap_err();
        match err {
            ProcessorError::LoadingDocumentFailed { iri, .. } => {
                assert_eq!(iri, "https://example.org/context.jsonld")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
