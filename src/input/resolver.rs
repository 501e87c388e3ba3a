//! input::resolver
//!
//! Resolve source descriptors to parsed JSON values.
//!
//! # Sources
//!
//! - `-` reads standard input to end-of-stream
//! - `http://` / `https://` goes through the injected [`Fetcher`]
//! - anything else is read as a local file
//!
//! All three decode with the resolver's [`Encoding`] (remote bodies are
//! decoded by the fetcher) and parse with `serde_json`.
//!
//! # Standard Input
//!
//! Standard input is a single-consumer resource. The reader sits in a
//! take-once slot; a second `-` in the same invocation fails with
//! [`InputError::StdinConsumed`].
//!
//! # Example
//!
//! ```
//! use jsonld_cli::core::types::Encoding;
//! use jsonld_cli::input::Resolver;
//!
//! # tokio_test::block_on(async {
//! let resolver = Resolver::new(Encoding::Utf8).with_stdin(&b"{\"a\": 1}"[..]);
//! let doc = resolver.resolve("-").await.unwrap();
//! assert_eq!(doc["a"], 1);
//! assert!(resolver.resolve("-").await.is_err());
//! # });
//! ```

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use super::{Fetcher, InputError};
use crate::core::source::SourceDescriptor;
use crate::core::types::Encoding;

type StdinReader = Box<dyn AsyncRead + Send + Unpin>;

/// Resolves descriptors into documents.
pub struct Resolver {
    encoding: Encoding,
    stdin: Mutex<Option<StdinReader>>,
    fetcher: Option<Arc<dyn Fetcher>>,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("encoding", &self.encoding)
            .field("network", &self.fetcher.is_some())
            .finish()
    }
}

impl Resolver {
    /// Create a resolver reading the process's standard input, with no
    /// network capability.
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            stdin: Mutex::new(Some(Box::new(tokio::io::stdin()))),
            fetcher: None,
        }
    }

    /// Replace the standard input reader.
    pub fn with_stdin(self, reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            stdin: Mutex::new(Some(Box::new(reader))),
            ..self
        }
    }

    /// Grant the network capability.
    pub fn with_fetcher(self, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher: Some(fetcher),
            ..self
        }
    }

    /// Whether `http(s)://` sources can be resolved.
    pub fn network_available(&self) -> bool {
        self.fetcher.is_some()
    }

    /// The encoding used for file and stdin sources.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Resolve a descriptor to a parsed document.
    ///
    /// # Errors
    ///
    /// - `Read` / `Decode` / `Parse` for local and stdin sources
    /// - `NetworkUnavailable`, `Network`, `Transport` for remote sources
    /// - `StdinConsumed` if stdin was already read
    pub async fn resolve(&self, descriptor: &str) -> Result<Value, InputError> {
        let source = SourceDescriptor::parse(descriptor);
        debug!(kind = source.kind(), source = %source, "resolving input");

        match source {
            SourceDescriptor::Stdin => {
                let bytes = self.read_stdin().await?;
                self.parse_bytes("<stdin>", bytes)
            }
            SourceDescriptor::Network(url) => self.fetch(&url).await,
            SourceDescriptor::File(path) => {
                let name = path.display().to_string();
                let bytes = tokio::fs::read(&path)
                    .await
                    .map_err(|e| InputError::Read {
                        source_name: name.clone(),
                        source: e,
                    })?;
                self.parse_bytes(&name, bytes)
            }
        }
    }

    /// Resolve a descriptor that may be absent.
    ///
    /// An absent descriptor yields `Value::Null` without reading anything.
    pub async fn resolve_optional(&self, descriptor: Option<&str>) -> Result<Value, InputError> {
        match descriptor {
            Some(descriptor) => self.resolve(descriptor).await,
            None => {
                debug!("no descriptor given, resolving to null");
                Ok(Value::Null)
            }
        }
    }

    /// Resolve a remote document only; stdin is never consulted.
    ///
    /// Used for documents referenced from inside other documents, such as
    /// remote contexts.
    pub async fn resolve_reference(&self, iri: &str) -> Result<Value, InputError> {
        match SourceDescriptor::parse(iri) {
            SourceDescriptor::Stdin => Err(InputError::Read {
                source_name: iri.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "standard input cannot be referenced from a document",
                ),
            }),
            _ => self.resolve(iri).await,
        }
    }

    async fn fetch(&self, url: &str) -> Result<Value, InputError> {
        let fetcher = self
            .fetcher
            .as_ref()
            .ok_or_else(|| InputError::NetworkUnavailable {
                url: url.to_string(),
            })?;
        fetcher.get_json(url).await
    }

    async fn read_stdin(&self) -> Result<Vec<u8>, InputError> {
        let reader = self
            .stdin
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        let mut reader = reader.ok_or(InputError::StdinConsumed)?;

        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .await
            .map_err(|e| InputError::Read {
                source_name: "<stdin>".into(),
                source: e,
            })?;
        debug!(bytes = bytes.len(), "read standard input");
        Ok(bytes)
    }

    fn parse_bytes(&self, name: &str, bytes: Vec<u8>) -> Result<Value, InputError> {
        let text = self
            .encoding
            .decode(bytes)
            .ok_or_else(|| InputError::Decode {
                source_name: name.to_string(),
                encoding: self.encoding,
            })?;
        serde_json::from_str(&text).map_err(|e| InputError::Parse {
            source_name: name.to_string(),
            source: e,
        })
    }
}
