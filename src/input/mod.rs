//! input
//!
//! Input Resolver: turns a `[filename|URL|-]` descriptor into a parsed
//! JSON value.
//!
//! # Modules
//!
//! - [`resolver`] - [`Resolver`], the single entry point for reading sources
//! - [`fetch`] - [`Fetcher`] trait and the HTTP implementation
//!
//! # Network Capability
//!
//! Remote fetching is a capability decided once at startup by
//! [`network_fetcher`]: it needs the `network` cargo feature and must not be
//! disabled by config or `--offline`. A resolver without a fetcher fails
//! `http(s)://` sources with [`InputError::NetworkUnavailable`]; it never
//! falls back to reading them as file paths.

pub mod fetch;
pub mod resolver;

pub use fetch::Fetcher;
#[cfg(feature = "network")]
pub use fetch::HttpFetcher;
pub use resolver::Resolver;

use std::sync::Arc;

use thiserror::Error;

use crate::core::types::Encoding;

/// Errors from resolving an input source.
#[derive(Debug, Error)]
pub enum InputError {
    /// A local file or stdin could not be read.
    #[error("failed to read {source_name}")]
    Read {
        source_name: String,
        source: std::io::Error,
    },

    /// The text is not valid in the configured encoding.
    #[error("failed to decode {source_name} as {encoding}")]
    Decode {
        source_name: String,
        encoding: Encoding,
    },

    /// The text is not a valid JSON document.
    #[error("failed to parse {source_name}")]
    Parse {
        source_name: String,
        source: serde_json::Error,
    },

    /// A remote source was requested but no network capability is present.
    #[error("cannot fetch {url}: network access is not available")]
    NetworkUnavailable { url: String },

    /// The remote server answered with a non-2xx status.
    #[error("HTTP {status} fetching {url}")]
    Network { status: u16, url: String },

    /// The request itself failed (DNS, connection, TLS, body read).
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Standard input was already read by another source.
    #[error("standard input can only be read once per invocation")]
    StdinConsumed,
}

impl InputError {
    /// HTTP status code, for [`InputError::Network`].
    pub fn status_code(&self) -> Option<u16> {
        match self {
            InputError::Network { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Build the network fetcher if the capability is available.
///
/// Returns `Ok(None)` when the crate was built without the `network`
/// feature or when `enabled` is false.
///
/// # Errors
///
/// Returns [`InputError::Transport`] if the HTTP client cannot be built.
pub fn network_fetcher(
    enabled: bool,
    user_agent: &str,
) -> Result<Option<Arc<dyn Fetcher>>, InputError> {
    if !enabled {
        return Ok(None);
    }

    #[cfg(feature = "network")]
    {
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(user_agent)?);
        Ok(Some(fetcher))
    }

    #[cfg(not(feature = "network"))]
    {
        let _ = user_agent;
        Ok(None)
    }
}
