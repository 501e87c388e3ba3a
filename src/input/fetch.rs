//! input::fetch
//!
//! Fetcher trait for remote documents.
//!
//! # Design
//!
//! The `Fetcher` trait is async because fetching involves network I/O.
//! The resolver only ever sees the trait, so tests can substitute a fake
//! and builds without the `network` feature carry no HTTP client at all.
//!
//! # Status Handling
//!
//! The final status code (after redirects) is classified by its leading
//! digit. Anything outside 2xx is [`InputError::Network`]. There is no
//! retry and no timeout.

use async_trait::async_trait;
use serde_json::Value;

use super::InputError;

/// Media types requested from remote servers.
pub const ACCEPT_VALUE: &str = "application/ld+json, application/json";

/// Whether a status code is in the 2xx class.
pub fn is_success_status(status: u16) -> bool {
    status / 100 == 2
}

/// Source of remote JSON documents.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and parse the body as JSON.
    ///
    /// # Errors
    ///
    /// - `Network` for a non-2xx status
    /// - `Transport` if the request could not be completed
    /// - `Parse` if the body is not JSON
    async fn get_json(&self, url: &str) -> Result<Value, InputError>;
}

#[cfg(feature = "network")]
pub use http::HttpFetcher;

#[cfg(feature = "network")]
mod http {
    use async_trait::async_trait;
    use reqwest::header::ACCEPT;
    use reqwest::Client;
    use serde_json::Value;

    use super::{is_success_status, Fetcher, ACCEPT_VALUE};
    use crate::input::InputError;

    /// HTTP fetcher backed by `reqwest`.
    #[derive(Debug, Clone)]
    pub struct HttpFetcher {
        client: Client,
    }

    impl HttpFetcher {
        /// Create a fetcher that sends the given User-Agent.
        pub fn new(user_agent: &str) -> Result<Self, InputError> {
            let client = Client::builder()
                .user_agent(user_agent)
                .build()
                .map_err(|e| InputError::Transport {
                    url: String::new(),
                    message: e.to_string(),
                })?;
            Ok(Self { client })
        }
    }

    #[async_trait]
    impl Fetcher for HttpFetcher {
        async fn get_json(&self, url: &str) -> Result<Value, InputError> {
            let transport = |e: reqwest::Error| InputError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            };

            let response = self
                .client
                .get(url)
                .header(ACCEPT, ACCEPT_VALUE)
                .send()
                .await
                .map_err(transport)?;

            let status = response.status().as_u16();
            tracing::debug!(url, status, "remote document response");
            if !is_success_status(status) {
                return Err(InputError::Network {
                    status,
                    url: url.to_string(),
                });
            }

            let body = response.text().await.map_err(transport)?;
            serde_json::from_str(&body).map_err(|e| InputError::Parse {
                source_name: url.to_string(),
                source: e,
            })
        }
    }
}
