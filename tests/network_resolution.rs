//! Remote document resolution against a local mock server.

#![cfg(feature = "network")]

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{headers, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jsonld_cli::core::types::Encoding;
use jsonld_cli::input::{HttpFetcher, InputError, Resolver};

fn resolver() -> Resolver {
    let fetcher = HttpFetcher::new("jsonld-test").unwrap();
    Resolver::new(Encoding::Utf8).with_fetcher(Arc::new(fetcher))
}

#[tokio::test]
async fn fetches_json_document() {
    let server = MockServer::start().await;
    let body = r#"{"@id": "http://example.org/a"}"#;
    Mock::given(method("GET"))
        .and(path("/doc.jsonld"))
        .and(headers("accept", vec!["application/ld+json", "application/json"]))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let url = format!("{}/doc.jsonld", server.uri());
    let doc = resolver().resolve(&url).await.unwrap();

    assert_eq!(doc, json!({"@id": "http://example.org/a"}));
}

#[tokio::test]
async fn remote_and_local_copies_agree() {
    let body = r#"{"@context": {"name": "http://schema.org/name"}, "name": "Jane"}"#;
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), body).unwrap();

    let resolver = resolver();
    let remote = resolver.resolve(&server.uri()).await.unwrap();
    let local = resolver
        .resolve(file.path().to_str().unwrap())
        .await
        .unwrap();

    assert_eq!(remote, local);
}

#[tokio::test]
async fn not_found_carries_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/missing.jsonld", server.uri());
    let err = resolver().resolve(&url).await.unwrap_err();

    assert_eq!(err.status_code(), Some(404));
    assert!(err.to_string().contains("HTTP 404"));
}

#[tokio::test]
async fn non_json_body_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let err = resolver().resolve(&server.uri()).await.unwrap_err();

    assert!(matches!(err, InputError::Parse { .. }));
}
