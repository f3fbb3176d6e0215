//! Upstream client module for the aggregation API
//!
//! This module provides HTTP client functionality for talking to the
//! third-party aggregation API. Every request is a GET carrying the
//! `mg-apikey` header; responses are decoded as JSON without assuming any
//! particular envelope shape (that is the normalizer's job).

use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to the upstream API
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Network-related errors (connection timeout, DNS failure, etc.)
    #[error("Failed to connect to upstream: {0}")]
    Network(String),

    /// HTTP non-200 status code errors
    #[error("Upstream returned status {0}")]
    Http(u16),

    /// Response body could not be decoded as JSON
    #[error("Failed to decode upstream response: {0}")]
    Decode(String),
}

/// A JSON-over-HTTP GET transport.
///
/// The fallback resolver is generic over this trait so its sequencing can
/// be exercised without a network.
pub trait Transport {
    /// Issue a GET request and decode the body as JSON.
    fn get_json(&self, url: &str) -> impl Future<Output = Result<Value, UpstreamError>> + Send;
}

/// HTTP client for the upstream aggregation API
pub struct Upstream {
    client: Client,
    api_key: String,
}

impl Upstream {
    /// Create a new client with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key: api_key.into(),
        }
    }

    async fn do_get(&self, url: &str) -> Result<Value, UpstreamError> {
        let response = self
            .client
            .get(url)
            .header("mg-apikey", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UpstreamError::Network("Connection timeout".to_string())
                } else if e.is_connect() {
                    UpstreamError::Network("Failed to connect to upstream".to_string())
                } else {
                    UpstreamError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(UpstreamError::Http(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

impl Transport for Upstream {
    async fn get_json(&self, url: &str) -> Result<Value, UpstreamError> {
        self.do_get(url).await
    }
}
