//! HTTP seam between the gateway client and the network.
//!
//! The client only sees [`Transport`]; [`HttpTransport`] is the production
//! implementation. Tests substitute scripted transports.

pub mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use std::collections::HashMap;

/// A JSON POST to send.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: serde_json::Value,
}

/// Any HTTP response, successful or not.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    /// Header names are lower-cased.
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Failure to obtain any HTTP response at all.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Timeouts are cancellations and are never retried.
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::Http(e) => e.is_timeout(),
            TransportError::Timeout => true,
            TransportError::Other(_) => false,
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}
