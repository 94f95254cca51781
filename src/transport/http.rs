use super::{Transport, TransportError, TransportRequest, TransportResponse};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// reqwest-backed transport.
///
/// Only the connect phase is bounded here; the per-attempt deadline is owned
/// by the client so that it also covers reading the body.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut req = self.client.post(&request.url);
        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        let response = req.json(&request.body).send().await?;
        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
