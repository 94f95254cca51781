use crate::client::core::GatewayClient;
use crate::config::ServiceConfig;
use crate::error::Error;
use crate::telemetry::UsageSink;
use crate::transport::{HttpTransport, Transport};
use crate::Result;
use std::sync::Arc;

/// Builder for creating clients with custom collaborators.
///
/// Keep this surface area small: config is required, everything else defaults.
pub struct GatewayClientBuilder {
    config: ServiceConfig,
    transport: Option<Arc<dyn Transport>>,
    usage_sink: Option<Arc<dyn UsageSink>>,
}

impl GatewayClientBuilder {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            transport: None,
            usage_sink: None,
        }
    }

    /// Replace the HTTP transport (mock servers, scripted tests, custom TLS).
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Inject a usage sink. Without one, usage is not tracked.
    pub fn usage_sink(mut self, sink: Arc<dyn UsageSink>) -> Self {
        self.usage_sink = Some(sink);
        self
    }

    /// Validates the config and builds the client. No network activity.
    pub fn build(self) -> Result<GatewayClient> {
        let mut config = self.config;
        config.validate()?;
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        let transport = match self.transport {
            Some(t) => t,
            None => Arc::new(
                HttpTransport::new()
                    .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?,
            ),
        };

        Ok(GatewayClient {
            config: Arc::new(config),
            transport,
            usage_sink: self.usage_sink,
        })
    }
}
