use crate::client::builder::GatewayClientBuilder;
use crate::config::ServiceConfig;
use crate::structured::{ResponseFormat, StructuredSchema};
use crate::telemetry::{dispatch_usage, UsageEvent, UsageSink};
use crate::transport::Transport;
use crate::types::{ChatMessage, CompletionOptions, CompletionResult, StructuredCompletion};
use crate::Result;
use std::sync::Arc;

use super::execution::CallContext;
use super::{request, response, validation};

/// Client for an OpenAI-compatible chat-completions gateway.
///
/// Stateless apart from its immutable config; cheap to clone and safe to
/// share across tasks. Each call runs its own retry loop.
#[derive(Clone)]
pub struct GatewayClient {
    pub(crate) config: Arc<ServiceConfig>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) usage_sink: Option<Arc<dyn UsageSink>>,
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("config", &self.config)
            .field("usage_tracking", &self.usage_sink.is_some())
            .finish()
    }
}

impl GatewayClient {
    /// Create a client over the default HTTP transport.
    ///
    /// Fails with [`Error::Config`](crate::Error::Config) when the config is invalid.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        GatewayClientBuilder::new(config).build()
    }

    pub fn builder(config: ServiceConfig) -> GatewayClientBuilder {
        GatewayClientBuilder::new(config)
    }

    /// Create a client from `OPENROUTER_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ServiceConfig::from_env()?)
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn default_model(&self) -> &str {
        &self.config.default_model
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Plain chat completion.
    ///
    /// A `response_format` in `options` is forwarded as is, and the call is
    /// then classified as structured.
    pub async fn send_completion(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<CompletionResult> {
        let format = options.response_format.as_ref();
        self.complete(messages, options, format, format.is_some())
            .await
    }

    /// Chat completion constrained to `schema`.
    ///
    /// Advertises the schema's response format (overriding any in `options`),
    /// decodes the content as JSON and validates it with the schema.
    pub async fn send_completion_structured<S>(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
        schema: &S,
    ) -> Result<StructuredCompletion<S::Output>>
    where
        S: StructuredSchema + ?Sized,
    {
        let raw = self
            .complete(messages, options, Some(schema.response_format()), true)
            .await?;
        let data = response::parse_structured_content(schema, &raw)?;
        Ok(StructuredCompletion { raw, data })
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
        response_format: Option<&ResponseFormat>,
        structured: bool,
    ) -> Result<CompletionResult> {
        validation::assert_input_safe(&self.config, messages, options.model.as_deref())?;
        let model = validation::pick_model(&self.config, options.model.as_deref())?;

        let body = request::build_body(
            &model,
            messages,
            response_format,
            options.user.as_deref(),
            &options.params,
        );
        let call = CallContext {
            model: &model,
            user: options.user.as_deref(),
            structured,
        };
        let (json, request_id) = self.request_with_retry(body, call).await?;
        let result = response::parse_completion_response(&json, &model, request_id)?;

        if let (Some(sink), Some(usage)) = (&self.usage_sink, &result.usage) {
            dispatch_usage(
                sink.clone(),
                UsageEvent::new(&result, usage, options.user.as_deref()),
            );
        }

        Ok(result)
    }
}
