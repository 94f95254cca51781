//! Gateway client configuration.
//!
//! [`ServiceConfig`] is built once and never mutated by the client. It is
//! validated eagerly when a client is constructed; the environment factory in
//! [`env`] is the only place that touches process environment.

pub mod env;

use crate::error::Error;
use crate::Result;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_TIMEOUT_MS: u64 = 45_000;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_MAX_MESSAGES: usize = 50;
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 20_000;

#[derive(Clone, PartialEq)]
pub struct ServiceConfig {
    pub api_key: String,
    pub base_url: String,
    pub default_model: String,
    /// Per-attempt timeout.
    pub request_timeout: Duration,
    pub max_retries: u32,
    /// Sent as `HTTP-Referer` for gateway attribution.
    pub app_referer: Option<String>,
    /// Sent as `X-Title` for gateway attribution.
    pub app_title: Option<String>,
    pub allowed_models: Option<Vec<String>>,
    pub max_messages: usize,
    pub max_message_chars: usize,
}

impl ServiceConfig {
    pub fn new(api_key: impl Into<String>, default_model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: default_model.into(),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            app_referer: None,
            app_title: None,
            allowed_models: None,
            max_messages: DEFAULT_MAX_MESSAGES,
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_app_referer(mut self, referer: impl Into<String>) -> Self {
        self.app_referer = Some(referer.into());
        self
    }

    pub fn with_app_title(mut self, title: impl Into<String>) -> Self {
        self.app_title = Some(title.into());
        self
    }

    pub fn with_allowed_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_models = Some(models.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_max_messages(mut self, max_messages: usize) -> Self {
        self.max_messages = max_messages;
        self
    }

    pub fn with_max_message_chars(mut self, max_chars: usize) -> Self {
        self.max_message_chars = max_chars;
        self
    }

    /// Checks construction-time invariants.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::config("OpenRouter API key is not configured."));
        }
        if self.default_model.trim().is_empty() {
            return Err(Error::config("OpenRouter default model is not configured."));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::config(
                "OpenRouter request timeout must be a positive number.",
            ));
        }
        if self.max_messages == 0 {
            return Err(Error::config("OpenRouter max messages must be positive."));
        }
        if self.max_message_chars == 0 {
            return Err(Error::config(
                "OpenRouter max message length must be positive.",
            ));
        }
        match url::Url::parse(&self.base_url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            _ => {
                return Err(Error::config(format!(
                    "OpenRouter base URL is not a valid http(s) URL: {}",
                    self.base_url
                )))
            }
        }
        Ok(())
    }

    pub fn is_model_allowed(&self, model: &str) -> bool {
        match &self.allowed_models {
            Some(allowed) => allowed.iter().any(|m| m == model),
            None => true,
        }
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("request_timeout", &self.request_timeout)
            .field("max_retries", &self.max_retries)
            .field("app_referer", &self.app_referer)
            .field("app_title", &self.app_title)
            .field("allowed_models", &self.allowed_models)
            .field("max_messages", &self.max_messages)
            .field("max_message_chars", &self.max_message_chars)
            .finish()
    }
}
