//! Environment factory for [`ServiceConfig`].
//!
//! Reads:
//! - `OPENROUTER_API_KEY`: required by client construction
//! - `OPENROUTER_DEFAULT_MODEL`: default `openai/gpt-4o-mini`
//! - `OPENROUTER_TIMEOUT_MS`: default 45000; non-positive or invalid falls back
//! - `OPENROUTER_MAX_RETRIES`: default 2; negative is rejected
//! - `OPENROUTER_BASE_URL`: default `https://openrouter.ai/api/v1`
//! - `OPENROUTER_HTTP_REFERER`, `OPENROUTER_X_TITLE`: optional attribution
//! - `OPENROUTER_ALLOWED_MODELS`: comma separated allow-list
//! - `OPENROUTER_MAX_MESSAGES`, `OPENROUTER_MAX_MESSAGE_CHARS`: guardrail caps
//!
//! A value counts as unset when it is absent, blank, or the `###` placeholder.

use super::{
    ServiceConfig, DEFAULT_BASE_URL, DEFAULT_MAX_MESSAGES, DEFAULT_MAX_MESSAGE_CHARS,
    DEFAULT_MAX_RETRIES, DEFAULT_MODEL, DEFAULT_TIMEOUT_MS,
};
use crate::error::Error;
use crate::Result;
use std::time::Duration;

const PLACEHOLDER: &str = "###";

impl ServiceConfig {
    /// Builds a config from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    ///
    /// The API key is not checked here: a missing key yields an empty string
    /// so that client construction reports it.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| non_placeholder(lookup(name));

        let api_key = get("OPENROUTER_API_KEY").unwrap_or_default();
        let default_model = get("OPENROUTER_DEFAULT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = get("OPENROUTER_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_ms = get("OPENROUTER_TIMEOUT_MS")
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|ms| *ms > 0)
            .map(|ms| ms as u64)
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        let max_retries = match get("OPENROUTER_MAX_RETRIES").map(|v| v.parse::<i64>()) {
            Some(Ok(n)) if n < 0 => {
                return Err(Error::config("OpenRouter max retries must be >= 0."));
            }
            Some(Ok(n)) => u32::try_from(n).unwrap_or(u32::MAX),
            _ => DEFAULT_MAX_RETRIES,
        };

        let allowed_models = get("OPENROUTER_ALLOWED_MODELS").and_then(|raw| {
            let models: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect();
            (!models.is_empty()).then_some(models)
        });

        Ok(ServiceConfig {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_model,
            request_timeout: Duration::from_millis(timeout_ms),
            max_retries,
            app_referer: get("OPENROUTER_HTTP_REFERER"),
            app_title: get("OPENROUTER_X_TITLE"),
            allowed_models,
            max_messages: parse_positive(get("OPENROUTER_MAX_MESSAGES"), DEFAULT_MAX_MESSAGES),
            max_message_chars: parse_positive(
                get("OPENROUTER_MAX_MESSAGE_CHARS"),
                DEFAULT_MAX_MESSAGE_CHARS,
            ),
        })
    }
}

fn non_placeholder(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != PLACEHOLDER)
}

fn parse_positive(raw: Option<String>, default: usize) -> usize {
    raw.and_then(|v| v.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}
