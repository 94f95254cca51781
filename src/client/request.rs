//! Request construction.

use crate::config::ServiceConfig;
use crate::structured::ResponseFormat;
use crate::types::{ChatMessage, ModelParams};
use serde_json::{json, Value};

/// Builds the chat-completions body.
///
/// Model params are spread at the top level, which is what the gateway expects.
pub(crate) fn build_body(
    model: &str,
    messages: &[ChatMessage],
    response_format: Option<&ResponseFormat>,
    user: Option<&str>,
    params: &ModelParams,
) -> Value {
    let mut body = json!({
        "model": model,
        "messages": messages,
    });
    let Some(obj) = body.as_object_mut() else {
        return body;
    };
    if let Some(format) = response_format {
        obj.insert("response_format".into(), format.to_value());
    }
    if let Some(user) = user {
        obj.insert("user".into(), Value::String(user.to_string()));
    }
    if let Ok(Value::Object(params)) = serde_json::to_value(params) {
        for (k, v) in params {
            obj.entry(k).or_insert(v);
        }
    }
    body
}

pub(crate) fn build_headers(config: &ServiceConfig) -> Vec<(String, String)> {
    let mut headers = vec![
        ("Authorization".to_string(), format!("Bearer {}", config.api_key)),
        ("Content-Type".to_string(), "application/json".to_string()),
    ];
    if let Some(referer) = &config.app_referer {
        headers.push(("HTTP-Referer".to_string(), referer.clone()));
    }
    if let Some(title) = &config.app_title {
        headers.push(("X-Title".to_string(), title.clone()));
    }
    headers
}
