//! Response parsing and structured-content validation.

use crate::error::{Error, ErrorMeta};
use crate::structured::StructuredSchema;
use crate::types::{CompletionResult, Usage};
use crate::Result;
use serde_json::Value;

fn non_blank_str<'a>(json: &'a Value, key: &str) -> Option<&'a str> {
    json.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Extracts a [`CompletionResult`] from a 2xx chat-completions body.
///
/// `id` defaults to `"unknown"`, `model` to `fallback_model`. Missing, non-string
/// or empty content is a [`Error::ResponseParse`].
pub fn parse_completion_response(
    json: &Value,
    fallback_model: &str,
    request_id: Option<String>,
) -> Result<CompletionResult> {
    let id = non_blank_str(json, "id").unwrap_or("unknown").to_string();
    let model = non_blank_str(json, "model").unwrap_or(fallback_model).to_string();

    let content = json
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|c| !c.is_empty());
    let Some(content) = content else {
        return Err(Error::response_parse(
            "OpenRouter returned empty response.",
            ErrorMeta::new()
                .with_model(model)
                .with_request_id(request_id)
                .with_field("id", id),
            None,
        ));
    };

    Ok(CompletionResult {
        id,
        model,
        content: content.to_string(),
        usage: json.get("usage").and_then(parse_usage),
        request_id,
    })
}

/// Usage is kept only when all three token counts are numbers.
fn parse_usage(raw: &Value) -> Option<Usage> {
    Some(Usage {
        prompt_tokens: token_count(raw.get("prompt_tokens")?)?,
        completion_tokens: token_count(raw.get("completion_tokens")?)?,
        total_tokens: token_count(raw.get("total_tokens")?)?,
        cost: raw.get("cost").and_then(Value::as_f64),
    })
}

/// Non-negative whole number, whether encoded as `12` or `12.0`.
fn token_count(v: &Value) -> Option<u64> {
    if let Some(n) = v.as_u64() {
        return Some(n);
    }
    let f = v.as_f64()?;
    (f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64).then(|| f as u64)
}

/// Decodes completion text as JSON and runs it through `schema`.
pub fn parse_structured_content<S: StructuredSchema + ?Sized>(
    schema: &S,
    raw: &CompletionResult,
) -> Result<S::Output> {
    let meta = || {
        ErrorMeta::new()
            .with_model(raw.model.clone())
            .with_request_id(raw.request_id.clone())
            .with_field("schema", schema.response_format().name())
    };

    let parsed: Value = serde_json::from_str(&raw.content).map_err(|e| {
        Error::response_parse(
            "OpenRouter structured output is not valid JSON.",
            meta(),
            Some(e),
        )
    })?;

    schema
        .validate(&parsed)
        .map_err(|source| Error::SchemaValidation {
            message: "OpenRouter structured output does not match schema.".into(),
            meta: meta(),
            source,
        })
}
