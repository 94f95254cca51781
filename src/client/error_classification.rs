//! Error classification logic
//!
//! Maps a non-2xx gateway response to exactly one [`Error`] kind. Nothing
//! above the request layer re-interprets status codes.

use crate::error::{Error, ErrorMeta};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static STRUCTURED_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)response_format|json_schema|structured").expect("valid regex"));

/// Facts about the failed attempt needed for classification.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FailureContext<'a> {
    pub model: &'a str,
    pub request_id: Option<&'a str>,
    pub structured: bool,
}

/// Best-effort extraction of the gateway's own error message.
///
/// Tries `error.message`, then `error` as a string, then top-level `message`.
pub(crate) fn upstream_message(payload: Option<&Value>) -> Option<String> {
    let obj = payload?.as_object()?;
    let from_error = match obj.get("error") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Object(inner)) => inner
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    };
    from_error.or_else(|| obj.get("message").and_then(Value::as_str).map(str::to_string))
}

pub(crate) fn classify_http(status: u16, payload: Option<Value>, ctx: FailureContext<'_>) -> Error {
    let message = upstream_message(payload.as_ref());
    let meta = ErrorMeta::new()
        .with_status(status)
        .with_model(ctx.model)
        .with_request_id(ctx.request_id.map(str::to_string))
        .with_payload(payload);

    match status {
        401 | 403 => Error::Auth {
            status,
            message: "OpenRouter authorization failed.".into(),
            meta,
        },
        429 => Error::RateLimit {
            message: "OpenRouter rate limit exceeded.".into(),
            meta,
        },
        400..=499 => {
            let mentions_structured = message
                .as_deref()
                .map(|m| STRUCTURED_HINT.is_match(m))
                .unwrap_or(false);
            if ctx.structured && mentions_structured {
                Error::UnsupportedFeature {
                    message: "Model/provider does not support structured outputs for this request."
                        .into(),
                    meta,
                }
            } else {
                Error::Upstream {
                    status,
                    message: message.unwrap_or_else(|| "OpenRouter request failed.".into()),
                    meta,
                    source: None,
                }
            }
        }
        _ => Error::Upstream {
            status,
            message: "OpenRouter upstream error.".into(),
            meta,
            source: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn ctx(structured: bool) -> FailureContext<'static> {
        FailureContext {
            model: "m",
            request_id: Some("req-1"),
            structured,
        }
    }

    #[test]
    fn auth_keeps_exact_status() {
        for status in [401, 403] {
            let err = classify_http(status, Some(json!({"error": {"message": "bad key"}})), ctx(false));
            assert_eq!(err.kind(), ErrorKind::Auth);
            assert_eq!(err.status(), status);
            assert_eq!(err.meta().request_id.as_deref(), Some("req-1"));
            assert_eq!(err.meta().model.as_deref(), Some("m"));
        }
    }

    #[test]
    fn rate_limit() {
        let err = classify_http(429, None, ctx(false));
        assert_eq!(err.kind(), ErrorKind::RateLimit);
        assert_eq!(err.status(), 429);
        assert!(err.is_retryable());
    }

    #[test]
    fn structured_rejection_is_unsupported_feature() {
        let payload = json!({"error": {"message": "Invalid parameter: response_format is not supported"}});
        let err = classify_http(400, Some(payload.clone()), ctx(true));
        assert_eq!(err.kind(), ErrorKind::UnsupportedFeature);
        assert_eq!(err.status(), 502);
        assert_eq!(err.meta().payload.as_ref(), Some(&payload));

        let err = classify_http(400, Some(payload), ctx(false));
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn hint_match_is_case_insensitive() {
        let err = classify_http(422, Some(json!({"message": "Structured Outputs unavailable"})), ctx(true));
        assert_eq!(err.kind(), ErrorKind::UnsupportedFeature);
    }

    #[test]
    fn client_errors_use_upstream_message() {
        let err = classify_http(404, Some(json!({"error": "No endpoints found"})), ctx(true));
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(err.message(), "No endpoints found");

        let err = classify_http(400, Some(json!([1, 2])), ctx(false));
        assert_eq!(err.message(), "OpenRouter request failed.");
    }

    #[test]
    fn server_errors_keep_status() {
        let err = classify_http(502, Some(json!({"error": {"message": "provider down"}})), ctx(false));
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(err.status(), 502);
        assert_eq!(err.message(), "OpenRouter upstream error.");
        assert!(err.is_retryable());
    }

    #[test]
    fn message_extraction_order() {
        assert_eq!(
            upstream_message(Some(&json!({"error": {"message": "a"}, "message": "b"}))).as_deref(),
            Some("a")
        );
        assert_eq!(upstream_message(Some(&json!({"message": "b"}))).as_deref(), Some("b"));
        assert_eq!(upstream_message(Some(&json!({"error": {"code": 1}}))), None);
        assert_eq!(upstream_message(None), None);
    }
}
