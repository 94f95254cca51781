//! Public error codes: maps a classified [`Error`] to what an HTTP API layer
//! shows its end users.
//!
//! Every error kind resolves to a stable machine-readable code and an HTTP
//! status. Raw upstream payloads and diagnostic meta are only attached when
//! the caller opts in (development builds).
//!
//! | Kind                 | Status   | Code                              |
//! |----------------------|----------|-----------------------------------|
//! | `Config`             | 500      | `openrouter_not_configured`       |
//! | `InputValidation`    | 400      | `validation_error`                |
//! | `Auth`               | upstream | `openrouter_auth_error`           |
//! | `RateLimit`          | 429      | `openrouter_rate_limit`           |
//! | `Timeout`            | 408      | `openrouter_timeout`              |
//! | `UnsupportedFeature` | 502      | `openrouter_unsupported_feature`  |
//! | `Upstream`           | upstream | `openrouter_upstream_error`       |
//! | `ResponseParse`      | 500      | `openrouter_invalid_json`         |
//! | `SchemaValidation`   | 500      | `openrouter_schema_mismatch`      |
//!
//! ## Example
//!
//! ```rust
//! use flashcards_ai::error_code::PublicError;
//! use flashcards_ai::{Error, ErrorMeta};
//!
//! let err = Error::timeout("OpenRouter request timed out.", ErrorMeta::new(), None);
//! let public = PublicError::from_error(&err, false);
//! assert_eq!(public.status, 408);
//! assert_eq!(public.code, "openrouter_timeout");
//! ```

use crate::error::{Error, ErrorKind};
use serde::Serialize;
use serde_json::{json, Value};

/// End-user facing rendition of an [`Error`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicError {
    #[serde(skip)]
    pub status: u16,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl PublicError {
    pub fn from_error(err: &Error, expose_details: bool) -> Self {
        let (status, code, message) = match err.kind() {
            ErrorKind::Config => (500, "openrouter_not_configured", err.message().to_string()),
            ErrorKind::InputValidation => (400, "validation_error", err.message().to_string()),
            ErrorKind::Auth => (
                err.status(),
                "openrouter_auth_error",
                "OpenRouter authorization failed.".to_string(),
            ),
            ErrorKind::RateLimit => (
                429,
                "openrouter_rate_limit",
                "OpenRouter rate limit exceeded.".to_string(),
            ),
            ErrorKind::Timeout => (
                408,
                "openrouter_timeout",
                "OpenRouter request timed out.".to_string(),
            ),
            ErrorKind::UnsupportedFeature => (
                502,
                "openrouter_unsupported_feature",
                err.message().to_string(),
            ),
            ErrorKind::Upstream => (
                err.status(),
                "openrouter_upstream_error",
                err.message().to_string(),
            ),
            ErrorKind::ResponseParse => (
                500,
                "openrouter_invalid_json",
                "OpenRouter returned invalid JSON.".to_string(),
            ),
            ErrorKind::SchemaValidation => (
                500,
                "openrouter_schema_mismatch",
                "OpenRouter response did not match the expected schema.".to_string(),
            ),
        };

        let details = if expose_details {
            Self::details_for(err)
        } else {
            None
        };

        Self {
            status,
            code,
            message,
            details,
        }
    }

    fn details_for(err: &Error) -> Option<Value> {
        let meta = err.meta();
        let mut details = match serde_json::to_value(meta) {
            Ok(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        if let Error::SchemaValidation { source, .. } = err {
            details.insert("validation".into(), Value::String(source.to_string()));
        }
        if details.is_empty() {
            None
        } else {
            Some(Value::Object(details))
        }
    }

    /// Response body in the `{"error": {...}}` envelope.
    pub fn to_body(&self) -> Value {
        json!({ "error": self })
    }
}

impl From<&Error> for PublicError {
    fn from(err: &Error) -> Self {
        Self::from_error(err, false)
    }
}
