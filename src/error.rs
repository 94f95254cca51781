use crate::structured::ValidationError;
use crate::transport::TransportError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Structured diagnostic context attached to every classified error.
///
/// Carries enough to debug a failure without re-sending the request:
/// the HTTP status, the resolved model, the gateway request id and the raw
/// error payload the gateway returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// Free-form fields such as guardrail limits (`maxMessages`, `got`).
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl ErrorMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn with_payload(mut self, payload: Option<serde_json::Value>) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.model.is_none()
            && self.request_id.is_none()
            && self.payload.is_none()
            && self.fields.is_empty()
    }
}

/// Discriminant of [`Error`], for callers that only need to branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    InputValidation,
    Auth,
    RateLimit,
    Upstream,
    Timeout,
    UnsupportedFeature,
    ResponseParse,
    SchemaValidation,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config => "openrouter_config_error",
            Self::InputValidation => "openrouter_input_validation_error",
            Self::Auth => "openrouter_auth_error",
            Self::RateLimit => "openrouter_rate_limit",
            Self::Upstream => "openrouter_upstream_error",
            Self::Timeout => "openrouter_timeout",
            Self::UnsupportedFeature => "openrouter_unsupported_feature",
            Self::ResponseParse => "openrouter_response_parse_error",
            Self::SchemaValidation => "openrouter_schema_validation_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error type for every gateway client operation.
///
/// Exactly nine mutually exclusive kinds. Classification happens once, at the
/// request layer; callers match on the variant (or [`Error::kind`]) and never
/// on the message text.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String, meta: ErrorMeta },

    #[error("Input validation error: {message}{}", format_meta(.meta))]
    InputValidation { message: String, meta: ErrorMeta },

    #[error("Authorization error: HTTP {status}: {message}")]
    Auth {
        status: u16,
        message: String,
        meta: ErrorMeta,
    },

    #[error("Rate limit error: {message}")]
    RateLimit { message: String, meta: ErrorMeta },

    #[error("Upstream error: HTTP {status}: {message}")]
    Upstream {
        status: u16,
        message: String,
        meta: ErrorMeta,
        #[source]
        source: Option<TransportError>,
    },

    #[error("Timeout error: {message}")]
    Timeout {
        message: String,
        meta: ErrorMeta,
        #[source]
        source: Option<TransportError>,
    },

    #[error("Unsupported feature: {message}")]
    UnsupportedFeature { message: String, meta: ErrorMeta },

    #[error("Response parse error: {message}")]
    ResponseParse {
        message: String,
        meta: ErrorMeta,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Schema validation error: {message}: {source}")]
    SchemaValidation {
        message: String,
        meta: ErrorMeta,
        #[source]
        source: ValidationError,
    },
}

fn format_meta(meta: &ErrorMeta) -> String {
    if meta.fields.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = meta
        .fields
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect();
    format!(" ({})", parts.join(", "))
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            meta: ErrorMeta::new(),
        }
    }

    pub fn input_validation(message: impl Into<String>, meta: ErrorMeta) -> Self {
        Error::InputValidation {
            message: message.into(),
            meta,
        }
    }

    pub fn timeout(message: impl Into<String>, meta: ErrorMeta, source: Option<TransportError>) -> Self {
        Error::Timeout {
            message: message.into(),
            meta,
            source,
        }
    }

    pub fn response_parse(
        message: impl Into<String>,
        meta: ErrorMeta,
        source: Option<serde_json::Error>,
    ) -> Self {
        Error::ResponseParse {
            message: message.into(),
            meta,
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. } => ErrorKind::Config,
            Error::InputValidation { .. } => ErrorKind::InputValidation,
            Error::Auth { .. } => ErrorKind::Auth,
            Error::RateLimit { .. } => ErrorKind::RateLimit,
            Error::Upstream { .. } => ErrorKind::Upstream,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::UnsupportedFeature { .. } => ErrorKind::UnsupportedFeature,
            Error::ResponseParse { .. } => ErrorKind::ResponseParse,
            Error::SchemaValidation { .. } => ErrorKind::SchemaValidation,
        }
    }

    /// HTTP-style status of the failure.
    ///
    /// Gateway-originated kinds keep the gateway's status; client-local
    /// judgments are always mapped locally.
    pub fn status(&self) -> u16 {
        match self {
            Error::Config { .. } => 500,
            Error::InputValidation { .. } => 400,
            Error::Auth { status, .. } => *status,
            Error::RateLimit { .. } => 429,
            Error::Upstream { status, .. } => *status,
            Error::Timeout { .. } => 408,
            Error::UnsupportedFeature { .. } => 502,
            Error::ResponseParse { .. } => 500,
            Error::SchemaValidation { .. } => 500,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    pub fn message(&self) -> &str {
        match self {
            Error::Config { message, .. }
            | Error::InputValidation { message, .. }
            | Error::Auth { message, .. }
            | Error::RateLimit { message, .. }
            | Error::Upstream { message, .. }
            | Error::Timeout { message, .. }
            | Error::UnsupportedFeature { message, .. }
            | Error::ResponseParse { message, .. }
            | Error::SchemaValidation { message, .. } => message,
        }
    }

    pub fn meta(&self) -> &ErrorMeta {
        match self {
            Error::Config { meta, .. }
            | Error::InputValidation { meta, .. }
            | Error::Auth { meta, .. }
            | Error::RateLimit { meta, .. }
            | Error::Upstream { meta, .. }
            | Error::Timeout { meta, .. }
            | Error::UnsupportedFeature { meta, .. }
            | Error::ResponseParse { meta, .. }
            | Error::SchemaValidation { meta, .. } => meta,
        }
    }

    /// Whether the dispatch loop would retry this failure while attempts remain.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::RateLimit { .. } => true,
            Error::Upstream { status, .. } => (500..=599).contains(status),
            _ => false,
        }
    }
}
