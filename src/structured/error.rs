//! Error type for structured output validation.

use std::fmt;

/// Validation error with location information.
///
/// Produced by a [`StructuredSchema`](crate::structured::StructuredSchema)
/// when decoded model output does not match its contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// What went wrong
    pub message: String,
    /// JSON pointer to the offending value (e.g. `/cards/0/front`)
    pub path: Option<String>,
}

impl ValidationError {
    pub fn with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    pub fn without_path(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path.as_deref() {
            Some(path) if !path.is_empty() => write!(f, "{}: {}", path, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ValidationError {}
