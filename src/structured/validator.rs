//! Structured-output contracts.
//!
//! A [`StructuredSchema`] pairs the response-format descriptor sent to the
//! gateway with a pure validating parse from decoded JSON into the caller's
//! type. The client only depends on this trait; any validation library can
//! sit behind it.

use crate::structured::error::ValidationError;
use crate::structured::schema::ResponseFormat;
use jsonschema::{Draft, JSONSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// Caller-defined contract for structured model output.
///
/// `validate` must be deterministic and side-effect free: it is the single
/// source of truth for whether the model's output matched expectations.
pub trait StructuredSchema: Send + Sync {
    type Output;

    fn response_format(&self) -> &ResponseFormat;

    fn validate(&self, raw: &Value) -> Result<Self::Output, ValidationError>;
}

/// Contract backed by the advertised JSON schema itself.
///
/// Validates with `jsonschema` (draft 7) and then deserialises into `T`.
pub struct JsonSchemaContract<T> {
    format: ResponseFormat,
    compiled: JSONSchema,
    _output: PhantomData<fn() -> T>,
}

impl<T> JsonSchemaContract<T> {
    pub fn new(format: ResponseFormat) -> Result<Self, ValidationError> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(format.schema())
            .map_err(|e| {
                ValidationError::without_path(format!(
                    "Failed to compile schema '{}': {}",
                    format.name(),
                    e
                ))
            })?;
        Ok(Self {
            format,
            compiled,
            _output: PhantomData,
        })
    }
}

impl<T> fmt::Debug for JsonSchemaContract<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaContract")
            .field("name", &self.format.name())
            .finish()
    }
}

impl<T: DeserializeOwned> StructuredSchema for JsonSchemaContract<T> {
    type Output = T;

    fn response_format(&self) -> &ResponseFormat {
        &self.format
    }

    fn validate(&self, raw: &Value) -> Result<T, ValidationError> {
        if let Err(mut errors) = self.compiled.validate(raw) {
            let first = errors.next().map(|e| {
                ValidationError::with_path(e.to_string(), e.instance_path.to_string())
            });
            return Err(first
                .unwrap_or_else(|| ValidationError::without_path("Schema validation failed")));
        }
        serde_json::from_value(raw.clone()).map_err(|e| ValidationError::without_path(e.to_string()))
    }
}

/// Contract backed by a plain validating function.
pub struct FnSchema<T, F> {
    format: ResponseFormat,
    parse: F,
    _output: PhantomData<fn() -> T>,
}

impl<T, F> FnSchema<T, F>
where
    F: Fn(&Value) -> Result<T, ValidationError> + Send + Sync,
{
    pub fn new(format: ResponseFormat, parse: F) -> Self {
        Self {
            format,
            parse,
            _output: PhantomData,
        }
    }
}

impl<T, F> StructuredSchema for FnSchema<T, F>
where
    F: Fn(&Value) -> Result<T, ValidationError> + Send + Sync,
{
    type Output = T;

    fn response_format(&self) -> &ResponseFormat {
        &self.format
    }

    fn validate(&self, raw: &Value) -> Result<T, ValidationError> {
        (self.parse)(raw)
    }
}
