//! Structured output: response-format descriptors and validating contracts.
//!
//! - [`ResponseFormat`]: the strict `json_schema` descriptor sent to the gateway
//! - [`StructuredSchema`]: the contract the client validates decoded output with
//! - [`strict_schema`] / [`schema_for_type`]: helpers producing provider-safe schemas
//!
//! # Examples
//!
//! ```
//! use flashcards_ai::structured::{JsonSchemaContract, ResponseFormat, StructuredSchema};
//! use serde_json::json;
//!
//! let format = ResponseFormat::json_schema(
//!     "greeting_v1",
//!     json!({
//!         "type": "object",
//!         "additionalProperties": false,
//!         "required": ["text"],
//!         "properties": {"text": {"type": "string"}}
//!     }),
//! );
//! let contract: JsonSchemaContract<serde_json::Value> = JsonSchemaContract::new(format).unwrap();
//! assert!(contract.validate(&json!({"text": "hi"})).is_ok());
//! assert!(contract.validate(&json!({"text": 1})).is_err());
//! ```

pub mod error;
pub mod schema;
pub mod validator;

pub use error::ValidationError;
pub use schema::{schema_for_type, strict_schema, JsonSchemaSpec, ResponseFormat};
pub use validator::{FnSchema, JsonSchemaContract, StructuredSchema};
