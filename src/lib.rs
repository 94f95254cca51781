//! # flashcards-ai
//!
//! Resilient client for an OpenAI-compatible LLM gateway (OpenRouter), with
//! JSON-schema structured output, used by the flashcards application to
//! generate cards and chat replies.
//!
//! ## Overview
//!
//! One request shape (non-streaming chat completion) against one gateway:
//!
//! - **Guardrails**: message count/size limits and a model allow-list, checked before any network call
//! - **Retry**: 429 and 5xx responses and transport failures are retried with jittered exponential backoff
//! - **Timeouts**: each attempt is cancelled after the configured deadline and is never retried
//! - **Typed errors**: every failure is exactly one of nine [`ErrorKind`]s
//! - **Structured output**: a [`StructuredSchema`] both advertises and validates the expected JSON
//! - **Usage tracking**: token counts go to an optional [`telemetry::UsageSink`] without blocking the call
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flashcards_ai::schemas::{generate_cards_schema, generation_messages, generation_options};
//! use flashcards_ai::{GatewayClient, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> flashcards_ai::Result<()> {
//!     let client = GatewayClient::new(ServiceConfig::new("sk-or-...", "openai/gpt-4o-mini"))?;
//!     let schema = generate_cards_schema()?;
//!     let out = client
//!         .send_completion_structured(
//!             &generation_messages("The mitochondria is the powerhouse of the cell."),
//!             &generation_options(),
//!             &schema,
//!         )
//!         .await?;
//!     println!("{} cards", out.data.cards.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Gateway client, retry loop, classification, parsing |
//! | [`config`] | Service configuration and environment factory |
//! | [`structured`] | Response formats and validating contracts |
//! | [`schemas`] | Application contracts (flashcards, chat reply) |
//! | [`telemetry`] | Usage events and sinks |
//! | [`transport`] | HTTP seam |
//! | [`error_code`] | End-user error mapping |

pub mod client;
pub mod config;
pub mod error;
pub mod error_code;
pub mod schemas;
pub mod structured;
pub mod telemetry;
pub mod transport;
pub mod types;

pub use client::{GatewayClient, GatewayClientBuilder};
pub use config::ServiceConfig;
pub use error::{Error, ErrorKind, ErrorMeta};
pub use structured::{ResponseFormat, StructuredSchema};
pub use types::{
    ChatMessage, CompletionOptions, CompletionResult, ModelParams, Role, Stop,
    StructuredCompletion, Usage,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;
