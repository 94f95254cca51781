//! Core data types for gateway calls.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ChatMessage`] | Chat message with role, content and optional tool linkage |
//! | [`ModelParams`] | Sampling knobs forwarded at the top level of the request body |
//! | [`CompletionOptions`] | Per-call model override, caller id, params and response format |
//! | [`CompletionResult`] | Parsed completion with optional usage and gateway request id |
//! | [`StructuredCompletion`] | Raw completion plus the validated structured value |
//!
//! ## Example
//!
//! ```rust
//! use flashcards_ai::types::{ChatMessage, CompletionOptions, ModelParams};
//!
//! let messages = vec![
//!     ChatMessage::system("You are terse."),
//!     ChatMessage::user("Define entropy."),
//! ];
//! let options = CompletionOptions::new()
//!     .model("openai/gpt-4o-mini")
//!     .params(ModelParams::new().temperature(0.2));
//! assert_eq!(messages.len(), 2);
//! assert_eq!(options.params.temperature, Some(0.2));
//! ```

pub mod message;
pub mod params;
pub mod response;

pub use message::{ChatMessage, Role};
pub use params::{CompletionOptions, ModelParams, Stop};
pub use response::{CompletionResult, StructuredCompletion, Usage};
