//! Gateway client.
//!
//! Keep the public surface small: [`GatewayClient`] and its builder.
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod core;
mod error_classification;
mod execution;
mod policy;
mod request;
pub mod response;
mod validation;

pub use self::builder::GatewayClientBuilder;
pub use self::core::GatewayClient;
pub use self::policy::{base_backoff, jittered_backoff};
pub use self::response::{parse_completion_response, parse_structured_content};
