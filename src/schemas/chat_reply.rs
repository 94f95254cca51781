//! Study-assistant reply contract (`chat_reply_v1`), derived from the Rust types.

use crate::error::Error;
use crate::structured::{schema_for_type, JsonSchemaContract, ResponseFormat};
use crate::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const SCHEMA_NAME: &str = "chat_reply_v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    /// Reply shown to the user.
    pub answer: String,
    /// Suggested next questions.
    pub follow_ups: Vec<String>,
    pub safety: Safety,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Safety {
    pub flagged: bool,
    /// Why the reply was flagged; empty when not flagged.
    pub reason: String,
}

pub fn chat_reply_format() -> ResponseFormat {
    ResponseFormat::json_schema(SCHEMA_NAME, schema_for_type::<ChatReply>())
}

pub fn chat_reply_schema() -> Result<JsonSchemaContract<ChatReply>> {
    JsonSchemaContract::new(chat_reply_format())
        .map_err(|e| Error::config(format!("Invalid {} schema: {}", SCHEMA_NAME, e)))
}
