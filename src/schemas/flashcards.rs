//! Flashcard generation contract (`generate_cards_v1`).

use crate::error::Error;
use crate::structured::{JsonSchemaContract, ResponseFormat};
use crate::types::{ChatMessage, CompletionOptions, ModelParams};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const SCHEMA_NAME: &str = "generate_cards_v1";

const SYSTEM_PROMPT: &str = "You generate flashcards for an educational app.\n\
Return only data that matches the required JSON schema.\n\
Do not include markdown fences.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCards {
    pub cards: Vec<GeneratedCard>,
}

/// One card. Nullable fields are always present on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCard {
    pub front: String,
    pub back: String,
    pub context: Option<String>,
    pub difficulty: Option<u8>,
    pub tags: Option<Vec<String>>,
}

pub fn generate_cards_format() -> ResponseFormat {
    ResponseFormat::json_schema(
        SCHEMA_NAME,
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "cards": {
                    "type": "array",
                    "minItems": 1,
                    "maxItems": 100,
                    "items": {
                        "type": "object",
                        "additionalProperties": false,
                        "properties": {
                            "front": {"type": "string", "minLength": 1, "maxLength": 2000},
                            "back": {"type": "string", "minLength": 1, "maxLength": 10000},
                            "context": {"anyOf": [{"type": "string", "maxLength": 10000}, {"type": "null"}]},
                            "difficulty": {"anyOf": [{"type": "integer", "minimum": 1, "maximum": 5}, {"type": "null"}]},
                            "tags": {
                                "anyOf": [
                                    {
                                        "type": "array",
                                        "maxItems": 20,
                                        "items": {"type": "string", "minLength": 1, "maxLength": 50}
                                    },
                                    {"type": "null"}
                                ]
                            }
                        },
                        "required": ["front", "back", "context", "difficulty", "tags"]
                    }
                }
            },
            "required": ["cards"]
        }),
    )
}

pub fn generate_cards_schema() -> Result<JsonSchemaContract<GeneratedCards>> {
    JsonSchemaContract::new(generate_cards_format())
        .map_err(|e| Error::config(format!("Invalid {} schema: {}", SCHEMA_NAME, e)))
}

/// System + user prompt pair for generating cards from `content`.
pub fn generation_messages(content: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "Generate flashcards from the user content.\n\nUser content:\n{}",
            content
        )),
    ]
}

pub fn generation_params() -> ModelParams {
    ModelParams::new().temperature(0.2).max_tokens(1200)
}

pub fn generation_options() -> CompletionOptions {
    CompletionOptions::new().params(generation_params())
}
