//! Structured-output contracts used by the flashcards application.

pub mod chat_reply;
pub mod flashcards;

pub use chat_reply::{chat_reply_format, chat_reply_schema, ChatReply, Safety};
pub use flashcards::{
    generate_cards_format, generate_cards_schema, generation_messages, generation_options,
    generation_params, GeneratedCard, GeneratedCards,
};
