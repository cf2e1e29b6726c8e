//! Thin adapter for the chat-completion generative service.
//!
//! One credential check, one network round trip, and the best-effort
//! completion parser that splits a generation into quote text and author.

mod client;
mod types;

pub use client::{mask_api_key, GeneratedQuote, GenerativeClient};
pub use types::{
    parse_completion, ChatMessage, ChatRequest, ChatResponse, ChatRole, ParsedQuote,
    ANONYMOUS_AUTHOR,
};
