//! SSE event parsing for the Anthropic streaming Messages API.
//!
//! Anthropic streaming events differ from the OpenAI format:
//! - `message_start` — initial message metadata
//! - `content_block_start` — begin a content block
//! - `content_block_delta` — incremental content (`text_delta`)
//! - `content_block_stop` — end of a content block
//! - `message_delta` — final stop reason and usage
//! - `message_stop` — end of message
//! - `error` — in-band failure, terminates the stream

use llm::{Fragment, LlmError};
use serde::Deserialize;

/// A raw SSE event from the Anthropic streaming API.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Initial message metadata.
    #[serde(rename = "message_start")]
    MessageStart {},
    /// Begin a content block.
    #[serde(rename = "content_block_start")]
    ContentBlockStart { content_block: ContentBlock },
    /// Incremental content within a block.
    #[serde(rename = "content_block_delta")]
    ContentBlockDelta { delta: BlockDelta },
    /// End of a content block.
    #[serde(rename = "content_block_stop")]
    ContentBlockStop {},
    /// Final message delta (stop reason + usage).
    #[serde(rename = "message_delta")]
    MessageDelta {},
    /// End of message.
    #[serde(rename = "message_stop")]
    MessageStop,
    /// Ping (keep-alive).
    #[serde(rename = "ping")]
    Ping,
    /// In-band error; the stream terminates after this event.
    #[serde(rename = "error")]
    Error { error: ErrorBody },
    /// Catch-all for unknown event types.
    #[serde(other)]
    Unknown,
}

/// The start of a content block.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    /// A text block, possibly with initial content.
    #[serde(rename = "text")]
    Text { text: String },
    /// Any other block kind (narwhal only consumes text).
    #[serde(other)]
    Other,
}

/// An incremental delta within a content block.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum BlockDelta {
    /// Appended text.
    #[serde(rename = "text_delta")]
    TextDelta { text: String },
    /// Any other delta kind.
    #[serde(other)]
    Other,
}

/// Body of an in-band `error` event.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    /// Error type discriminator, e.g. `overloaded_error`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

impl Event {
    /// Convert this event to a fragment. Returns `Ok(None)` for events
    /// that carry no text and `Err` for in-band error events.
    pub fn into_fragment(self) -> Result<Option<Fragment>, LlmError> {
        match self {
            Self::ContentBlockStart {
                content_block: ContentBlock::Text { text },
            } => Ok(Fragment::new(text)),
            Self::ContentBlockDelta {
                delta: BlockDelta::TextDelta { text },
            } => Ok(Fragment::new(text)),
            Self::Error { error } => Err(error.into_llm_error()),
            _ => Ok(None),
        }
    }
}

impl ErrorBody {
    /// Map the in-band error type to the failure taxonomy.
    pub fn into_llm_error(self) -> LlmError {
        match self.kind.as_str() {
            "authentication_error" | "permission_error" => LlmError::Auth(self.message),
            "rate_limit_error" | "overloaded_error" => LlmError::RateLimited,
            _ => LlmError::Decode(self.message),
        }
    }
}
