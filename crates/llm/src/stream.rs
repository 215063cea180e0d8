//! OpenAI-compatible streaming chunk shape.
//!
//! Shared by every adapter that speaks the chat-completions SSE protocol
//! (the OpenAI cloud and LM Studio local targets).

use serde::Deserialize;

/// A streaming chat completion chunk.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StreamChunk {
    /// The list of completion choices (with delta content).
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

impl StreamChunk {
    /// Get the content of the first choice, if non-empty.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Get the reason the model stopped generating.
    pub fn finish_reason(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.finish_reason.as_deref())
    }
}

/// One completion choice within a chunk.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StreamChoice {
    /// Incremental content.
    #[serde(default)]
    pub delta: Delta,
    /// Set on the final chunk of a choice.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Incremental message content.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Delta {
    /// Appended text, if any.
    #[serde(default)]
    pub content: Option<String>,
}
