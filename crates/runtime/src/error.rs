//! Engine error type.

use crate::history::StoreError;
use llm::LlmError;

/// Failure surfaced by the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// A generation session is already running.
    #[error("a generation is already running")]
    AlreadyRunning,
    /// The provider stream failed.
    #[error("generation failed: {0}")]
    Generation(#[from] LlmError),
    /// The history store failed.
    #[error("history store: {0}")]
    Store(#[from] StoreError),
}
