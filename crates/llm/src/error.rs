//! Provider failure taxonomy.

use serde::{Deserialize, Serialize};

/// A failure reported by a provider adapter.
///
/// Variants carry rendered messages rather than source errors so that a
/// terminal session state can hold (and clone) the failure that ended it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, thiserror::Error)]
pub enum LlmError {
    /// The configured endpoint could not be reached.
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    /// Credentials missing or rejected (cloud providers only).
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// The provider is rate limiting this client.
    #[error("rate limited")]
    RateLimited,

    /// The wire response was malformed or unexpected.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The caller cancelled the generation. Not a failure.
    #[error("generation cancelled")]
    Cancelled,
}

impl LlmError {
    /// Whether this error is caller-initiated cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
