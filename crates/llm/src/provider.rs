//! Provider abstraction for the unified LLM interfaces.

use crate::{ChatRequest, Fragment, LlmError};
use compact_str::CompactString;
use futures_core::Stream;

/// A trait for LLM providers.
///
/// Each backend owns its own request encoding and response decoding, but
/// all normalize to the same `Fragment` sequence: text chunks in emission
/// order, terminated by success or a single `LlmError`.
pub trait LLM: Clone {
    /// List the model identifiers available at this backend.
    fn list_models(
        &self,
    ) -> impl Future<Output = Result<Vec<CompactString>, LlmError>> + Send;

    /// Open one streaming generation for the given request.
    fn stream(
        &self,
        request: ChatRequest,
    ) -> impl Stream<Item = Result<Fragment, LlmError>> + Send + 'static;
}
