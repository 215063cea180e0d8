//! Anthropic Messages API provider.
//!
//! Auth is an `x-api-key` header plus a pinned `anthropic-version`.
//! Streaming uses SSE with typed events (see [`stream`]); images travel
//! as base64 content blocks alongside the prompt text, under the
//! caller's chosen model.

use async_stream::try_stream;
use compact_str::CompactString;
use futures_util::StreamExt;
use llm::{ChatRequest, Client, Fragment, HttpProvider, LLM, LineBuffer, LlmError, sse_data};
pub use request::MessagesRequest;
use serde::Deserialize;
pub use stream::Event;

mod request;
pub mod stream;

/// Default Anthropic endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Pinned API version header value.
pub const API_VERSION: &str = "2023-06-01";

/// Output token ceiling sent with every request; the engine bounds input
/// size itself through the prompt budget.
pub const MAX_TOKENS: u32 = 4096;

/// An Anthropic provider instance.
#[derive(Clone)]
pub struct Claude {
    http: HttpProvider,
}

impl Claude {
    /// Create a provider targeting the Anthropic API.
    pub fn anthropic(client: Client, key: &str) -> Result<Self, LlmError> {
        Self::custom(client, key, DEFAULT_BASE_URL)
    }

    /// Create a provider targeting a custom Messages-compatible endpoint.
    pub fn custom(client: Client, key: &str, base_url: &str) -> Result<Self, LlmError> {
        let mut http = HttpProvider::custom_header(client, "x-api-key", key, base_url)?;
        http.insert_header("anthropic-version", API_VERSION);
        Ok(Self { http })
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}

#[derive(Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: CompactString,
}

impl LLM for Claude {
    async fn list_models(&self) -> Result<Vec<CompactString>, LlmError> {
        let models: ModelsResponse = self.http.get_json("/v1/models").await?;
        Ok(models.data.into_iter().map(|m| m.id).collect())
    }

    fn stream(
        &self,
        request: ChatRequest,
    ) -> impl futures_util::Stream<Item = Result<Fragment, LlmError>> + Send + 'static {
        let http = self.http.clone();
        try_stream! {
            let body = MessagesRequest::from(request);
            tracing::debug!(model = %body.model, "opening anthropic message stream");
            let response = http.post_stream("/v1/messages", &body).await?;
            let bytes = response
                .bytes_stream()
                .map(|chunk| chunk.map_err(HttpProvider::stream_error));
            let mut fragments = std::pin::pin!(decode_stream(bytes));
            while let Some(fragment) = fragments.next().await {
                yield fragment?;
            }
        }
    }
}

/// Decode typed SSE events into fragments. Ends at `message_stop`;
/// undecodable events are skipped with a warning; in-band `error` events
/// fail the stream through the event conversion.
fn decode_stream<B, C>(
    bytes: B,
) -> impl futures_util::Stream<Item = Result<Fragment, LlmError>> + Send + 'static
where
    B: futures_util::Stream<Item = Result<C, LlmError>> + Send + 'static,
    C: AsRef<[u8]> + Send + 'static,
{
    try_stream! {
        let mut bytes = std::pin::pin!(bytes);
        let mut lines = LineBuffer::new();
        'read: while let Some(chunk) = bytes.next().await {
            let chunk = chunk?;
            for line in lines.push(chunk.as_ref()) {
                let Some(data) = sse_data(&line) else {
                    continue;
                };
                let event: Event = match serde_json::from_str(data) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!("undecodable anthropic event: {e}, data: {data}");
                        continue;
                    }
                };
                let done = matches!(event, Event::MessageStop);
                if let Some(fragment) = event.into_fragment()? {
                    yield fragment;
                }
                if done {
                    break 'read;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(
        parts: &[&'static str],
    ) -> impl futures_util::Stream<Item = Result<&'static [u8], LlmError>> {
        futures_util::stream::iter(parts.iter().map(|p| Ok(p.as_bytes())).collect::<Vec<_>>())
    }

    async fn collect(
        stream: impl futures_util::Stream<Item = Result<Fragment, LlmError>>,
    ) -> Vec<Result<String, LlmError>> {
        let mut stream = std::pin::pin!(stream);
        let mut out = Vec::new();
        while let Some(item) = stream.next().await {
            out.push(item.map(Fragment::into_text));
        }
        out
    }

    #[tokio::test]
    async fn decode_joins_deltas_and_stops_at_message_stop() {
        let stream = decode_stream(chunks(&[
            "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":0,\
             \"delta\":{\"type\":\"text_delta\",\"text\":\"Hel\"}}\n\n",
            "data: {\"type\":\"ping\"}\n\ndata: {\"type\":\"content_block_delta\",\"index\":0,\
             \"delta\":{\"type\":\"text_delta\",\"text\":\"lo\"}}\n\n",
            "data: {\"type\":\"message_stop\"}\n\n",
            "data: {\"type\":\"content_block_delta\",\"index\":0,\
             \"delta\":{\"type\":\"text_delta\",\"text\":\"after the end\"}}\n\n",
        ]));
        let out = collect(stream).await;
        assert_eq!(out, [Ok("Hel".to_string()), Ok("lo".to_string())]);
    }

    #[tokio::test]
    async fn decode_skips_undecodable_events() {
        let stream = decode_stream(chunks(&[
            "data: this is not json\n\n",
            "data: {\"type\":\"content_block_delta\",\"index\":0,\
             \"delta\":{\"type\":\"text_delta\",\"text\":\"ok\"}}\n\n",
            "data: {\"type\":\"message_stop\"}\n\n",
        ]));
        assert_eq!(collect(stream).await, [Ok("ok".to_string())]);
    }

    #[tokio::test]
    async fn decode_fails_on_inband_error_event() {
        let stream = decode_stream(chunks(&[
            "data: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\
             \"message\":\"busy\"}}\n\n",
        ]));
        let out = collect(stream).await;
        assert_eq!(out, [Err(LlmError::RateLimited)]);
    }
}
