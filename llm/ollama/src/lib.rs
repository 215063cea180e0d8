//! Ollama provider.
//!
//! Speaks the native Ollama API: `POST /api/generate` for NDJSON streaming
//! generation and `GET /api/tags` for the installed model list. Takes the
//! assembled prompt as-is; images pass through base64-encoded under the
//! caller's chosen model.

use async_stream::try_stream;
use compact_str::CompactString;
use futures_util::StreamExt;
use llm::{ChatRequest, Client, Fragment, HttpProvider, LLM, LineBuffer, LlmError};
pub use request::{GenerateRequest, Options};
use serde::Deserialize;
pub use stream::GenerateChunk;

mod request;
mod stream;

/// Default Ollama endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// An Ollama provider instance.
#[derive(Clone)]
pub struct Ollama {
    http: HttpProvider,
}

impl Ollama {
    /// Create a provider targeting the given base URL.
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            http: HttpProvider::no_auth(client, base_url),
        }
    }

    /// Create a provider targeting a local Ollama instance.
    pub fn localhost(client: Client) -> Self {
        Self::new(client, DEFAULT_BASE_URL)
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: CompactString,
}

impl LLM for Ollama {
    async fn list_models(&self) -> Result<Vec<CompactString>, LlmError> {
        let tags: TagsResponse = self.http.get_json("/api/tags").await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    fn stream(
        &self,
        request: ChatRequest,
    ) -> impl futures_util::Stream<Item = Result<Fragment, LlmError>> + Send + 'static {
        let http = self.http.clone();
        try_stream! {
            let body = GenerateRequest::from(request);
            tracing::debug!(model = %body.model, "opening ollama generate stream");
            let response = http.post_stream("/api/generate", &body).await?;
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

/// Decode NDJSON generate chunks into fragments. Ends at the `done`
/// record; undecodable lines are skipped with a warning; an in-band
/// `error` record fails the stream.
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
                if line.is_empty() {
                    continue;
                }
                let event: GenerateChunk = match serde_json::from_str(&line) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!("undecodable ollama chunk: {e}, line: {line}");
                        continue;
                    }
                };
                if let Some(message) = event.error {
                    Err(LlmError::Decode(message))?;
                }
                if let Some(fragment) = Fragment::new(event.response) {
                    yield fragment;
                }
                if event.done {
                    break 'read;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(parts: &[&'static str]) -> impl futures_util::Stream<Item = Result<&'static [u8], LlmError>> {
        futures_util::stream::iter(parts.iter().map(|p| Ok(p.as_bytes())).collect::<Vec<_>>())
    }

    async fn texts(
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
    async fn decode_reassembles_split_records_and_stops_at_done() {
        let stream = decode_stream(chunks(&[
            "{\"response\":\"Hel\",\"done\":false}\n{\"respo",
            "nse\":\"lo\",\"done\":false}\n",
            "{\"response\":\"\",\"done\":true}\n",
            "{\"response\":\"after the end\",\"done\":false}\n",
        ]));
        let out = texts(stream).await;
        assert_eq!(out, [Ok("Hel".to_string()), Ok("lo".to_string())]);
    }

    #[tokio::test]
    async fn decode_skips_undecodable_lines() {
        let stream = decode_stream(chunks(&[
            "not json at all\n",
            "{\"response\":\"ok\",\"done\":true}\n",
        ]));
        assert_eq!(texts(stream).await, [Ok("ok".to_string())]);
    }

    #[tokio::test]
    async fn decode_fails_on_inband_error_record() {
        let stream = decode_stream(chunks(&[
            "{\"response\":\"x\",\"done\":false}\n",
            "{\"error\":\"model not found\"}\n",
        ]));
        let out = texts(stream).await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Ok("x".to_string()));
        assert_eq!(out[1], Err(LlmError::Decode("model not found".to_string())));
    }
}
