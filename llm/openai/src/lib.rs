//! OpenAI provider.
//!
//! `POST /v1/chat/completions` (SSE) with `Authorization: Bearer` auth and
//! `GET /v1/models`. When an image is attached the caller's model is
//! overridden to the fixed vision-capable model [`VISION_MODEL`]; the
//! image travels as a `data:` URL content part.

use async_stream::try_stream;
use compact_str::CompactString;
use futures_util::StreamExt;
use llm::{
    ChatRequest, Client, Fragment, HttpProvider, LLM, LineBuffer, LlmError, StreamChunk, sse_data,
};
pub use request::{ChatBody, ContentPart};
use serde::Deserialize;

mod request;

/// Default OpenAI endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Model forced whenever an image is attached.
pub const VISION_MODEL: &str = "gpt-4o";

/// An OpenAI provider instance.
#[derive(Clone)]
pub struct OpenAI {
    http: HttpProvider,
}

impl OpenAI {
    /// Create a provider targeting the OpenAI API.
    pub fn api(client: Client, key: &str) -> Result<Self, LlmError> {
        Self::custom(client, key, DEFAULT_BASE_URL)
    }

    /// Create a provider targeting a custom OpenAI-compatible endpoint.
    pub fn custom(client: Client, key: &str, base_url: &str) -> Result<Self, LlmError> {
        Ok(Self {
            http: HttpProvider::bearer(client, key, base_url)?,
        })
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

impl LLM for OpenAI {
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
            let body = ChatBody::from(request);
            tracing::debug!(model = %body.model, "opening openai completion stream");
            let response = http.post_stream("/v1/chat/completions", &body).await?;
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

/// Decode chat-completion SSE data lines into fragments. Ends at the
/// `[DONE]` marker; non-data lines and undecodable payloads are skipped.
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
                if data == "[DONE]" {
                    break 'read;
                }
                match serde_json::from_str::<StreamChunk>(data) {
                    Ok(event) => {
                        if let Some(fragment) = event.content().and_then(Fragment::new) {
                            yield fragment;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("undecodable openai chunk: {e}, data: {data}");
                    }
                }
            }
        }
    }
}
