//! LM Studio provider.
//!
//! LM Studio exposes the OpenAI chat completions API on a local port with
//! no authentication: `POST /v1/chat/completions` (SSE) and
//! `GET /v1/models`. The backend has no image support, so attachments are
//! dropped silently rather than rejected.

use async_stream::try_stream;
use compact_str::CompactString;
use futures_util::StreamExt;
use llm::{
    ChatRequest, Client, Fragment, HttpProvider, LLM, LineBuffer, LlmError, StreamChunk, sse_data,
};
use serde::{Deserialize, Serialize};

/// Default LM Studio endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:1234";

/// An LM Studio provider instance.
#[derive(Clone)]
pub struct LmStudio {
    http: HttpProvider,
}

impl LmStudio {
    /// Create a provider targeting the given base URL.
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            http: HttpProvider::no_auth(client, base_url),
        }
    }

    /// Create a provider targeting a local LM Studio instance.
    pub fn localhost(client: Client) -> Self {
        Self::new(client, DEFAULT_BASE_URL)
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}

/// `POST /v1/chat/completions` body.
#[derive(Debug, Serialize)]
pub struct ChatBody {
    model: CompactString,
    messages: Vec<UserMessage>,
    stream: bool,
    temperature: f64,
    top_p: f64,
}

#[derive(Debug, Serialize)]
struct UserMessage {
    role: &'static str,
    content: String,
}

impl From<ChatRequest> for ChatBody {
    fn from(request: ChatRequest) -> Self {
        if request.image.is_some() {
            // LM Studio lacks image support; not an error.
            tracing::debug!("dropping image attachment for lm studio backend");
        }
        Self {
            model: request.model,
            messages: vec![UserMessage {
                role: "user",
                content: request.prompt,
            }],
            stream: true,
            temperature: request.sampling.temperature,
            top_p: request.sampling.top_p,
        }
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

impl LLM for LmStudio {
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
            tracing::debug!(model = %body.model, "opening lm studio completion stream");
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
                        tracing::warn!("undecodable lm studio chunk: {e}, data: {data}");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm::Image;

    fn chunks(
        parts: &[&'static str],
    ) -> impl futures_util::Stream<Item = Result<&'static [u8], LlmError>> {
        futures_util::stream::iter(parts.iter().map(|p| Ok(p.as_bytes())).collect::<Vec<_>>())
    }

    async fn texts(
        stream: impl futures_util::Stream<Item = Result<Fragment, LlmError>>,
    ) -> Vec<String> {
        let mut stream = std::pin::pin!(stream);
        let mut out = Vec::new();
        while let Some(item) = stream.next().await {
            out.push(item.unwrap().into_text());
        }
        out
    }

    #[tokio::test]
    async fn decode_reassembles_split_events_and_stops_at_done_marker() {
        let stream = decode_stream(chunks(&[
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\ndata: {\"choi",
            "ces\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
            "data: [DONE]\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"after the end\"}}]}\n\n",
        ]));
        assert_eq!(texts(stream).await, ["Hel", "lo"]);
    }

    #[tokio::test]
    async fn decode_skips_non_data_lines_and_undecodable_payloads() {
        let stream = decode_stream(chunks(&[
            ": keep-alive\n\nevent: ping\n\ndata: not json\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"\"},\"finish_reason\":\"stop\"}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n\ndata: [DONE]\n\n",
        ]));
        assert_eq!(texts(stream).await, ["ok"]);
    }

    #[test]
    fn body_is_single_user_message() {
        let body = ChatBody::from(ChatRequest::new("hello", "qwen2.5-7b"));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
        assert_eq!(json["stream"], true);
    }

    #[test]
    fn image_is_dropped_silently() {
        let request = ChatRequest::new("hello", "qwen2.5-7b").with_image(Image::png(vec![0]));
        let body = ChatBody::from(request);
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("images").is_none());
        assert_eq!(body.model, "qwen2.5-7b");
    }
}
