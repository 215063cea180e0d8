//! Request body for the Anthropic Messages API.

use crate::MAX_TOKENS;
use compact_str::CompactString;
use llm::ChatRequest;
use serde::Serialize;

/// `POST /v1/messages` body.
#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    /// Model name, exactly as the caller chose it.
    pub model: CompactString,
    /// Required output token ceiling.
    pub max_tokens: u32,
    /// Always true; narwhal only consumes the streaming form.
    pub stream: bool,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    /// One user message carrying the assembled prompt (and image, if any).
    pub messages: Vec<MessageBody>,
}

/// One message in the request.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub role: &'static str,
    pub content: Vec<ContentPart>,
}

/// One content block within a message.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Prompt text.
    Text { text: String },
    /// Base64 image block.
    Image { source: ImageSource },
}

/// Base64 image source.
#[derive(Debug, Serialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub media_type: CompactString,
    pub data: String,
}

impl From<ChatRequest> for MessagesRequest {
    fn from(request: ChatRequest) -> Self {
        let mut content = Vec::with_capacity(2);
        if let Some(image) = &request.image {
            content.push(ContentPart::Image {
                source: ImageSource {
                    kind: "base64",
                    media_type: image.media_type.clone(),
                    data: image.to_base64(),
                },
            });
        }
        content.push(ContentPart::Text {
            text: request.prompt,
        });

        Self {
            model: request.model,
            max_tokens: MAX_TOKENS,
            stream: true,
            temperature: request.sampling.temperature,
            top_p: request.sampling.top_p,
            top_k: request.sampling.top_k,
            messages: vec![MessageBody {
                role: "user",
                content,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm::Image;

    #[test]
    fn text_request_is_one_text_block() {
        let body = MessagesRequest::from(ChatRequest::new("hi", "claude-sonnet-4-5"));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"][0]["type"], "text");
        assert_eq!(json["messages"][0]["content"][0]["text"], "hi");
        assert_eq!(json["max_tokens"], 4096);
        assert_eq!(json["stream"], true);
    }

    #[test]
    fn image_travels_as_base64_block_under_caller_model() {
        let request =
            ChatRequest::new("what is this", "claude-sonnet-4-5").with_image(Image::png(vec![9]));
        let body = MessagesRequest::from(request);
        assert_eq!(body.model, "claude-sonnet-4-5");
        let json = serde_json::to_value(&body).unwrap();
        let blocks = json["messages"][0]["content"].as_array().unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0]["type"], "image");
        assert_eq!(blocks[0]["source"]["type"], "base64");
        assert_eq!(blocks[0]["source"]["media_type"], "image/png");
        assert_eq!(blocks[1]["type"], "text");
    }
}
