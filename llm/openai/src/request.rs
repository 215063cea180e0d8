//! Request body for the OpenAI chat completions API.

use crate::VISION_MODEL;
use compact_str::CompactString;
use llm::ChatRequest;
use serde::Serialize;

/// `POST /v1/chat/completions` body.
#[derive(Debug, Serialize)]
pub struct ChatBody {
    /// Model name; forced to [`VISION_MODEL`] when an image is attached.
    pub model: CompactString,
    /// One user message carrying the assembled prompt (and image, if any).
    pub messages: Vec<MessageBody>,
    /// Always true; narwhal only consumes the streaming form.
    pub stream: bool,
    pub temperature: f64,
    pub top_p: f64,
}

/// One message in the request.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub role: &'static str,
    pub content: Vec<ContentPart>,
}

/// One content part within a message.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Prompt text.
    Text { text: String },
    /// Image as a `data:` URL.
    ImageUrl { image_url: ImageUrl },
}

/// The `image_url` payload.
#[derive(Debug, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

impl From<ChatRequest> for ChatBody {
    fn from(request: ChatRequest) -> Self {
        let model = if request.image.is_some() {
            CompactString::const_new(VISION_MODEL)
        } else {
            request.model
        };

        let mut content = vec![ContentPart::Text {
            text: request.prompt,
        }];
        if let Some(image) = &request.image {
            content.push(ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: image.to_data_url(),
                },
            });
        }

        Self {
            model,
            messages: vec![MessageBody {
                role: "user",
                content,
            }],
            stream: true,
            temperature: request.sampling.temperature,
            top_p: request.sampling.top_p,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm::Image;

    #[test]
    fn text_request_keeps_caller_model() {
        let body = ChatBody::from(ChatRequest::new("hi", "gpt-4o-mini"));
        assert_eq!(body.model, "gpt-4o-mini");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["content"][0]["type"], "text");
        assert_eq!(json["stream"], true);
    }

    #[test]
    fn image_forces_vision_model() {
        let request = ChatRequest::new("what is this", "gpt-4o-mini")
            .with_image(Image::png(vec![1, 2, 3]));
        let body = ChatBody::from(request);
        assert_eq!(body.model, VISION_MODEL);
        let json = serde_json::to_value(&body).unwrap();
        let parts = json["messages"][0]["content"].as_array().unwrap();
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(
            parts[1]["image_url"]["url"],
            "data:image/png;base64,AQID"
        );
    }
}
