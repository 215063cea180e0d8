//! Request body for the Ollama generate API.

use compact_str::CompactString;
use llm::ChatRequest;
use serde::Serialize;

/// `POST /api/generate` body.
#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    /// Model name, exactly as the caller chose it.
    pub model: CompactString,
    /// The assembled prompt.
    pub prompt: String,
    /// Always true; narwhal only consumes the streaming form.
    pub stream: bool,
    /// Base64-encoded image attachments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    /// Sampling options.
    pub options: Options,
}

/// Ollama sampling options.
#[derive(Debug, Serialize)]
pub struct Options {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
}

impl From<ChatRequest> for GenerateRequest {
    fn from(request: ChatRequest) -> Self {
        Self {
            model: request.model,
            prompt: request.prompt,
            stream: true,
            images: request.image.map(|image| vec![image.to_base64()]),
            options: Options {
                temperature: request.sampling.temperature,
                top_p: request.sampling.top_p,
                top_k: request.sampling.top_k,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm::{Image, Sampling};

    #[test]
    fn text_request_omits_images() {
        let body = GenerateRequest::from(
            ChatRequest::new("User: hi\nAssistant:", "llama3").with_sampling(Sampling {
                temperature: 0.5,
                top_p: 0.9,
                top_k: 40,
            }),
        );
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "llama3");
        assert_eq!(json["stream"], true);
        assert_eq!(json["options"]["temperature"], 0.5);
        assert!(json.get("images").is_none());
    }

    #[test]
    fn image_passes_through_under_caller_model() {
        let body = GenerateRequest::from(
            ChatRequest::new("describe this", "llava").with_image(Image::png(vec![1, 2, 3])),
        );
        assert_eq!(body.model, "llava");
        assert_eq!(body.images.as_deref(), Some(&["AQID".to_owned()][..]));
    }
}
