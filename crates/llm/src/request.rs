//! Generic generation request.

use base64::Engine;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A generation request, constructed fresh per call and never mutated
/// after submission.
///
/// The prompt is already assembled under the caller's character budget;
/// adapters translate it into their wire format without reshaping it.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// The assembled prompt (instruction + history + user prompt).
    pub prompt: String,
    /// The model to use. Adapters may override this (the OpenAI cloud
    /// adapter forces a vision model when an image is attached).
    pub model: CompactString,
    /// Optional image attachment.
    pub image: Option<Image>,
    /// Sampling parameters, passed through unexamined.
    pub sampling: Sampling,
}

impl ChatRequest {
    /// Create a text-only request with default sampling.
    pub fn new(prompt: impl Into<String>, model: impl Into<CompactString>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            image: None,
            sampling: Sampling::default(),
        }
    }

    /// Attach an image to this request.
    pub fn with_image(mut self, image: Image) -> Self {
        self.image = Some(image);
        self
    }

    /// Set the sampling parameters.
    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }
}

/// An image attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// MIME type, e.g. `image/png`.
    pub media_type: CompactString,
}

impl Image {
    /// Create an image attachment.
    pub fn new(data: Vec<u8>, media_type: impl Into<CompactString>) -> Self {
        Self {
            data,
            media_type: media_type.into(),
        }
    }

    /// Create a PNG attachment.
    pub fn png(data: Vec<u8>) -> Self {
        Self::new(data, "image/png")
    }

    /// Base64-encode the image bytes for wire transfer.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Render as a `data:` URL for OpenAI-style `image_url` parts.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.to_base64())
    }
}

/// Sampling parameters, forwarded to the backend unexamined.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Sampling {
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Nucleus sampling cutoff.
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    /// Top-k sampling cutoff.
    #[serde(default = "default_top_k")]
    pub top_k: u32,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
        }
    }
}

fn default_temperature() -> f64 {
    0.8
}

fn default_top_p() -> f64 {
    0.9
}

fn default_top_k() -> u32 {
    40
}
