//! NDJSON event decoding for the Ollama generate stream.

use serde::Deserialize;

/// One NDJSON record from `POST /api/generate`.
///
/// The final record carries `done: true` together with timing fields
/// narwhal does not consume. In-band errors arrive as `{"error": "..."}`.
#[derive(Debug, Deserialize)]
pub struct GenerateChunk {
    /// Incremental response text.
    #[serde(default)]
    pub response: String,
    /// Whether this is the final record.
    #[serde(default)]
    pub done: bool,
    /// In-band error message.
    #[serde(default)]
    pub error: Option<String>,
}
