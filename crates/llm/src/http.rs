//! Shared HTTP transport for provider adapters.
//!
//! Every remote backend is a JSON-over-HTTP API with either SSE or NDJSON
//! streaming. `HttpProvider` holds the pieces they all need: a shared
//! client, prepared headers, and a base URL. `LineBuffer` reassembles
//! complete lines from the byte stream so an SSE event or NDJSON record
//! split across read chunks is never lost or truncated.

use crate::LlmError;
use reqwest::{
    Client, Method, Response, StatusCode,
    header::{self, HeaderMap},
};
use serde::{Serialize, de::DeserializeOwned};

/// Shared HTTP transport: client + headers + base URL.
#[derive(Clone, Debug)]
pub struct HttpProvider {
    client: Client,
    headers: HeaderMap,
    base_url: String,
}

impl HttpProvider {
    /// Create a transport with `Authorization: Bearer` auth.
    pub fn bearer(client: Client, key: &str, base_url: &str) -> Result<Self, LlmError> {
        let mut headers = json_headers();
        let value = format!("Bearer {key}")
            .parse()
            .map_err(|e| LlmError::Auth(format!("invalid api key: {e}")))?;
        headers.insert(header::AUTHORIZATION, value);
        Ok(Self::with_headers(client, headers, base_url))
    }

    /// Create a transport with a named auth header (e.g. `x-api-key`).
    pub fn custom_header(
        client: Client,
        name: &'static str,
        value: &str,
        base_url: &str,
    ) -> Result<Self, LlmError> {
        let mut headers = json_headers();
        let value = value
            .parse()
            .map_err(|e| LlmError::Auth(format!("invalid api key: {e}")))?;
        headers.insert(name, value);
        Ok(Self::with_headers(client, headers, base_url))
    }

    /// Create a transport without authentication (local backends).
    pub fn no_auth(client: Client, base_url: &str) -> Self {
        Self::with_headers(client, json_headers(), base_url)
    }

    fn with_headers(client: Client, headers: HeaderMap, base_url: &str) -> Self {
        Self {
            client,
            headers,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// The configured base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The prepared request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Add a fixed header after construction (e.g. a protocol version).
    pub fn insert_header(&mut self, name: &'static str, value: &'static str) {
        if let Ok(value) = value.parse() {
            self.headers.insert(name, value);
        }
    }

    /// GET a JSON document from `path` (joined to the base URL).
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, LlmError> {
        tracing::debug!(url = format!("{}{path}", self.base_url), "GET");
        let response = self
            .client
            .request(Method::GET, format!("{}{path}", self.base_url))
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;
        let text = response.text().await.map_err(transport_error)?;
        serde_json::from_str(&text).map_err(|e| LlmError::Decode(e.to_string()))
    }

    /// POST a JSON body to `path` and return the streaming response after
    /// checking its status.
    pub async fn post_stream(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<Response, LlmError> {
        tracing::debug!(url = format!("{}{path}", self.base_url), "POST (streaming)");
        let response = self
            .client
            .request(Method::POST, format!("{}{path}", self.base_url))
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).await
    }
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, "application/json".parse().expect("static header"));
    headers.insert(header::ACCEPT, "application/json".parse().expect("static header"));
    headers
}

/// Map an HTTP status into the failure taxonomy, consuming the response
/// body for the error message. Passes 2xx responses through.
async fn check_status(response: Response) -> Result<Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let snippet = body.chars().take(200).collect::<String>();
    Err(classify_status(status, &snippet))
}

fn classify_status(status: StatusCode, body: &str) -> LlmError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            LlmError::Auth(format!("{status}: {body}"))
        }
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited,
        _ => LlmError::Unreachable(format!("unexpected status {status}: {body}")),
    }
}

/// Map a reqwest transport error into the failure taxonomy.
pub(crate) fn transport_error(e: reqwest::Error) -> LlmError {
    if e.is_decode() {
        LlmError::Decode(e.to_string())
    } else {
        LlmError::Unreachable(e.to_string())
    }
}

impl HttpProvider {
    /// Map a body-stream read error into the failure taxonomy.
    pub fn stream_error(e: reqwest::Error) -> LlmError {
        transport_error(e)
    }
}

/// Reassembles complete lines from a chunked byte stream.
///
/// SSE events and NDJSON records are line-framed but arrive split across
/// arbitrary read boundaries. Bytes are decoded lossily, matching how the
/// backends emit UTF-8 text.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: String,
}

impl LineBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes; returns the complete lines it unlocked,
    /// without trailing `\n`/`\r`.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.push_str(&String::from_utf8_lossy(chunk));
        let mut lines = Vec::new();
        while let Some(at) = self.pending.find('\n') {
            let mut line: String = self.pending.drain(..=at).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }
        lines
    }

    /// Any trailing partial line left after the stream closed.
    pub fn remainder(&self) -> &str {
        &self.pending
    }
}

/// Extract the payload of an SSE `data:` line. Returns `None` for other
/// field lines, comments, and blank keep-alives.
pub fn sse_data(line: &str) -> Option<&str> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data.is_empty() { None } else { Some(data) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_buffer_reassembles_split_lines() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(b"{\"a\":").is_empty());
        let lines = buffer.push(b"1}\n{\"b\":2}\n{\"c\"");
        assert_eq!(lines, vec!["{\"a\":1}", "{\"b\":2}"]);
        assert_eq!(buffer.remainder(), "{\"c\"");
    }

    #[test]
    fn line_buffer_strips_crlf() {
        let mut buffer = LineBuffer::new();
        let lines = buffer.push(b"data: x\r\n\r\n");
        assert_eq!(lines, vec!["data: x", ""]);
    }

    #[test]
    fn sse_data_extraction() {
        assert_eq!(sse_data("data: {\"x\":1}"), Some("{\"x\":1}"));
        assert_eq!(sse_data("data:[DONE]"), Some("[DONE]"));
        assert_eq!(sse_data("event: ping"), None);
        assert_eq!(sse_data(""), None);
        assert_eq!(sse_data("data:"), None);
    }

    #[test]
    fn classify_statuses() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "no key"),
            LlmError::Auth(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, ""),
            LlmError::RateLimited
        ));
        assert!(matches!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            LlmError::Unreachable(_)
        ));
    }
}
