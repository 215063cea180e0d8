//! Unified LLM interface types and traits.
//!
//! This crate provides the shared types used across all narwhal providers:
//! `ChatRequest`, `Fragment`, `StreamChunk`, the `LlmError` taxonomy, and
//! the `LLM` trait. Behind the default `http` feature it also provides
//! `HttpProvider` for shared HTTP transport plus the line framing used to
//! decode SSE and NDJSON response streams.

pub use error::LlmError;
pub use fragment::Fragment;
#[cfg(feature = "http")]
pub use http::{HttpProvider, LineBuffer, sse_data};
pub use provider::LLM;
pub use request::{ChatRequest, Image, Sampling};
#[cfg(feature = "http")]
pub use reqwest::{self, Client};
pub use stream::{Delta, StreamChoice, StreamChunk};

mod error;
mod fragment;
#[cfg(feature = "http")]
mod http;
mod provider;
mod request;
mod stream;
