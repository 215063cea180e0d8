//! Provider implementation.
//!
//! Unified `Provider` enum with enum dispatch over the concrete backends.
//! Built once per configuration change; switching configurations means
//! building a fresh `Provider` (and cancelling any session bound to the
//! old one — the runtime enforces that part).

use crate::config::{BackendConfig, ProviderConfig};
use anyhow::Result;
use async_stream::try_stream;
use claude::Claude;
use compact_str::CompactString;
use futures_core::Stream;
use futures_util::StreamExt;
use llm::{ChatRequest, Fragment, LLM, LlmError};
use lmstudio::LmStudio;
use ollama::Ollama;
use openai::OpenAI;

/// Unified LLM provider enum.
#[derive(Clone)]
pub enum Provider {
    /// Local Ollama inference server.
    Ollama(Ollama),
    /// Local LM Studio server.
    LmStudio(LmStudio),
    /// Anthropic Messages API.
    Claude(Claude),
    /// OpenAI API.
    OpenAI(OpenAI),
}

impl Provider {
    /// Human-readable provider kind string for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ollama(_) => "ollama",
            Self::LmStudio(_) => "lmstudio",
            Self::Claude(_) => "claude",
            Self::OpenAI(_) => "openai",
        }
    }
}

/// Construct a `Provider` from config and a shared HTTP client.
pub fn build_provider(config: &ProviderConfig, client: llm::Client) -> Result<Provider> {
    config.validate()?;
    let provider = match &config.backend {
        BackendConfig::Ollama(lc) => {
            let base_url = lc.effective_base_url(ollama::DEFAULT_BASE_URL)?;
            Provider::Ollama(Ollama::new(client, &base_url))
        }
        BackendConfig::LmStudio(lc) => {
            let base_url = lc.effective_base_url(lmstudio::DEFAULT_BASE_URL)?;
            Provider::LmStudio(LmStudio::new(client, &base_url))
        }
        BackendConfig::Claude(rc) => match &rc.base_url {
            Some(url) => Provider::Claude(Claude::custom(client, &rc.api_key, url)?),
            None => Provider::Claude(Claude::anthropic(client, &rc.api_key)?),
        },
        BackendConfig::OpenAI(rc) => match &rc.base_url {
            Some(url) => Provider::OpenAI(OpenAI::custom(client, &rc.api_key, url)?),
            None => Provider::OpenAI(OpenAI::api(client, &rc.api_key)?),
        },
    };
    Ok(provider)
}

impl LLM for Provider {
    async fn list_models(&self) -> Result<Vec<CompactString>, LlmError> {
        match self {
            Self::Ollama(p) => p.list_models().await,
            Self::LmStudio(p) => p.list_models().await,
            Self::Claude(p) => p.list_models().await,
            Self::OpenAI(p) => p.list_models().await,
        }
    }

    fn stream(
        &self,
        request: ChatRequest,
    ) -> impl Stream<Item = Result<Fragment, LlmError>> + Send + 'static {
        let this = self.clone();
        try_stream! {
            match this {
                Provider::Ollama(p) => {
                    let mut stream = std::pin::pin!(p.stream(request));
                    while let Some(fragment) = stream.next().await {
                        yield fragment?;
                    }
                }
                Provider::LmStudio(p) => {
                    let mut stream = std::pin::pin!(p.stream(request));
                    while let Some(fragment) = stream.next().await {
                        yield fragment?;
                    }
                }
                Provider::Claude(p) => {
                    let mut stream = std::pin::pin!(p.stream(request));
                    while let Some(fragment) = stream.next().await {
                        yield fragment?;
                    }
                }
                Provider::OpenAI(p) => {
                    let mut stream = std::pin::pin!(p.stream(request));
                    while let Some(fragment) = stream.next().await {
                        yield fragment?;
                    }
                }
            }
        }
    }
}
