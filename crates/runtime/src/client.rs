//! High-level chat engine facade.

use crate::config::EngineConfig;
use crate::context::ContextBuilder;
use crate::error::ChatError;
use crate::history::{HistoryFetcher, NewTurn, TurnStore};
use crate::session::{Generation, SessionManager};
use compact_str::CompactString;
use llm::{ChatRequest, Image, LLM, LlmError};
use provider::{Client, Provider, ProviderConfig, build_provider};

/// One engine instance: a provider, a history store, and the single
/// session slot. Clone-free by design; share behind an `Arc` if needed.
pub struct ChatClient<S> {
    provider: Provider,
    provider_config: ProviderConfig,
    config: EngineConfig,
    store: S,
    sessions: SessionManager,
    http: Client,
}

impl<S: TurnStore> ChatClient<S> {
    /// Build an engine from provider and engine config.
    pub fn new(
        provider_config: ProviderConfig,
        config: EngineConfig,
        store: S,
    ) -> anyhow::Result<Self> {
        let http = Client::new();
        let provider = build_provider(&provider_config, http.clone())?;
        Ok(Self {
            provider,
            provider_config,
            config,
            store,
            sessions: SessionManager::new(),
            http,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn provider_config(&self) -> &ProviderConfig {
        &self.provider_config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether a generation is currently running.
    pub fn is_generating(&self) -> bool {
        self.sessions
            .current()
            .is_some_and(|handle| handle.is_running())
    }

    /// Swap the provider. Any in-flight generation is cancelled first,
    /// so no session ever straddles two providers.
    pub async fn set_provider(&mut self, provider_config: ProviderConfig) -> anyhow::Result<()> {
        self.sessions.cancel().await;
        self.provider = build_provider(&provider_config, self.http.clone())?;
        self.provider_config = provider_config;
        tracing::info!(kind = self.provider.kind(), "provider switched");
        Ok(())
    }

    /// List models available on the current provider.
    pub async fn models(&self) -> Result<Vec<CompactString>, LlmError> {
        self.provider.list_models().await
    }

    /// Start a generation for `prompt` in `conversation`.
    ///
    /// Any session still running is cancelled and awaited before the new
    /// one starts, so the new session always wins.
    pub async fn generate(
        &self,
        conversation: &str,
        prompt: &str,
        image: Option<Image>,
        model: &str,
    ) -> Result<Generation, ChatError> {
        self.sessions.cancel().await;

        let turns = HistoryFetcher::new(&self.store, self.config.history_depth)
            .recent(conversation)
            .await?;
        let full_prompt =
            ContextBuilder::new(self.config.prompt_budget).build(&self.config.instruction, &turns, prompt);

        let mut request = ChatRequest::new(full_prompt, model).with_sampling(self.config.sampling);
        if let Some(image) = image {
            request = request.with_image(image);
        }

        let stream = self.provider.stream(request);
        self.sessions.start(stream, model, self.config.commit_interval())
    }

    /// Cancel the active generation, if any, and wait for it to stop.
    pub async fn cancel(&self) {
        self.sessions.cancel().await;
    }

    /// Persist a completed turn.
    pub async fn save_turn(
        &self,
        conversation: &str,
        question: &str,
        answer: &str,
        image: Option<&Image>,
        engine: &str,
    ) -> Result<i64, ChatError> {
        let id = self
            .store
            .append_turn(NewTurn {
                conversation,
                instruction: &self.config.instruction,
                question,
                answer,
                image,
                engine,
            })
            .await?;
        Ok(id)
    }
}
