//! Streaming chat session engine.
//!
//! Ties a [`provider::Provider`] to a conversation store and runs
//! generation sessions over it: prompt assembly under a character
//! budget, at most one live session, coalesced text commits for
//! consumers that repaint, and a throughput footer on completed
//! answers.
//!
//! ```no_run
//! use narwhal_runtime::{ChatClient, EngineConfig, InMemoryStore};
//! use provider::ProviderConfig;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let client = ChatClient::new(
//!     ProviderConfig::ollama(),
//!     EngineConfig::default(),
//!     InMemoryStore::new(),
//! )?;
//! let generation = client.generate("default", "hello", None, "llama3").await?;
//! let _outcome = generation.finish().await?;
//! # Ok(())
//! # }
//! ```

pub use client::ChatClient;
pub use coalesce::{Commit, coalesce};
pub use config::{
    DEFAULT_COMMIT_INTERVAL_MS, DEFAULT_HISTORY_DEPTH, DEFAULT_INSTRUCTION, DEFAULT_PROMPT_BUDGET,
    EngineConfig,
};
pub use context::ContextBuilder;
pub use error::ChatError;
pub use history::{HistoryFetcher, InMemoryStore, NewTurn, StoreError, Turn, TurnStore};
pub use session::{Commits, Completed, Generation, Outcome, SessionHandle, SessionManager, Status};
pub use stats::{annotate, strip, throughput};

mod client;
mod coalesce;
mod config;
mod context;
mod error;
mod history;
mod session;
mod stats;
