//! Unified provider selection.
//!
//! One `Provider` enum over the four supported backends, constructed once
//! per configuration change by [`build_provider`] and held for the
//! lifetime of that configuration. Call sites never re-derive provider
//! identity from ambient settings.

pub use config::{BackendConfig, LocalConfig, ProviderConfig, RemoteConfig};
pub use llm::Client;
pub use provider::{Provider, build_provider};

pub mod config;
mod provider;
