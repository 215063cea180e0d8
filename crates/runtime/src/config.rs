//! Engine configuration.

use llm::Sampling;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default system instruction prepended to every assembled prompt.
pub const DEFAULT_INSTRUCTION: &str = "You are a helpful assistant.";

/// Default character budget for an assembled prompt.
pub const DEFAULT_PROMPT_BUDGET: usize = 8000;

/// Default number of prior turns considered for context.
pub const DEFAULT_HISTORY_DEPTH: usize = 10;

/// Default coalescing interval for text commits, in milliseconds.
pub const DEFAULT_COMMIT_INTERVAL_MS: u64 = 100;

/// Tunables for the session engine.
///
/// Every field has a serde default, so a partial (or empty) config
/// document deserializes to a working engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// System instruction placed at the top of every prompt.
    #[serde(default = "default_instruction")]
    pub instruction: String,
    /// Upper bound on assembled prompt size.
    #[serde(default = "default_prompt_budget")]
    pub prompt_budget: usize,
    /// How many prior turns are eligible for inclusion in the prompt.
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
    /// Minimum spacing between coalesced text commits.
    #[serde(default = "default_commit_interval_ms")]
    pub commit_interval_ms: u64,
    /// Sampling parameters forwarded to the provider.
    #[serde(default)]
    pub sampling: Sampling,
}

impl EngineConfig {
    /// Commit interval as a [`Duration`].
    pub fn commit_interval(&self) -> Duration {
        Duration::from_millis(self.commit_interval_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            instruction: default_instruction(),
            prompt_budget: DEFAULT_PROMPT_BUDGET,
            history_depth: DEFAULT_HISTORY_DEPTH,
            commit_interval_ms: DEFAULT_COMMIT_INTERVAL_MS,
            sampling: Sampling::default(),
        }
    }
}

fn default_instruction() -> String {
    DEFAULT_INSTRUCTION.to_string()
}

fn default_prompt_budget() -> usize {
    DEFAULT_PROMPT_BUDGET
}

fn default_history_depth() -> usize {
    DEFAULT_HISTORY_DEPTH
}

fn default_commit_interval_ms() -> u64 {
    DEFAULT_COMMIT_INTERVAL_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.instruction, DEFAULT_INSTRUCTION);
        assert_eq!(config.prompt_budget, DEFAULT_PROMPT_BUDGET);
        assert_eq!(config.history_depth, DEFAULT_HISTORY_DEPTH);
        assert_eq!(config.commit_interval(), Duration::from_millis(100));
    }

    #[test]
    fn partial_document_overrides_one_field() {
        let config: EngineConfig = serde_json::from_str(r#"{"history_depth": 3}"#).unwrap();
        assert_eq!(config.history_depth, 3);
        assert_eq!(config.prompt_budget, DEFAULT_PROMPT_BUDGET);
    }
}
