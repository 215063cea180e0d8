//! Provider configuration.
//!
//! Uses `#[serde(tag = "provider", flatten)]` so all fields appear at the
//! same level in TOML/JSON. The two local backends take an optional base
//! URL and port override; the two cloud backends take an API key and an
//! optional base URL override.

use serde::{Deserialize, Serialize};
use url::Url;

/// Provider configuration: which backend, and how to reach it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Backend-specific settings, discriminated by the `provider` field.
    #[serde(flatten)]
    pub backend: BackendConfig,
}

impl ProviderConfig {
    /// Configuration for a local Ollama instance.
    pub fn ollama() -> Self {
        Self {
            backend: BackendConfig::Ollama(LocalConfig::default()),
        }
    }

    /// Configuration for a local LM Studio instance.
    pub fn lmstudio() -> Self {
        Self {
            backend: BackendConfig::LmStudio(LocalConfig::default()),
        }
    }

    /// Configuration for the Anthropic API.
    pub fn claude(api_key: impl Into<String>) -> Self {
        Self {
            backend: BackendConfig::Claude(RemoteConfig {
                api_key: api_key.into(),
                base_url: None,
            }),
        }
    }

    /// Configuration for the OpenAI API.
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            backend: BackendConfig::OpenAI(RemoteConfig {
                api_key: api_key.into(),
                base_url: None,
            }),
        }
    }

    /// Human-readable provider kind string for logging.
    pub fn kind(&self) -> &'static str {
        match &self.backend {
            BackendConfig::Ollama(_) => "ollama",
            BackendConfig::LmStudio(_) => "lmstudio",
            BackendConfig::Claude(_) => "claude",
            BackendConfig::OpenAI(_) => "openai",
        }
    }

    /// Validate the configuration without building a provider.
    pub fn validate(&self) -> anyhow::Result<()> {
        match &self.backend {
            BackendConfig::Ollama(lc) | BackendConfig::LmStudio(lc) => {
                if let Some(base_url) = &lc.base_url {
                    Url::parse(base_url)?;
                }
                Ok(())
            }
            BackendConfig::Claude(rc) | BackendConfig::OpenAI(rc) => {
                if rc.api_key.is_empty() {
                    anyhow::bail!("{} provider requires an api key", self.kind());
                }
                if let Some(base_url) = &rc.base_url {
                    Url::parse(base_url)?;
                }
                Ok(())
            }
        }
    }
}

/// Backend-specific configuration, discriminated by the `provider` field.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Local Ollama inference server.
    Ollama(LocalConfig),
    /// Local LM Studio server (OpenAI-compatible).
    #[serde(rename = "lmstudio")]
    LmStudio(LocalConfig),
    /// Anthropic Messages API.
    Claude(RemoteConfig),
    /// OpenAI API.
    #[serde(rename = "openai")]
    OpenAI(RemoteConfig),
}

/// Configuration for the local backends.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct LocalConfig {
    /// Optional base URL override (e.g. `http://192.168.1.10:11434`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Optional port override applied to the base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl LocalConfig {
    /// Resolve the effective base URL against a backend default,
    /// applying the port override if present.
    pub fn effective_base_url(&self, default: &str) -> anyhow::Result<String> {
        let base = self.base_url.as_deref().unwrap_or(default);
        let mut url = Url::parse(base)?;
        if let Some(port) = self.port
            && url.set_port(Some(port)).is_err()
        {
            anyhow::bail!("cannot set port on base url {base}");
        }
        Ok(url.as_str().trim_end_matches('/').to_owned())
    }
}

/// Configuration for the cloud backends.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RemoteConfig {
    /// API key.
    #[serde(default)]
    pub api_key: String,
    /// Optional base URL override for the provider endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}
