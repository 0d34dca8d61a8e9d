//! Global configuration types for SparkAI.
//!
//! `SparkConfig` represents the top-level `config.toml` that controls the
//! completion provider and session persistence.

use serde::{Deserialize, Serialize};

use crate::llm::GenerationSettings;

/// Top-level configuration.
///
/// Loaded from `~/.sparkai/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SparkConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Completion provider settings (`[provider]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// OpenAI-compatible endpoint. `DEEPSEEK_BASE_URL` overrides it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(flatten)]
    pub generation: GenerationSettings,
}

fn default_base_url() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_api_key_env() -> String {
    "DEEPSEEK_API_KEY".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            generation: GenerationSettings::default(),
        }
    }
}

/// Session persistence settings (`[storage]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Quiet window before a scheduled snapshot write runs.
    #[serde(default = "default_snapshot_debounce_ms")]
    pub snapshot_debounce_ms: u64,
}

fn default_snapshot_debounce_ms() -> u64 {
    500
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_debounce_ms: default_snapshot_debounce_ms(),
        }
    }
}
