//! Configuration for the OpenAI-compatible provider.
//!
//! [`OpenAiCompatConfig::from_provider_config`] turns the `[provider]` table of
//! `config.toml` into a ready config, reading the API key from the environment
//! variable the table names.

use secrecy::SecretString;

use sparkai_types::config::ProviderConfig;
use sparkai_types::llm::{LlmError, ProviderCapabilities};

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "deepseek").
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.deepseek.com").
    pub base_url: String,
    pub api_key: SecretString,
    /// Model used when a request leaves `model` empty.
    pub model: String,
    pub capabilities: ProviderCapabilities,
}

impl OpenAiCompatConfig {
    /// Build from the `[provider]` table, reading the key from `api_key_env`.
    ///
    /// Returns [`LlmError::MissingApiKey`] when the variable is unset or blank.
    pub fn from_provider_config(config: &ProviderConfig) -> Result<Self, LlmError> {
        let key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::MissingApiKey(config.api_key_env.clone()))?;

        Ok(Self::with_key(config, SecretString::from(key)))
    }

    /// Build from the `[provider]` table with an explicit key.
    pub fn with_key(config: &ProviderConfig, api_key: SecretString) -> Self {
        Self {
            provider_name: provider_name_for(&config.base_url).to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.generation.model.clone(),
            capabilities: deepseek_capabilities(),
        }
    }
}

/// DeepSeek chat capabilities: no streaming in this client; 128K context, 8K output.
pub fn deepseek_capabilities() -> ProviderCapabilities {
    ProviderCapabilities {
        streaming: false,
        max_context_tokens: 128_000,
        max_output_tokens: 8_192,
    }
}

fn provider_name_for(base_url: &str) -> &'static str {
    if base_url.contains("deepseek.com") {
        "deepseek"
    } else {
        "openai-compatible"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_with_key_uses_provider_table() {
        let provider = ProviderConfig::default();
        let config = OpenAiCompatConfig::with_key(&provider, SecretString::from("sk-test"));
        assert_eq!(config.provider_name, "deepseek");
        assert_eq!(config.base_url, "https://api.deepseek.com");
        assert_eq!(config.model, "deepseek-chat");
        assert_eq!(config.api_key.expose_secret(), "sk-test");
        assert!(!config.capabilities.streaming);
    }

    #[test]
    fn test_custom_base_url_is_generic() {
        let provider = ProviderConfig {
            base_url: "http://localhost:8000/v1/".to_string(),
            ..Default::default()
        };
        let config = OpenAiCompatConfig::with_key(&provider, SecretString::from("k"));
        assert_eq!(config.provider_name, "openai-compatible");
        assert_eq!(config.base_url, "http://localhost:8000/v1");
    }

    #[test]
    fn test_missing_key_is_reported_with_variable_name() {
        let provider = ProviderConfig {
            api_key_env: "SPARKAI_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..Default::default()
        };
        match OpenAiCompatConfig::from_provider_config(&provider) {
            Err(LlmError::MissingApiKey(var)) => {
                assert_eq!(var, "SPARKAI_TEST_KEY_THAT_IS_NEVER_SET")
            }
            Err(other) => panic!("expected MissingApiKey, got: {other}"),
            Ok(_) => panic!("expected error but got Ok"),
        }
    }
}
