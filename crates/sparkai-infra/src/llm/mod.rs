//! LLM provider implementations.
//!
//! Contains the concrete [`LlmProvider`](sparkai_core::llm::provider::LlmProvider)
//! used by SparkAI and a factory ([`create_provider`]) that builds it from the
//! `[provider]` table of `config.toml`.

pub mod openai_compat;

use sparkai_core::llm::box_provider::BoxLlmProvider;
use sparkai_types::config::ProviderConfig;
use sparkai_types::llm::LlmError;

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::OpenAiCompatConfig;

/// Create a [`BoxLlmProvider`] from the `[provider]` configuration.
///
/// # Errors
///
/// Returns [`LlmError::MissingApiKey`] if the variable named by `api_key_env`
/// is not set.
pub fn create_provider(config: &ProviderConfig) -> Result<BoxLlmProvider, LlmError> {
    let oai_config = OpenAiCompatConfig::from_provider_config(config)?;
    Ok(BoxLlmProvider::new(OpenAiCompatibleProvider::new(oai_config)))
}
