//! LlmProvider trait definition.
//!
//! This is the completion gateway abstraction: one prompt in, one text out.
//! Uses RPITIT for `complete`; `BoxLlmProvider` adds dynamic dispatch.

use sparkai_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities};

/// Trait for completion backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). The service is
/// treated as opaque: callers never inspect anything beyond the returned text
/// or the error.
///
/// Implementations live in sparkai-infra (e.g., `OpenAiCompatibleProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "deepseek").
    fn name(&self) -> &str;

    /// What this provider supports.
    fn capabilities(&self) -> &ProviderCapabilities;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
