//! Test doubles shared by the unit tests in this crate.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{Notify, Semaphore};

use sparkai_types::error::RepositoryError;
use sparkai_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, Usage,
};

use crate::llm::provider::LlmProvider;
use crate::session::repository::{SessionRepository, StoredSessions};

/// Provider that replays queued responses in order and records requests.
///
/// A gated provider holds each call until [`ScriptedProvider::release`].
#[derive(Clone)]
pub struct ScriptedProvider {
    inner: Arc<ScriptedInner>,
    capabilities: ProviderCapabilities,
}

struct ScriptedInner {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    gate: Option<Semaphore>,
    started: Notify,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn gated() -> Self {
        Self::build(Some(Semaphore::new(0)))
    }

    fn build(gate: Option<Semaphore>) -> Self {
        Self {
            inner: Arc::new(ScriptedInner {
                responses: Mutex::new(VecDeque::new()),
                requests: Mutex::new(Vec::new()),
                gate,
                started: Notify::new(),
            }),
            capabilities: ProviderCapabilities {
                streaming: false,
                max_context_tokens: 64_000,
                max_output_tokens: 8_192,
            },
        }
    }

    pub fn push_ok(&self, text: &str) {
        self.inner
            .responses
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
    }

    pub fn push_err(&self, error: LlmError) {
        self.inner.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.inner.requests.lock().unwrap().clone()
    }

    /// Wait until a call has reached the gate.
    pub async fn wait_started(&self) {
        self.inner.started.notified().await;
    }

    /// Let one gated call through.
    pub fn release(&self) {
        if let Some(gate) = &self.inner.gate {
            gate.add_permits(1);
        }
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.inner.requests.lock().unwrap().push(request.clone());
        self.inner.started.notify_one();

        if let Some(gate) = &self.inner.gate {
            gate.acquire()
                .await
                .expect("gate semaphore closed")
                .forget();
        }

        let next = self
            .inner
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(LlmError::Provider {
                    message: "no scripted response left".to_string(),
                })
            });

        next.map(|content| CompletionResponse {
            id: "scripted".to_string(),
            content,
            model: request.model.clone(),
            usage: Usage::default(),
        })
    }
}

/// In-memory session repository that counts successful writes.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    stored: Arc<Mutex<Option<StoredSessions>>>,
    writes: Arc<AtomicUsize>,
    corrupt: Arc<AtomicBool>,
    fail_saves: Arc<AtomicBool>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(stored: StoredSessions) -> Self {
        let repo = Self::default();
        *repo.stored.lock().unwrap() = Some(stored);
        repo
    }

    pub fn corrupt() -> Self {
        let repo = Self::default();
        repo.corrupt.store(true, Ordering::SeqCst);
        repo
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Option<StoredSessions> {
        self.stored.lock().unwrap().clone()
    }
}

impl SessionRepository for MemoryRepository {
    async fn load(&self) -> Result<Option<StoredSessions>, RepositoryError> {
        if self.corrupt.load(Ordering::SeqCst) {
            return Err(RepositoryError::Corrupt("expected value at line 1".to_string()));
        }
        Ok(self.stored.lock().unwrap().clone())
    }

    async fn save(&self, sessions: &StoredSessions) -> Result<(), RepositoryError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        *self.stored.lock().unwrap() = Some(sessions.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
