//! Orchestrator: runs conversation tasks against the completion gateway.
//!
//! The store lock is never held across a gateway call. Each operation locks,
//! applies a transition, snapshots, and unlocks; then it awaits the gateway and
//! locks again to resolve the result. A result is only applied if the session
//! it was issued for is still the active one and its ticket still matches.

use std::time::Instant;

use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use sparkai_types::chat::ChatSession;
use sparkai_types::error::ConversationError;
use sparkai_types::llm::{GenerationSettings, LlmError};

use crate::llm::box_provider::BoxLlmProvider;
use crate::session::{SessionRepository, SessionStore};

use super::handoff::HandOff;
use super::machine::Conversation;
use super::task::TaskRequest;

pub struct Orchestrator<R: SessionRepository> {
    provider: BoxLlmProvider,
    settings: GenerationSettings,
    store: Mutex<SessionStore<R>>,
}

impl<R: SessionRepository> Orchestrator<R> {
    pub fn new(provider: BoxLlmProvider, settings: GenerationSettings, store: SessionStore<R>) -> Self {
        Self {
            provider,
            settings,
            store: Mutex::new(store),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Direct access to the store for listing and inspection.
    pub async fn store(&self) -> MutexGuard<'_, SessionStore<R>> {
        self.store.lock().await
    }

    /// Free-text input. Creates a session if none is active.
    pub async fn submit(&self, text: &str) -> Result<(), ConversationError> {
        self.run(true, |conversation| conversation.submit(text)).await
    }

    pub async fn select_idea(&self, idea_id: &str) -> Result<(), ConversationError> {
        self.run(false, |conversation| conversation.select_idea(idea_id).map(Some))
            .await
    }

    pub async fn refresh_ideas(&self) -> Result<(), ConversationError> {
        self.run(false, |conversation| conversation.refresh_ideas().map(Some))
            .await
    }

    pub async fn consult_persona(&self, persona_id: &str) -> Result<(), ConversationError> {
        self.run(true, |conversation| conversation.consult_persona(persona_id))
            .await
    }

    pub async fn enter_persona_dialogue(&self) -> Result<(), ConversationError> {
        self.run(true, |conversation| {
            conversation.enter_persona_dialogue().map(|()| None)
        })
        .await
    }

    pub async fn recommend_companies(&self, text: Option<&str>) -> Result<(), ConversationError> {
        self.run(true, |conversation| conversation.recommend_companies(text))
            .await
    }

    pub async fn draft_document(&self) -> Result<(), ConversationError> {
        self.run(true, |conversation| conversation.draft_document().map(|()| None))
            .await
    }

    /// Apply a navigation hand-off: the topic is submitted, then the persona consulted.
    pub async fn apply_handoff(&self, handoff: HandOff) -> Result<(), ConversationError> {
        if let Some(topic) = handoff.topic.as_deref() {
            self.submit(topic).await?;
        }
        if let Some(persona_id) = handoff.persona_id.as_deref() {
            self.consult_persona(persona_id).await?;
        }
        Ok(())
    }

    pub async fn new_session(&self) -> Uuid {
        self.store.lock().await.create()
    }

    pub async fn switch_session(&self, id: Uuid) -> Result<(), ConversationError> {
        self.store.lock().await.activate(id)
    }

    pub async fn delete_session(&self, id: Uuid) -> Result<(), ConversationError> {
        self.store.lock().await.delete(id)
    }

    pub async fn sessions(&self) -> Vec<ChatSession> {
        self.store.lock().await.list()
    }

    pub async fn active_session(&self) -> Option<ChatSession> {
        self.store
            .lock()
            .await
            .active()
            .map(|conversation| conversation.session().clone())
    }

    pub async fn flush(&self) {
        self.store.lock().await.flush().await;
    }

    /// Apply a transition to the active conversation, then drive any task it
    /// started (including chained follow-ups) to completion.
    ///
    /// With `create` and no active session, a fresh session is kept only if
    /// the transition appended a user message.
    async fn run<F>(&self, create: bool, apply: F) -> Result<(), ConversationError>
    where
        F: FnOnce(&mut Conversation) -> Result<Option<TaskRequest>, ConversationError>,
    {
        let task = {
            let mut store = self.store.lock().await;
            let task = match store.active_mut() {
                Some(conversation) => apply(conversation)?,
                None if create => {
                    let mut conversation = Conversation::new(ChatSession::new());
                    let task = apply(&mut conversation)?;
                    // Navigation alone never creates a session.
                    if conversation.session().last_user_message().is_none() {
                        return Err(ConversationError::NoActiveSession);
                    }
                    store.adopt(conversation);
                    task
                }
                None => return Err(ConversationError::NoActiveSession),
            };
            store.snapshot();
            task
        };

        self.drive(task).await;
        Ok(())
    }

    async fn drive(&self, mut next: Option<TaskRequest>) {
        while let Some(task) = next.take() {
            let outcome = self.complete(&task).await;

            let mut store = self.store.lock().await;
            let Some(conversation) = store
                .active_mut()
                .filter(|conversation| conversation.id() == task.session_id)
            else {
                tracing::warn!(
                    session_id = %task.session_id,
                    task = %task.kind,
                    "Session is no longer active; discarding stale result"
                );
                continue;
            };

            match conversation.resolve(task.ticket, outcome) {
                Ok(follow_up) => {
                    next = follow_up;
                    store.snapshot();
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %task.session_id,
                        task = %task.kind,
                        error = %e,
                        "Discarding result for abandoned task"
                    );
                }
            }
        }
    }

    #[tracing::instrument(
        name = "completion",
        skip(self, task),
        fields(session_id = %task.session_id, task = %task.kind)
    )]
    async fn complete(&self, task: &TaskRequest) -> Result<String, LlmError> {
        let request = task.completion_request(&self.settings);
        tracing::debug!(
            messages = request.messages.len(),
            model = %request.model,
            "Sending completion request"
        );

        let started = Instant::now();
        match self.provider.complete(&request).await {
            Ok(response) => {
                tracing::info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    output_tokens = response.usage.output_tokens,
                    "Completion received"
                );
                Ok(response.content)
            }
            Err(e) => {
                tracing::warn!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "Completion request failed"
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use sparkai_types::chat::{MessageKind, MessageRole, Step};
    use sparkai_types::idea::Idea;

    use crate::session::debounce::DEFAULT_DEBOUNCE;
    use crate::testing::{MemoryRepository, ScriptedProvider};

    const IDEAS_JSON: &str = r#"[
        {"id": "1", "title": "PetPal", "description": "宠物社交"},
        {"id": "2", "title": "PawMap", "description": "宠物地图"}
    ]"#;

    async fn orchestrator(
        provider: &ScriptedProvider,
    ) -> (Orchestrator<MemoryRepository>, MemoryRepository) {
        let repo = MemoryRepository::new();
        let store = SessionStore::load(repo.clone(), DEFAULT_DEBOUNCE).await;
        let orchestrator = Orchestrator::new(
            BoxLlmProvider::new(provider.clone()),
            GenerationSettings::default(),
            store,
        );
        (orchestrator, repo)
    }

    #[tokio::test]
    async fn test_submit_creates_session_and_asks() {
        let provider = ScriptedProvider::new();
        provider.push_ok(r#"{"status":"ask","content":"谁是目标用户？"}"#);
        let (orch, _) = orchestrator(&provider).await;

        orch.submit("帮我做一个宠物社交App").await.unwrap();

        let session = orch.active_session().await.unwrap();
        assert_eq!(session.title, "帮我做一个宠物社交App");
        assert_eq!(session.refinement_rounds, 1);
        assert_eq!(session.step, Step::RefiningRequirements);
        assert_eq!(session.messages.len(), 2);

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "deepseek-chat");
        assert_eq!(requests[0].max_tokens, 2048);
    }

    #[tokio::test]
    async fn test_full_flow() {
        let provider = ScriptedProvider::new();
        provider.push_ok(r#"{"status":"ready","content":"需求已明确。"}"#);
        provider.push_ok(IDEAS_JSON);
        provider.push_ok("# PetPal\n## 1. 项目摘要");
        provider.push_ok("赛道很大，但你的壁垒是什么？");
        let (orch, _) = orchestrator(&provider).await;

        orch.submit("宠物社交").await.unwrap();
        let session = orch.active_session().await.unwrap();
        assert_eq!(session.step, Step::AwaitingIdeaSelection);
        assert_eq!(session.ideas.len(), 2);

        orch.select_idea("1").await.unwrap();
        let session = orch.active_session().await.unwrap();
        assert_eq!(session.step, Step::DocumentReady);
        assert!(session.document.as_deref().unwrap().starts_with("# PetPal"));

        orch.consult_persona("sequoia").await.unwrap();
        let session = orch.active_session().await.unwrap();
        let last = session.messages.last().unwrap();
        assert_eq!(last.persona_id.as_deref(), Some("sequoia"));
        assert_eq!(last.content, "赛道很大，但你的壁垒是什么？");
        assert_eq!(provider.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_gateway_failure_appends_one_error() {
        let provider = ScriptedProvider::new();
        provider.push_err(LlmError::AuthenticationFailed);
        let (orch, _) = orchestrator(&provider).await;

        orch.submit("想法").await.unwrap();
        let session = orch.active_session().await.unwrap();
        assert_eq!(session.step, Step::AwaitingTopic);
        let assistant: Vec<_> = session
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::Assistant)
            .collect();
        assert_eq!(assistant.len(), 1);
    }

    #[tokio::test]
    async fn test_select_without_session() {
        let provider = ScriptedProvider::new();
        let (orch, _) = orchestrator(&provider).await;
        assert_eq!(
            orch.select_idea("1").await.unwrap_err(),
            ConversationError::NoActiveSession
        );
    }

    #[tokio::test]
    async fn test_rejected_first_action_creates_no_session() {
        let provider = ScriptedProvider::new();
        let (orch, _) = orchestrator(&provider).await;
        assert!(orch.consult_persona("nobody").await.is_err());
        assert!(orch.sessions().await.is_empty());
    }

    #[tokio::test]
    async fn test_navigation_creates_no_session() {
        let provider = ScriptedProvider::new();
        let (orch, repo) = orchestrator(&provider).await;

        assert_eq!(
            orch.enter_persona_dialogue().await.unwrap_err(),
            ConversationError::NoActiveSession
        );
        assert_eq!(
            orch.draft_document().await.unwrap_err(),
            ConversationError::NoActiveSession
        );
        assert_eq!(
            orch.recommend_companies(None).await.unwrap_err(),
            ConversationError::NoActiveSession
        );

        assert!(orch.sessions().await.is_empty());
        assert!(orch.active_session().await.is_none());
        orch.flush().await;
        assert!(repo.stored().is_none_or(|stored| stored.sessions.is_empty()));
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_recommend_with_text_creates_session() {
        let provider = ScriptedProvider::new();
        provider.push_ok(r#"[{"round":"A","company":"PetPal","reason":"宠物"}]"#);
        let (orch, _) = orchestrator(&provider).await;

        orch.recommend_companies(Some("宠物社交")).await.unwrap();

        let sessions = orch.sessions().await;
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].title, "宠物社交");
    }

    #[tokio::test]
    async fn test_unparseable_ideas_reach_selection() {
        let provider = ScriptedProvider::new();
        provider.push_ok(r#"{"status":"ready","content":"好的"}"#);
        provider.push_ok("I cannot produce JSON today.");
        let (orch, _) = orchestrator(&provider).await;

        orch.submit("远程办公").await.unwrap();
        let session = orch.active_session().await.unwrap();
        assert_eq!(session.step, Step::AwaitingIdeaSelection);
        assert_eq!(session.ideas, vec![Idea::parse_error()]);
        assert_eq!(session.messages.last().unwrap().kind(), MessageKind::IdeaList);
    }

    #[tokio::test]
    async fn test_busy_while_in_flight() {
        let provider = ScriptedProvider::gated();
        provider.push_ok(r#"{"status":"ask","content":"?"}"#);
        let (orch, _) = orchestrator(&provider).await;
        let orch = Arc::new(orch);

        let running = {
            let orch = Arc::clone(&orch);
            tokio::spawn(async move { orch.submit("想法").await })
        };
        provider.wait_started().await;

        assert_eq!(orch.submit("再来").await.unwrap_err(), ConversationError::Busy);

        provider.release();
        running.await.unwrap().unwrap();
        let session = orch.active_session().await.unwrap();
        assert_eq!(session.refinement_rounds, 1);
    }

    #[tokio::test]
    async fn test_stale_result_after_switch_is_discarded() {
        let provider = ScriptedProvider::gated();
        provider.push_ok(r#"[{"round":"A","company":"X","reason":"r"}]"#);
        let (orch, _) = orchestrator(&provider).await;
        let orch = Arc::new(orch);

        // Put the first session into input collection without a gateway call.
        let first = orch.new_session().await;
        {
            let mut store = orch.store().await;
            let conversation = store.active_mut().unwrap();
            conversation.recommend_companies(None).unwrap();
            store.snapshot();
        }

        let running = {
            let orch = Arc::clone(&orch);
            tokio::spawn(async move { orch.submit("跨境电商").await })
        };
        provider.wait_started().await;

        let second = orch.new_session().await;
        provider.release();
        running.await.unwrap().unwrap();

        let active = orch.active_session().await.unwrap();
        assert_eq!(active.id, second);
        assert!(active.messages.is_empty());
        assert_eq!(active.step, Step::AwaitingTopic);

        let parked = orch.store().await.get(first).unwrap();
        assert_eq!(parked.step, Step::AwaitingTopic);
        assert!(parked.messages.iter().all(|m| m.kind() == MessageKind::Plain));
    }

    #[tokio::test]
    async fn test_switch_back_after_stale_result_is_consistent() {
        let provider = ScriptedProvider::gated();
        provider.push_ok(r#"{"status":"ask","content":"?"}"#);
        let (orch, _) = orchestrator(&provider).await;
        let orch = Arc::new(orch);

        let running = {
            let orch = Arc::clone(&orch);
            tokio::spawn(async move { orch.submit("想法").await })
        };
        provider.wait_started().await;
        let first = orch.active_session().await.unwrap().id;
        orch.new_session().await;
        orch.switch_session(first).await.unwrap();

        provider.release();
        running.await.unwrap().unwrap();

        // The ticket was abandoned by the switch, so the late verdict is dropped.
        let session = orch.active_session().await.unwrap();
        assert_eq!(session.id, first);
        assert_eq!(session.refinement_rounds, 0);
        assert_eq!(session.step, Step::AwaitingTopic);
        assert_eq!(session.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_handoff_submits_then_consults() {
        let provider = ScriptedProvider::new();
        provider.push_ok(r#"{"status":"ask","content":"目标用户？"}"#);
        provider.push_ok("有意思");
        let (orch, _) = orchestrator(&provider).await;

        let mut handoff = HandOff::new(Some("AI 健身教练".to_string()), Some("elon".to_string()));
        orch.apply_handoff(handoff.take()).await.unwrap();
        assert!(handoff.is_empty());

        let session = orch.active_session().await.unwrap();
        assert_eq!(session.step.persona_id(), Some("elon"));
        let requests = provider.requests();
        assert!(requests[1].messages[1].content.contains("AI 健身教练"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_changes_are_persisted_after_debounce() {
        let provider = ScriptedProvider::new();
        provider.push_ok(r#"{"status":"ask","content":"目标用户？"}"#);
        let (orch, repo) = orchestrator(&provider).await;

        orch.submit("宠物社交").await.unwrap();
        assert_eq!(repo.writes(), 0);

        tokio::time::sleep(DEFAULT_DEBOUNCE + Duration::from_millis(10)).await;
        assert_eq!(repo.writes(), 1);
        let stored = repo.stored().unwrap();
        assert_eq!(stored.sessions[0].messages.len(), 2);
        assert_eq!(stored.active_session_id, Some(stored.sessions[0].id));
    }
}
