//! Session store: every stored session plus the live active conversation.
//!
//! Stored sessions are plain snapshots. The active one is also held as a
//! [`Conversation`], and its snapshot is refreshed on every [`SessionStore::snapshot`].
//! Persistence is best-effort: load failures start empty, write failures are
//! logged by the debouncer.

use std::time::Duration;

use uuid::Uuid;

use sparkai_types::chat::ChatSession;
use sparkai_types::error::ConversationError;

use crate::conversation::Conversation;

use super::debounce::SnapshotDebouncer;
use super::repository::{STORED_SESSIONS_VERSION, SessionRepository, StoredSessions};

pub struct SessionStore<R: SessionRepository> {
    sessions: Vec<ChatSession>,
    active: Option<Conversation>,
    debouncer: SnapshotDebouncer<R>,
}

impl<R: SessionRepository> SessionStore<R> {
    /// Read the stored document and restore the active session.
    #[tracing::instrument(name = "load_sessions", skip(repo))]
    pub async fn load(repo: R, debounce: Duration) -> Self {
        let stored = match repo.load().await {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                tracing::debug!("No stored sessions; starting empty");
                StoredSessions::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load stored sessions; starting empty");
                StoredSessions::default()
            }
        };

        if stored.version != STORED_SESSIONS_VERSION {
            tracing::warn!(
                version = stored.version,
                expected = STORED_SESSIONS_VERSION,
                "Stored sessions have an unexpected version; loading anyway"
            );
        }

        let mut store = Self {
            sessions: stored.sessions,
            active: None,
            debouncer: SnapshotDebouncer::new(repo, debounce),
        };

        if let Some(id) = stored.active_session_id {
            match store.find(id).cloned() {
                Some(session) => store.active = Some(Conversation::new(session)),
                None => tracing::warn!(
                    session_id = %id,
                    "Active session pointer is dangling; no session restored"
                ),
            }
        }

        tracing::info!(
            sessions = store.sessions.len(),
            active = ?store.active_id(),
            "Sessions loaded"
        );
        store
    }

    pub fn active(&self) -> Option<&Conversation> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut Conversation> {
        self.active.as_mut()
    }

    pub fn active_id(&self) -> Option<Uuid> {
        self.active.as_ref().map(Conversation::id)
    }

    /// Install a conversation built outside the store as the active one.
    pub fn adopt(&mut self, conversation: Conversation) {
        self.park_active();
        tracing::info!(session_id = %conversation.id(), "Session created");
        match self.sessions.iter_mut().find(|s| s.id == conversation.id()) {
            Some(slot) => *slot = conversation.session().clone(),
            None => self.sessions.push(conversation.session().clone()),
        }
        self.active = Some(conversation);
        self.schedule_write();
    }

    /// All sessions, most recently updated first.
    pub fn list(&self) -> Vec<ChatSession> {
        let mut sessions: Vec<ChatSession> = self
            .sessions
            .iter()
            .map(|stored| match &self.active {
                Some(active) if active.id() == stored.id => active.session().clone(),
                _ => stored.clone(),
            })
            .collect();
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sessions
    }

    pub fn get(&self, id: Uuid) -> Option<ChatSession> {
        match &self.active {
            Some(active) if active.id() == id => Some(active.session().clone()),
            _ => self.find(id).cloned(),
        }
    }

    /// Start a fresh session and make it active.
    pub fn create(&mut self) -> Uuid {
        self.park_active();
        let session = ChatSession::new();
        let id = session.id;
        tracing::info!(session_id = %id, "Session created");
        self.sessions.push(session.clone());
        self.active = Some(Conversation::new(session));
        self.schedule_write();
        id
    }

    /// Make a stored session the active one.
    pub fn activate(&mut self, id: Uuid) -> Result<(), ConversationError> {
        if self.active_id() == Some(id) {
            return Ok(());
        }
        let session = self
            .find(id)
            .cloned()
            .ok_or(ConversationError::SessionNotFound(id))?;

        self.park_active();
        tracing::info!(session_id = %id, "Session activated");
        self.active = Some(Conversation::new(session));
        self.schedule_write();
        Ok(())
    }

    /// Remove a session. Deleting the active one activates the most recently
    /// updated remaining session, or a fresh one when none remain.
    pub fn delete(&mut self, id: Uuid) -> Result<(), ConversationError> {
        let index = self
            .sessions
            .iter()
            .position(|s| s.id == id)
            .ok_or(ConversationError::SessionNotFound(id))?;
        self.sessions.remove(index);
        tracing::info!(session_id = %id, "Session deleted");

        if self.active_id() == Some(id) {
            self.active = None;
            let next = self
                .sessions
                .iter()
                .max_by_key(|s| s.updated_at)
                .map(|s| s.id);
            match next {
                Some(next) => {
                    if let Some(session) = self.find(next).cloned() {
                        self.active = Some(Conversation::new(session));
                    }
                }
                None => {
                    self.create();
                    return Ok(());
                }
            }
        }

        self.schedule_write();
        Ok(())
    }

    /// Record the active conversation's current state and schedule a write.
    pub fn snapshot(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.touch();
            let session = active.session().clone();
            match self.sessions.iter_mut().find(|s| s.id == session.id) {
                Some(slot) => *slot = session,
                None => self.sessions.push(session),
            }
        }
        self.schedule_write();
    }

    /// Write immediately, replacing any scheduled write.
    pub async fn flush(&mut self) {
        let document = self.document();
        self.debouncer.flush(&document).await;
    }

    /// The document as it would be persisted now.
    pub fn document(&self) -> StoredSessions {
        StoredSessions {
            version: STORED_SESSIONS_VERSION,
            sessions: self.list(),
            active_session_id: self.active_id(),
        }
    }

    fn find(&self, id: Uuid) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Put the active conversation back into the stored list.
    fn park_active(&mut self) {
        let Some(mut active) = self.active.take() else {
            return;
        };
        active.abandon_pending();
        let session = active.into_session();
        if let Some(slot) = self.sessions.iter_mut().find(|s| s.id == session.id) {
            *slot = session;
        }
    }

    fn schedule_write(&mut self) {
        let document = self.document();
        self.debouncer.schedule(document);
    }
}
