//! SessionRepository trait definition.
//!
//! The whole session collection is persisted as one document: read fully on
//! startup, written fully on every (debounced) change.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sparkai_types::chat::ChatSession;
use sparkai_types::error::RepositoryError;

/// Current shape of the persisted document.
pub const STORED_SESSIONS_VERSION: u32 = 1;

/// The persisted document: every session plus the active pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSessions {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub sessions: Vec<ChatSession>,
    #[serde(default)]
    pub active_session_id: Option<Uuid>,
}

fn default_version() -> u32 {
    STORED_SESSIONS_VERSION
}

impl Default for StoredSessions {
    fn default() -> Self {
        Self {
            version: STORED_SESSIONS_VERSION,
            sessions: Vec::new(),
            active_session_id: None,
        }
    }
}

/// Storage port for the session document.
///
/// Implementations live in sparkai-infra (e.g., `SqliteSessionRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). `Clone` is
/// required because debounced writes run on their own task.
pub trait SessionRepository: Clone + Send + Sync + 'static {
    /// Read the stored document. `Ok(None)` when nothing was ever written;
    /// `Err(RepositoryError::Corrupt)` when the stored bytes do not parse.
    fn load(&self) -> impl Future<Output = Result<Option<StoredSessions>, RepositoryError>> + Send;

    /// Replace the stored document.
    fn save(
        &self,
        sessions: &StoredSessions,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_sessions_tolerates_missing_fields() {
        let stored: StoredSessions = serde_json::from_str("{}").unwrap();
        assert_eq!(stored, StoredSessions::default());
    }
}
