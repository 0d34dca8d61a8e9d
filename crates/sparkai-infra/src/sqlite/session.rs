//! SQLite session repository.
//!
//! Implements `SessionRepository` from `sparkai-core` on top of the
//! `app_storage` key/value table. The whole session document is one JSON value
//! under [`SESSIONS_KEY`].

use chrono::Utc;
use sqlx::Row;

use sparkai_core::session::{SessionRepository, StoredSessions};
use sparkai_types::error::RepositoryError;

use super::pool::DatabasePool;

/// Storage key of the session document.
pub const SESSIONS_KEY: &str = "sparkai.sessions";

/// SQLite-backed implementation of `SessionRepository`.
#[derive(Clone)]
pub struct SqliteSessionRepository {
    pool: DatabasePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Raw stored JSON, if any.
    pub async fn raw(&self) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query("SELECT value FROM app_storage WHERE key = ?")
            .bind(SESSIONS_KEY)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.map(|row| {
            row.try_get::<String, _>("value")
                .map_err(|e| RepositoryError::Query(e.to_string()))
        })
        .transpose()
    }
}

impl SessionRepository for SqliteSessionRepository {
    async fn load(&self) -> Result<Option<StoredSessions>, RepositoryError> {
        let Some(value) = self.raw().await? else {
            return Ok(None);
        };

        serde_json::from_str(&value)
            .map(Some)
            .map_err(|e| RepositoryError::Corrupt(e.to_string()))
    }

    async fn save(&self, sessions: &StoredSessions) -> Result<(), RepositoryError> {
        let value = serde_json::to_string(sessions)
            .map_err(|e| RepositoryError::Query(format!("failed to serialize sessions: {e}")))?;

        sqlx::query(
            r#"INSERT INTO app_storage (key, value, updated_at) VALUES (?, ?, ?)
               ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(SESSIONS_KEY)
        .bind(&value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tracing::debug!(
            sessions = sessions.sessions.len(),
            bytes = value.len(),
            "session document saved"
        );
        Ok(())
    }
}
