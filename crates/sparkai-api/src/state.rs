//! Application state wiring storage, configuration, and the completion gateway.
//!
//! AppState pins the generic core types to the concrete infra implementations.
//! The provider is only built for commands that talk to the model, so listing
//! sessions or personas works without an API key.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

use sparkai_core::conversation::Orchestrator;
use sparkai_core::session::SessionStore;
use sparkai_infra::config::load_config;
use sparkai_infra::filesystem::{ensure_data_dir, resolve_data_dir};
use sparkai_infra::llm::create_provider;
use sparkai_infra::sqlite::pool::DatabasePool;
use sparkai_infra::sqlite::session::SqliteSessionRepository;
use sparkai_types::config::SparkConfig;

pub type ConcreteOrchestrator = Orchestrator<SqliteSessionRepository>;
pub type ConcreteSessionStore = SessionStore<SqliteSessionRepository>;

pub struct AppState {
    pub data_dir: PathBuf,
    pub config: SparkConfig,
    pub session_repo: SqliteSessionRepository,
}

impl AppState {
    /// Resolve the data directory, load `config.toml`, and open the database.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        ensure_data_dir(&data_dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let config = load_config(&data_dir).await;

        let db_pool = DatabasePool::open(&data_dir)
            .await
            .with_context(|| format!("Failed to open database in {}", data_dir.display()))?;

        tracing::info!(data_dir = %data_dir.display(), "application state initialized");

        Ok(Self {
            data_dir,
            config,
            session_repo: SqliteSessionRepository::new(db_pool),
        })
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.config.storage.snapshot_debounce_ms)
    }

    /// Load the session store without a completion provider.
    pub async fn session_store(&self) -> ConcreteSessionStore {
        SessionStore::load(self.session_repo.clone(), self.debounce_window()).await
    }

    /// Build the orchestrator: provider from `[provider]`, sessions from SQLite.
    pub async fn orchestrator(&self) -> anyhow::Result<ConcreteOrchestrator> {
        let provider = create_provider(&self.config.provider).map_err(|e| {
            anyhow::anyhow!(
                "{e}\n  Export it first, e.g.: export {}=sk-...",
                self.config.provider.api_key_env
            )
        })?;

        let store = self.session_store().await;
        Ok(Orchestrator::new(
            provider,
            self.config.provider.generation.clone(),
            store,
        ))
    }
}
