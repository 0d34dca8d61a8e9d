//! Debounced snapshot writes.
//!
//! Every schedule aborts the previously scheduled write and starts a new
//! timer, so a burst of changes produces one write once the burst settles.

use std::time::Duration;

use tokio::task::JoinHandle;

use super::repository::{SessionRepository, StoredSessions};

/// Default quiet window before a scheduled write runs.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

pub struct SnapshotDebouncer<R: SessionRepository> {
    repo: R,
    window: Duration,
    pending: Option<JoinHandle<()>>,
}

impl<R: SessionRepository> SnapshotDebouncer<R> {
    pub fn new(repo: R, window: Duration) -> Self {
        Self {
            repo,
            window,
            pending: None,
        }
    }

    /// Write `snapshot` after the window unless another schedule replaces it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, snapshot: StoredSessions) {
        self.cancel();
        let repo = self.repo.clone();
        let window = self.window;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            write(&repo, &snapshot).await;
        }));
    }

    /// Write `snapshot` now, dropping any scheduled write.
    pub async fn flush(&mut self, snapshot: &StoredSessions) {
        self.cancel();
        write(&self.repo, snapshot).await;
    }

    /// True while a scheduled write has not finished.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<R: SessionRepository> Drop for SnapshotDebouncer<R> {
    fn drop(&mut self) {
        if self.is_pending() {
            tracing::debug!("Dropping debouncer with a scheduled write; call flush() to keep it");
        }
    }
}

async fn write<R: SessionRepository>(repo: &R, snapshot: &StoredSessions) {
    match repo.save(snapshot).await {
        Ok(()) => tracing::debug!(sessions = snapshot.sessions.len(), "Session snapshot written"),
        Err(e) => tracing::warn!(error = %e, "Failed to write session snapshot"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryRepository;
    use sparkai_types::chat::ChatSession;

    fn snapshot_with(count: usize) -> StoredSessions {
        StoredSessions {
            sessions: (0..count).map(|_| ChatSession::new()).collect(),
            ..StoredSessions::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_produces_one_write() {
        let repo = MemoryRepository::new();
        let mut debouncer = SnapshotDebouncer::new(repo.clone(), DEFAULT_DEBOUNCE);

        for count in 1..=5 {
            debouncer.schedule(snapshot_with(count));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(repo.writes(), 0);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(repo.writes(), 1);
        assert_eq!(repo.stored().unwrap().sessions.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_windows_write_separately() {
        let repo = MemoryRepository::new();
        let mut debouncer = SnapshotDebouncer::new(repo.clone(), DEFAULT_DEBOUNCE);

        debouncer.schedule(snapshot_with(1));
        tokio::time::sleep(Duration::from_millis(700)).await;
        debouncer.schedule(snapshot_with(2));
        tokio::time::sleep(Duration::from_millis(700)).await;

        assert_eq!(repo.writes(), 2);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_cancels_scheduled_write() {
        let repo = MemoryRepository::new();
        let mut debouncer = SnapshotDebouncer::new(repo.clone(), DEFAULT_DEBOUNCE);

        debouncer.schedule(snapshot_with(1));
        debouncer.flush(&snapshot_with(3)).await;
        assert_eq!(repo.writes(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(repo.writes(), 1);
        assert_eq!(repo.stored().unwrap().sessions.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_failure_is_swallowed() {
        let repo = MemoryRepository::new();
        repo.fail_saves(true);
        let mut debouncer = SnapshotDebouncer::new(repo.clone(), DEFAULT_DEBOUNCE);

        debouncer.flush(&snapshot_with(1)).await;
        assert!(repo.stored().is_none());
    }
}
