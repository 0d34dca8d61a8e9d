//! Session persistence: the storage port, the debounced writer, and the
//! in-memory store of all sessions.

pub mod debounce;
pub mod repository;
pub mod store;

pub use repository::{SessionRepository, StoredSessions};
pub use store::SessionStore;
