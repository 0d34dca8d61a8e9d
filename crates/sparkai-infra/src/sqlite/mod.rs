//! SQLite storage layer.
//!
//! The session document lives in the `app_storage` key/value table, accessed
//! through split read/write connection pools in WAL mode.

pub mod pool;
pub mod session;
