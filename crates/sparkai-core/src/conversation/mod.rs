//! Conversation orchestration.
//!
//! - `machine`: the synchronous step state machine over one session
//! - `orchestrator`: drives completions for the active conversation
//! - `prompt`: per-task prompt builders
//! - `task`: ticketed task descriptors
//! - `handoff`: one-shot navigation input

pub mod handoff;
pub mod machine;
pub mod orchestrator;
pub mod prompt;
pub mod task;

pub use handoff::HandOff;
pub use machine::Conversation;
pub use orchestrator::Orchestrator;
pub use task::{PendingTask, TaskKind, TaskRequest};
