//! Business logic and port definitions for SparkAI.
//!
//! This crate holds the conversation state machine, the response
//! interpreter, the persona catalog, and the session store. It defines the
//! "ports" (`LlmProvider`, `SessionRepository`) that the infrastructure layer
//! implements, and depends only on `sparkai-types` -- never on
//! `sparkai-infra` or any database/IO crate.

pub mod conversation;
pub mod interpret;
pub mod llm;
pub mod persona;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;
