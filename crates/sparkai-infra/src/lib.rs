//! Infrastructure layer for SparkAI.
//!
//! Contains implementations of the traits defined in `sparkai-core`: the
//! OpenAI-compatible completion gateway and SQLite session storage, plus
//! data directory resolution and `config.toml` loading.

pub mod config;
pub mod filesystem;
pub mod llm;
pub mod sqlite;
