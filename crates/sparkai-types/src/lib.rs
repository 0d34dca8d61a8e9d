//! Shared domain types for SparkAI.
//!
//! This crate contains the core domain types used across SparkAI:
//! sessions, messages, conversation steps, ideas, personas, completion
//! requests, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, serde_json, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod idea;
pub mod llm;
pub mod persona;
