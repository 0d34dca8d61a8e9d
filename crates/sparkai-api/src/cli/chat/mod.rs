//! Interactive chat experience for SparkAI.
//!
//! The loop reads a line, hands it to the orchestrator (free text or a slash
//! command), shows a spinner while the model works, then prints whatever new
//! messages landed in the active session. Entry point:
//! `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
