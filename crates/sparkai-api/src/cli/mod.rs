//! CLI command definitions for the `spark` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod persona;
pub mod session;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Turn a vague idea into a pitch document, then hear what investors think.
#[derive(Parser)]
#[command(name = "spark", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive brainstorming chat.
    Chat {
        /// Submit this topic as soon as the chat starts.
        #[arg(long)]
        topic: Option<String>,

        /// Ask this investor persona for feedback as soon as the chat starts.
        #[arg(long)]
        persona: Option<String>,

        /// Resume a specific session by ID.
        #[arg(long)]
        session: Option<String>,
    },

    /// Browse and manage saved sessions.
    #[command(alias = "session")]
    Sessions {
        #[command(subcommand)]
        action: Option<SessionCommand>,
    },

    /// List the investor personas available for feedback.
    Personas,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// List sessions, most recently updated first.
    #[command(alias = "ls")]
    List,

    /// Show a session's full transcript.
    Show {
        /// Session ID (or a unique prefix of it).
        id: String,
    },

    /// Delete a session.
    #[command(alias = "rm")]
    Delete {
        /// Session ID (or a unique prefix of it).
        id: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_chat_handoff() {
        let cli = Cli::parse_from(["spark", "chat", "--topic", "宠物社交", "--persona", "elon"]);
        match cli.command {
            Commands::Chat { topic, persona, session } => {
                assert_eq!(topic.as_deref(), Some("宠物社交"));
                assert_eq!(persona.as_deref(), Some("elon"));
                assert!(session.is_none());
            }
            _ => panic!("expected chat command"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["spark", "sessions", "list", "--json", "-vv"]);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Sessions {
                action: Some(SessionCommand::List)
            }
        ));
    }
}
