//! SparkAI terminal entry point.
//!
//! Binary name: `spark`
//!
//! Parses CLI arguments, initializes tracing, storage and configuration, then
//! dispatches to the appropriate command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use sparkai_core::conversation::HandOff;
use sparkai_observe::tracing_setup::{init_tracing, shutdown_tracing, verbosity_filter};

use cli::{Cli, Commands, SessionCommand};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(verbosity_filter(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Shell completions and the persona catalog don't need app state
    match &cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(*shell, &mut cmd, "spark", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Personas => return cli::persona::list_personas(cli.json),
        _ => {}
    }

    let state = AppState::init().await?;

    match cli.command {
        Commands::Chat {
            topic,
            persona,
            session,
        } => {
            cli::chat::loop_runner::run_chat_loop(&state, HandOff::new(topic, persona), session)
                .await?;
        }

        Commands::Sessions { action } => match action.unwrap_or(SessionCommand::List) {
            SessionCommand::List => cli::session::list_sessions(&state, cli.json).await?,
            SessionCommand::Show { id } => cli::session::show_session(&state, &id, cli.json).await?,
            SessionCommand::Delete { id, force } => {
                cli::session::delete_session(&state, &id, force, cli.json).await?
            }
        },

        Commands::Personas | Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
