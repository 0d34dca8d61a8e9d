//! Main chat loop.
//!
//! Reads input, routes it to the orchestrator, and prints the messages each
//! action appended to the active session. The orchestrator owns every state
//! transition; this loop only renders.

use std::future::Future;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use uuid::Uuid;

use sparkai_core::conversation::HandOff;
use sparkai_core::persona;
use sparkai_types::chat::{ChatSession, MessageRole};
use sparkai_types::error::ConversationError;
use sparkai_types::idea::Idea;

use crate::cli::session::{resolve_session_ref, session_table, short_id};
use crate::state::{AppState, ConcreteOrchestrator};

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::{ChatRenderer, print_persona_selector};

/// Run the interactive chat loop.
///
/// `handoff` is applied once before the first prompt; `session_ref` selects
/// the session to resume (row number, ID, or ID prefix).
pub async fn run_chat_loop(
    state: &AppState,
    mut handoff: HandOff,
    session_ref: Option<String>,
) -> anyhow::Result<()> {
    let orchestrator = state.orchestrator().await?;

    if let Some(reference) = session_ref {
        let sessions = orchestrator.sessions().await;
        let id = resolve_session_ref(&sessions, &reference)?;
        orchestrator.switch_session(id).await?;
    }

    let renderer = ChatRenderer::new();
    let mut view = TranscriptView::default();

    let active = orchestrator.active_session().await;
    print_welcome_banner(
        orchestrator.provider_name(),
        &orchestrator.settings().model,
        active.as_ref(),
    );
    view.catch_up(&renderer, active.as_ref(), None);

    let initial = handoff.take();
    if !initial.is_empty() {
        info!(topic = ?initial.topic, persona = ?initial.persona_id, "applying hand-off");
        let echo = initial.topic.clone();
        let result = with_spinner(orchestrator.apply_handoff(initial)).await;
        report(result);
        view.catch_up(&renderer, orchestrator.active_session().await.as_ref(), echo.as_deref());
    }

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let text = match chat_input.read_line().await {
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Message(text) if text.is_empty() => continue,
            InputEvent::Message(text) => text,
        };

        let Some(command) = commands::parse(&text) else {
            let result = with_spinner(orchestrator.submit(&text)).await;
            report(result);
            view.catch_up(&renderer, orchestrator.active_session().await.as_ref(), Some(&text));
            continue;
        };

        match command {
            ChatCommand::Help => commands::print_help(),
            ChatCommand::Clear => chat_input.clear(),
            ChatCommand::Exit => break,
            ChatCommand::New => {
                let id = orchestrator.new_session().await;
                println!(
                    "\n  {} Started a new session ({}). Describe your idea to begin.",
                    style("+").green().bold(),
                    short_id(id)
                );
                view.reset(id);
            }
            ChatCommand::Sessions => print_sessions(&orchestrator).await,
            ChatCommand::Switch(reference) => {
                let sessions = orchestrator.sessions().await;
                match resolve_session_ref(&sessions, &reference) {
                    Ok(id) => {
                        report(orchestrator.switch_session(id).await);
                    }
                    Err(e) => print_error(&e),
                }
            }
            ChatCommand::Delete(reference) => {
                let sessions = orchestrator.sessions().await;
                match resolve_session_ref(&sessions, &reference) {
                    Ok(id) => {
                        if report(orchestrator.delete_session(id).await) {
                            println!(
                                "\n  {} Session {} deleted.",
                                style("x").red().bold(),
                                short_id(id)
                            );
                        }
                    }
                    Err(e) => print_error(&e),
                }
            }
            ChatCommand::Pick(reference) => {
                let ideas = orchestrator
                    .active_session()
                    .await
                    .map(|s| s.ideas)
                    .unwrap_or_default();
                let idea_id = resolve_idea_ref(&ideas, &reference);
                report(with_spinner(orchestrator.select_idea(&idea_id)).await);
            }
            ChatCommand::Refresh => {
                report(with_spinner(orchestrator.refresh_ideas()).await);
            }
            ChatCommand::Persona(Some(persona_id)) => {
                report(with_spinner(orchestrator.consult_persona(&persona_id)).await);
            }
            ChatCommand::Persona(None) => {
                if report(orchestrator.enter_persona_dialogue().await) {
                    print_persona_selector(&persona::ids());
                }
            }
            ChatCommand::Recommend(text) => {
                report(with_spinner(orchestrator.recommend_companies(text.as_deref())).await);
            }
            ChatCommand::Doc => {
                report(orchestrator.draft_document().await);
            }
            ChatCommand::Show => match orchestrator.active_session().await.and_then(|s| s.document) {
                Some(document) => renderer.print_document(&document),
                None => println!(
                    "\n  {} No document yet. /pick an idea or /doc to write one.",
                    style("i").blue().bold()
                ),
            },
            ChatCommand::Unknown(name) => {
                println!(
                    "\n  {} Unknown command: {}. Type /help for available commands.",
                    style("?").yellow().bold(),
                    style(name).dim()
                );
            }
        }

        view.catch_up(&renderer, orchestrator.active_session().await.as_ref(), None);
    }

    chat_input.flush();
    orchestrator.flush().await;
    println!("\n  {}", style("Session saved. Bye!").dim());
    Ok(())
}

/// Tracks which part of the active session's log is already on screen.
#[derive(Default)]
struct TranscriptView {
    session_id: Option<Uuid>,
    shown: usize,
}

impl TranscriptView {
    /// Expect `id` next with nothing shown yet.
    fn reset(&mut self, id: Uuid) {
        self.session_id = Some(id);
        self.shown = 0;
    }

    /// Print messages the screen has not shown yet.
    ///
    /// A different session than last time is printed in full. `echo` is the
    /// line the user just typed; its user message is not printed twice.
    fn catch_up(&mut self, renderer: &ChatRenderer, session: Option<&ChatSession>, echo: Option<&str>) {
        let Some(session) = session else {
            self.session_id = None;
            self.shown = 0;
            return;
        };

        if self.session_id != Some(session.id) {
            if self.session_id.is_some() || !session.messages.is_empty() {
                println!(
                    "\n  {} {} {}",
                    style("»").cyan().bold(),
                    style(&session.title).cyan(),
                    style(format!("({})", short_id(session.id))).dim()
                );
            }
            self.reset(session.id);
        }

        let mut echo = echo.map(str::trim);
        let mut printed = false;
        for message in session.messages.iter().skip(self.shown) {
            if message.role == MessageRole::User && echo == Some(message.content.as_str()) {
                echo = None;
                continue;
            }
            renderer.print_message(message);
            printed = true;
        }
        self.shown = session.messages.len();
        if printed {
            println!();
        }
    }
}

/// Map `/pick` input to an idea id: a 1-based position in the batch, else the id itself.
fn resolve_idea_ref(ideas: &[Idea], reference: &str) -> String {
    let reference = reference.trim();
    reference
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| ideas.get(index))
        .map(|idea| idea.id.clone())
        .unwrap_or_else(|| reference.to_string())
}

async fn print_sessions(orchestrator: &ConcreteOrchestrator) {
    let sessions = orchestrator.sessions().await;
    if sessions.is_empty() {
        println!("\n  {} No sessions yet.", style("i").blue().bold());
        return;
    }
    let active = orchestrator.active_session().await.map(|s| s.id);
    println!();
    println!("{}", session_table(&sessions, active));
}

async fn with_spinner<F: Future>(future: F) -> F::Output {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));

    let output = future.await;
    spinner.finish_and_clear();
    output
}

/// Print a rejected action. Returns whether the action succeeded.
fn report(result: Result<(), ConversationError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            print_error(&e);
            false
        }
    }
}

fn print_error(error: &dyn std::fmt::Display) {
    println!("\n  {} {error}", style("!").yellow().bold());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ideas() -> Vec<Idea> {
        ["7", "8"]
            .iter()
            .map(|id| Idea {
                id: id.to_string(),
                title: format!("Idea {id}"),
                description: "描述".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_resolve_idea_by_position() {
        assert_eq!(resolve_idea_ref(&ideas(), "2"), "8");
        assert_eq!(resolve_idea_ref(&ideas(), " 1 "), "7");
    }

    #[test]
    fn test_resolve_idea_falls_back_to_raw_id() {
        assert_eq!(resolve_idea_ref(&ideas(), "7"), "7");
        assert_eq!(resolve_idea_ref(&ideas(), "abc"), "abc");
        assert_eq!(resolve_idea_ref(&[], "1"), "1");
    }

    #[test]
    fn test_transcript_view_tracks_shown_messages() {
        let renderer = ChatRenderer::new();
        let mut view = TranscriptView::default();
        let mut session = ChatSession::new();
        session
            .messages
            .push(sparkai_types::chat::ChatMessage::user("你好"));

        view.catch_up(&renderer, Some(&session), Some("你好"));
        assert_eq!(view.session_id, Some(session.id));
        assert_eq!(view.shown, 1);

        view.catch_up(&renderer, None, None);
        assert_eq!(view.session_id, None);
    }
}
