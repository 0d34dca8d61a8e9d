//! Session management CLI commands: list, show, delete.
//!
//! Provides session browsing with rich tables, full transcripts, and deletion
//! with confirmation prompt.

use anyhow::{Context, Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;
use uuid::Uuid;

use sparkai_types::chat::ChatSession;

use crate::state::AppState;

use super::chat::renderer::ChatRenderer;

/// List sessions, most recently updated first.
///
/// # Examples
///
/// ```bash
/// spark sessions
/// spark sessions list --json
/// ```
pub async fn list_sessions(state: &AppState, json: bool) -> Result<()> {
    let store = state.session_store().await;
    let sessions = store.list();
    let active = store.active_id();

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!();
        println!(
            "  {} No sessions yet. Start one with: {}",
            style("i").blue().bold(),
            style("spark chat").yellow()
        );
        println!();
        return Ok(());
    }

    println!();
    println!("{}", session_table(&sessions, active));
    println!();
    println!(
        "  {} session{}",
        style(sessions.len()).bold(),
        if sessions.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Print one session's transcript, rendered the way the chat loop shows it.
pub async fn show_session(state: &AppState, reference: &str, json: bool) -> Result<()> {
    let store = state.session_store().await;
    let sessions = store.list();
    let id = resolve_session_ref(&sessions, reference)?;
    let session = store
        .get(id)
        .with_context(|| format!("Session '{reference}' not found"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&session.title).cyan().bold());
    println!(
        "  {}  {}",
        style("Created:").bold(),
        style(session.created_at.format("%Y-%m-%d %H:%M UTC")).dim()
    );
    println!(
        "  {}  {}",
        style("Step:").bold(),
        style(&session.step).dim()
    );
    println!("  {}", style("---").dim());

    let renderer = ChatRenderer::new();
    for message in &session.messages {
        renderer.print_message(message);
    }
    println!();

    Ok(())
}

/// Delete a session with confirmation.
///
/// Deleting the active session activates the most recently updated remaining
/// one; deleting the last session leaves a fresh empty one.
pub async fn delete_session(state: &AppState, reference: &str, force: bool, json: bool) -> Result<()> {
    let mut store = state.session_store().await;
    let sessions = store.list();
    let id = resolve_session_ref(&sessions, reference)?;
    let session = store
        .get(id)
        .with_context(|| format!("Session '{reference}' not found"))?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete session '{}' ({} messages)?",
                style(&session.title).red().bold(),
                session.messages.len()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    store.delete(id)?;
    store.flush().await;

    if json {
        println!(
            "{}",
            serde_json::json!({"deleted": true, "session_id": id.to_string()})
        );
    } else {
        println!(
            "  {} Session '{}' deleted.",
            style("x").red().bold(),
            session.title
        );
    }

    Ok(())
}

/// Styled table of sessions. Row numbers are what `/switch <n>` accepts.
pub fn session_table(sessions: &[ChatSession], active: Option<Uuid>) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("Step").fg(Color::White),
        Cell::new("ID").fg(Color::White),
    ]);

    for (index, session) in sessions.iter().enumerate() {
        let is_active = Some(session.id) == active;
        let marker = if is_active {
            format!("{}*", index + 1)
        } else {
            (index + 1).to_string()
        };

        table.add_row(vec![
            Cell::new(marker).fg(if is_active { Color::Green } else { Color::White }),
            Cell::new(&session.title).fg(Color::Cyan),
            Cell::new(session.updated_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::White),
            Cell::new(session.messages.len().to_string()).fg(Color::White),
            Cell::new(session.step.to_string()).fg(Color::DarkGrey),
            Cell::new(short_id(session.id)).fg(Color::DarkGrey),
        ]);
    }

    table
}

/// Resolve a 1-based row number, a full UUID, or a unique UUID prefix.
pub fn resolve_session_ref(sessions: &[ChatSession], reference: &str) -> Result<Uuid> {
    let reference = reference.trim();

    if let Ok(id) = Uuid::parse_str(reference) {
        return Ok(id);
    }

    if let Ok(index) = reference.parse::<usize>() {
        if let Some(session) = index.checked_sub(1).and_then(|i| sessions.get(i)) {
            return Ok(session.id);
        }
    }

    let matches: Vec<&ChatSession> = sessions
        .iter()
        .filter(|s| !reference.is_empty() && s.id.to_string().starts_with(reference))
        .collect();

    match matches.as_slice() {
        [session] => Ok(session.id),
        [] => bail!("No session matches '{reference}'"),
        _ => bail!("'{reference}' matches {} sessions; use more characters", matches.len()),
    }
}

pub fn short_id(id: Uuid) -> String {
    id.to_string().chars().take(8).collect()
}
