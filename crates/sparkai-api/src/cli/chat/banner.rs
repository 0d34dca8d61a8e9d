//! Welcome banner display for chat sessions.

use console::style;

use crate::cli::session::short_id;
use sparkai_types::chat::ChatSession;

/// Print the welcome banner at the start of the chat loop.
pub fn print_welcome_banner(provider: &str, model: &str, session: Option<&ChatSession>) {
    println!();
    println!("  ✨ {}", style("SparkAI").cyan().bold());
    println!(
        "  {}",
        style("Describe a vague idea; get sharper questions, project ideas, a pitch document, and investor feedback.").dim()
    );
    println!();
    println!(
        "  {}  {}",
        style("Model:").bold(),
        style(format!("{model} via {provider}")).dim()
    );
    match session {
        Some(session) => println!(
            "  {}  {} {}",
            style("Session:").bold(),
            style(&session.title).dim(),
            style(format!("({})", short_id(session.id))).dim()
        ),
        None => println!("  {}  {}", style("Session:").bold(), style("new").dim()),
    }
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
