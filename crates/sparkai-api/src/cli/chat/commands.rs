//! Slash command parsing for the chat loop.
//!
//! Anything that does not start with `/` is free text for the conversation.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    Help,
    Clear,
    Exit,
    /// Start a fresh session.
    New,
    /// List sessions.
    Sessions,
    /// Switch to a session by row number or ID.
    Switch(String),
    /// Delete a session by row number or ID.
    Delete(String),
    /// Expand idea `n` (or an idea ID) into a document.
    Pick(String),
    /// Regenerate the idea batch.
    Refresh,
    /// Consult a persona, or enter the investor dialogue without one.
    Persona(Option<String>),
    /// Funding-round benchmarks for the given text, or ask for it.
    Recommend(Option<String>),
    /// Write a document from a free-text description.
    Doc,
    /// Print the current document.
    Show,
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let command = match (cmd.as_str(), arg) {
        ("/help" | "/h" | "/?", _) => ChatCommand::Help,
        ("/clear" | "/cls", _) => ChatCommand::Clear,
        ("/exit" | "/quit" | "/q", _) => ChatCommand::Exit,
        ("/new", _) => ChatCommand::New,
        ("/sessions" | "/ls", _) => ChatCommand::Sessions,
        ("/switch", Some(target)) => ChatCommand::Switch(target),
        ("/delete" | "/rm", Some(target)) => ChatCommand::Delete(target),
        ("/pick", Some(idea)) => ChatCommand::Pick(idea),
        ("/refresh", _) => ChatCommand::Refresh,
        ("/persona", persona) => ChatCommand::Persona(persona),
        ("/recommend", text) => ChatCommand::Recommend(text),
        ("/doc", _) => ChatCommand::Doc,
        ("/show", _) => ChatCommand::Show,
        ("/switch" | "/delete" | "/rm" | "/pick", None) => {
            ChatCommand::Unknown(format!("{cmd} requires an argument"))
        }
        (other, _) => ChatCommand::Unknown(other.to_string()),
    };

    Some(command)
}

/// Print the help text listing all available commands.
pub fn print_help() {
    let rows = [
        ("/help", "Show this help message"),
        ("/new", "Start a new session"),
        ("/sessions", "List sessions"),
        ("/switch <n|id>", "Switch to another session"),
        ("/delete <n|id>", "Delete a session"),
        ("/pick <n>", "Expand idea n into a project document"),
        ("/refresh", "Generate a new batch of ideas"),
        ("/persona [id]", "Ask an investor persona for feedback"),
        ("/recommend [text]", "Benchmark companies for funding rounds A-D"),
        ("/doc", "Write a document from your own description"),
        ("/show", "Print the current project document"),
        ("/clear", "Clear the screen"),
        ("/exit", "Leave the chat"),
    ];

    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    for (command, description) in rows {
        println!("  {:<20} {}", style(command).cyan(), description);
    }
    println!();
    println!(
        "  {}",
        style("Anything else is sent to the conversation. Ctrl+D to exit.").dim()
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_help() {
        assert_eq!(parse("/help"), Some(ChatCommand::Help));
        assert_eq!(parse("/h"), Some(ChatCommand::Help));
        assert_eq!(parse("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn test_parse_exit() {
        assert_eq!(parse("/exit"), Some(ChatCommand::Exit));
        assert_eq!(parse("/quit"), Some(ChatCommand::Exit));
        assert_eq!(parse("/q"), Some(ChatCommand::Exit));
    }

    #[test]
    fn test_parse_optional_arguments() {
        assert_eq!(parse("/persona"), Some(ChatCommand::Persona(None)));
        assert_eq!(
            parse("/persona elon"),
            Some(ChatCommand::Persona(Some("elon".to_string())))
        );
        assert_eq!(parse("/recommend   "), Some(ChatCommand::Recommend(None)));
        assert_eq!(
            parse("/recommend 宠物 社交"),
            Some(ChatCommand::Recommend(Some("宠物 社交".to_string())))
        );
    }

    #[test]
    fn test_parse_required_arguments() {
        assert_eq!(parse("/pick 2"), Some(ChatCommand::Pick("2".to_string())));
        assert_eq!(parse("/switch 3"), Some(ChatCommand::Switch("3".to_string())));
        assert!(matches!(parse("/pick"), Some(ChatCommand::Unknown(_))));
        assert!(matches!(parse("/delete"), Some(ChatCommand::Unknown(_))));
    }

    #[test]
    fn test_parse_not_command() {
        assert_eq!(parse("帮我做一个宠物社交App"), None);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(parse("/foo"), Some(ChatCommand::Unknown("/foo".to_string())));
    }
}
