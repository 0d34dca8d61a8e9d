//! Terminal rendering of chat messages.
//!
//! `ChatRenderer` combines `termimad` for Markdown prose and `syntect` for
//! code block highlighting. Structured attachments (idea cards, company
//! tables, the persona selector) get their own layouts.

use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;
use termimad::MadSkin;

use sparkai_core::persona;
use sparkai_types::chat::{Attachment, ChatMessage, MessageRole};
use sparkai_types::idea::{CompanyRecommendation, FundingRound, Idea};

const CODE_THEME: &str = "base16-ocean.dark";

/// Terminal markdown renderer with syntax highlighting.
pub struct ChatRenderer {
    skin: MadSkin,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        let accent = termimad::crossterm::style::Color::Cyan;
        skin.bold.set_fg(accent);
        skin.headers[0].set_fg(accent);
        skin.headers[1].set_fg(accent);
        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);

        Self {
            skin,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Print one message from the log, including its attachment.
    pub fn print_message(&self, message: &ChatMessage) {
        match message.role {
            MessageRole::User => {
                println!();
                println!("  {} {}", style("You >").green().bold(), message.content);
            }
            MessageRole::Assistant => {
                println!();
                println!("  {}", self.speaker_label(message.persona_id.as_deref()));
                println!("{}", indent(&self.render_final(&message.content)));
            }
            MessageRole::System => {}
        }

        match &message.attachment {
            Some(Attachment::IdeaList(ideas)) => print_ideas(ideas),
            Some(Attachment::Document(document)) => self.print_document(document),
            Some(Attachment::CompanyList(companies)) => print_companies(companies),
            Some(Attachment::PersonaSelector(ids)) => print_persona_selector(ids),
            None => {}
        }
    }

    /// Print a Markdown document inside a frame.
    pub fn print_document(&self, document: &str) {
        println!();
        println!("  {}", style("─".repeat(60)).dim());
        println!("{}", indent(&self.render_final(document)));
        println!("  {}", style("─".repeat(60)).dim());
        println!(
            "  {}",
            style("/persona <id> for investor feedback, /recommend for funding-round benchmarks").dim()
        );
    }

    /// Render complete Markdown with syntax-highlighted code blocks.
    ///
    /// Code fences with a language tag are highlighted via syntect; everything
    /// else is rendered through termimad.
    pub fn render_final(&self, markdown: &str) -> String {
        let mut output = String::new();
        let mut in_code_block = false;
        let mut code_lang = String::new();
        let mut code_buf = String::new();

        for line in markdown.lines() {
            if line.starts_with("```") && !in_code_block {
                in_code_block = true;
                code_lang = line.trim_start_matches('`').trim().to_string();
                code_buf.clear();
            } else if line.starts_with("```") && in_code_block {
                in_code_block = false;
                output.push_str(&self.highlight_code(&code_buf, &code_lang));
                output.push('\n');
            } else if in_code_block {
                code_buf.push_str(line);
                code_buf.push('\n');
            } else {
                output.push_str(&self.skin.term_text(line).to_string());
            }
        }

        if in_code_block && !code_buf.is_empty() {
            output.push_str(&self.highlight_code(&code_buf, &code_lang));
        }

        output
    }

    fn speaker_label(&self, persona_id: Option<&str>) -> String {
        match persona_id.and_then(persona::lookup) {
            Some(p) => format!(
                "{} {} {}",
                p.avatar,
                style(p.name).magenta().bold(),
                style(format!("· {} @ {}", p.role, p.company)).dim()
            ),
            None => format!("{}", style("Spark >").cyan().bold()),
        }
    }

    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let syntax = if lang.is_empty() {
            self.syntax_set.find_syntax_plain_text()
        } else {
            self.syntax_set
                .find_syntax_by_token(lang)
                .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
        };

        let mut output = String::new();
        output.push_str(&format!("{}\n", style(format!("--- {lang} ---")).dim()));

        let Some(theme) = self.theme_set.themes.get(CODE_THEME) else {
            output.push_str(code);
            return output;
        };
        let mut h = HighlightLines::new(syntax, theme);

        for line in code.lines() {
            let ranges: Vec<(Style, &str)> = h
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_default();
            let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
            output.push_str(&format!("{escaped}\x1b[0m\n"));
        }

        output
    }
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_ideas(ideas: &[Idea]) {
    println!();
    for (index, idea) in ideas.iter().enumerate() {
        if idea.is_parse_error() {
            println!(
                "  {} {}",
                style("!").red().bold(),
                style(&idea.description).red()
            );
            println!("  {}", style("/refresh to try again").dim());
            return;
        }
        println!(
            "  {} {}",
            style(format!("[{}]", index + 1)).yellow().bold(),
            style(&idea.title).cyan().bold()
        );
        println!("      {}", idea.description);
    }
    println!();
    println!(
        "  {}",
        style("/pick <n> to expand an idea into a document, /refresh for a new batch").dim()
    );
}

fn print_companies(companies: &[CompanyRecommendation]) {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Round").fg(Color::White),
        Cell::new("Company").fg(Color::White),
        Cell::new("Why").fg(Color::White),
    ]);

    for company in companies {
        let round_color = match company.round {
            FundingRound::Error => Color::Red,
            _ => Color::Yellow,
        };
        table.add_row(vec![
            Cell::new(company.round.to_string()).fg(round_color),
            Cell::new(&company.company).fg(Color::Cyan),
            Cell::new(&company.reason).fg(Color::White),
        ]);
    }

    println!();
    println!("{table}");
}

/// Persona ids with their display lines.
pub fn print_persona_selector(ids: &[String]) {
    println!();
    for id in ids {
        if let Some(p) = persona::lookup(id) {
            println!(
                "  {} {:<12} {}",
                p.avatar,
                style(p.id).yellow(),
                style(p.display_line()).dim()
            );
        }
    }
    println!();
    println!("  {}", style("/persona <id> to hear from one of them").dim());
}
