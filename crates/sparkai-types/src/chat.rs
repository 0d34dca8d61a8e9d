//! Chat session, message, and conversation step types for SparkAI.
//!
//! A session is one resumable pitch-building conversation: the append-only
//! message log plus the step the conversation is in and the results produced
//! along the way (ideas, the latest pitch document).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

use crate::idea::{CompanyRecommendation, Idea};

// Re-export MessageRole from llm module (it's used in both chat and llm contexts).
pub use crate::llm::MessageRole;

/// Title given to sessions before the first user message names them.
pub const PLACEHOLDER_TITLE: &str = "新对话";

/// Maximum number of characters of the first user message used as title.
pub const TITLE_MAX_CHARS: usize = 30;

/// Structured payload carried by an assistant message.
///
/// The tag doubles as the message kind used for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "kebab-case")]
pub enum Attachment {
    IdeaList(Vec<Idea>),
    Document(String),
    CompanyList(Vec<CompanyRecommendation>),
    PersonaSelector(Vec<String>),
}

/// Rendering kind of a message, derived from its attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Plain,
    IdeaList,
    Document,
    CompanyList,
    PersonaSelector,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Plain => write!(f, "plain"),
            MessageKind::IdeaList => write!(f, "idea-list"),
            MessageKind::Document => write!(f, "document"),
            MessageKind::CompanyList => write!(f, "company-list"),
            MessageKind::PersonaSelector => write!(f, "persona-selector"),
        }
    }
}

/// One entry in a session's message log. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    /// Persona that authored this feedback message, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            attachment: None,
            persona_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn with_persona(mut self, persona_id: impl Into<String>) -> Self {
        self.persona_id = Some(persona_id.into());
        self
    }

    pub fn kind(&self) -> MessageKind {
        match &self.attachment {
            None => MessageKind::Plain,
            Some(Attachment::IdeaList(_)) => MessageKind::IdeaList,
            Some(Attachment::Document(_)) => MessageKind::Document,
            Some(Attachment::CompanyList(_)) => MessageKind::CompanyList,
            Some(Attachment::PersonaSelector(_)) => MessageKind::PersonaSelector,
        }
    }
}

/// Sub-state of the two steps that can either run a task or wait for input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskEntry {
    /// A completion for this step is outstanding.
    InFlight,
    /// Waiting for the user to describe the project.
    AwaitingInput,
}

/// Where a conversation is in the pitch-building flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", content = "detail", rename_all = "snake_case")]
pub enum Step {
    AwaitingTopic,
    RefiningRequirements,
    GeneratingIdeas,
    AwaitingIdeaSelection,
    GeneratingDocument(TaskEntry),
    DocumentReady,
    PersonaDialogue { persona_id: Option<String> },
    RecommendingCompanies(TaskEntry),
}

impl Default for Step {
    fn default() -> Self {
        Step::AwaitingTopic
    }
}

impl Step {
    /// True for the steps that only wait for a project description.
    pub fn is_awaiting_input(&self) -> bool {
        matches!(
            self,
            Step::GeneratingDocument(TaskEntry::AwaitingInput)
                | Step::RecommendingCompanies(TaskEntry::AwaitingInput)
        )
    }

    pub fn persona_id(&self) -> Option<&str> {
        match self {
            Step::PersonaDialogue { persona_id } => persona_id.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::AwaitingTopic => write!(f, "awaiting_topic"),
            Step::RefiningRequirements => write!(f, "refining_requirements"),
            Step::GeneratingIdeas => write!(f, "generating_ideas"),
            Step::AwaitingIdeaSelection => write!(f, "awaiting_idea_selection"),
            Step::GeneratingDocument(TaskEntry::InFlight) => write!(f, "generating_document"),
            Step::GeneratingDocument(TaskEntry::AwaitingInput) => {
                write!(f, "generating_document(awaiting_input)")
            }
            Step::DocumentReady => write!(f, "document_ready"),
            Step::PersonaDialogue { persona_id: Some(id) } => write!(f, "persona_dialogue({id})"),
            Step::PersonaDialogue { persona_id: None } => write!(f, "persona_dialogue"),
            Step::RecommendingCompanies(TaskEntry::InFlight) => write!(f, "recommending_companies"),
            Step::RecommendingCompanies(TaskEntry::AwaitingInput) => {
                write!(f, "recommending_companies(awaiting_input)")
            }
        }
    }
}

/// A resumable conversation.
///
/// `messages` is append-only; `document` is the latest generated pitch and
/// the default context for persona feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub step: Step,
    #[serde(default)]
    pub ideas: Vec<Idea>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(default)]
    pub refinement_rounds: u8,
    /// Text the current idea batch was generated from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idea_context: Option<String>,
}

impl ChatSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: PLACEHOLDER_TITLE.to_string(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
            step: Step::AwaitingTopic,
            ideas: Vec::new(),
            document: None,
            refinement_rounds: 0,
            idea_context: None,
        }
    }

    pub fn has_placeholder_title(&self) -> bool {
        self.title == PLACEHOLDER_TITLE
    }

    pub fn first_user_message(&self) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.role == MessageRole::User)
    }

    pub fn last_user_message(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.role == MessageRole::User)
    }

    /// Derive the title from the first user message while still a placeholder.
    ///
    /// Returns true if the title changed.
    pub fn derive_title(&mut self) -> bool {
        if !self.has_placeholder_title() {
            return false;
        }
        let Some(first) = self.first_user_message() else {
            return false;
        };
        let title = title_from(&first.content);
        if title.is_empty() {
            return false;
        }
        self.title = title;
        true
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// First [`TITLE_MAX_CHARS`] characters of the trimmed text.
pub fn title_from(text: &str) -> String {
    text.trim().chars().take(TITLE_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_defaults() {
        let session = ChatSession::new();
        assert_eq!(session.title, PLACEHOLDER_TITLE);
        assert_eq!(session.step, Step::AwaitingTopic);
        assert_eq!(session.refinement_rounds, 0);
        assert!(session.messages.is_empty());
        assert!(session.document.is_none());
        assert_eq!(session.id.get_version_num(), 7);
    }

    #[test]
    fn test_derive_title_truncates_by_chars() {
        let mut session = ChatSession::new();
        let long = "我想做一个帮助独居老人和社区志愿者互相联系的小程序，还要能够预约上门服务和紧急呼叫";
        session.messages.push(ChatMessage::user(long));
        assert!(session.derive_title());
        assert_eq!(session.title.chars().count(), TITLE_MAX_CHARS);
        assert!(long.starts_with(&session.title));

        // Only the placeholder is replaced.
        session.messages.push(ChatMessage::user("另一个话题"));
        session.title = "手动标题".to_string();
        assert!(!session.derive_title());
        assert_eq!(session.title, "手动标题");
    }

    #[test]
    fn test_derive_title_without_user_message() {
        let mut session = ChatSession::new();
        session.messages.push(ChatMessage::assistant("请描述你的项目"));
        assert!(!session.derive_title());
        assert!(session.has_placeholder_title());
    }

    #[test]
    fn test_message_kind_follows_attachment() {
        let plain = ChatMessage::assistant("hi");
        assert_eq!(plain.kind(), MessageKind::Plain);

        let ideas = ChatMessage::assistant("")
            .with_attachment(Attachment::IdeaList(vec![Idea::parse_error()]));
        assert_eq!(ideas.kind(), MessageKind::IdeaList);
        assert_eq!(ideas.kind().to_string(), "idea-list");
    }

    #[test]
    fn test_step_serde_roundtrip() {
        let steps = vec![
            Step::AwaitingTopic,
            Step::GeneratingDocument(TaskEntry::AwaitingInput),
            Step::PersonaDialogue {
                persona_id: Some("sequoia".to_string()),
            },
            Step::PersonaDialogue { persona_id: None },
            Step::RecommendingCompanies(TaskEntry::InFlight),
        ];
        for step in steps {
            let json = serde_json::to_string(&step).unwrap();
            let back: Step = serde_json::from_str(&json).unwrap();
            assert_eq!(back, step, "{json}");
        }
    }

    #[test]
    fn test_step_helpers() {
        assert!(Step::RecommendingCompanies(TaskEntry::AwaitingInput).is_awaiting_input());
        assert!(!Step::GeneratingDocument(TaskEntry::InFlight).is_awaiting_input());
        let step = Step::PersonaDialogue {
            persona_id: Some("elon".to_string()),
        };
        assert_eq!(step.persona_id(), Some("elon"));
        assert_eq!(step.to_string(), "persona_dialogue(elon)");
    }

    #[test]
    fn test_attachment_serde_shape() {
        let msg = ChatMessage::assistant("文档已生成")
            .with_attachment(Attachment::Document("# 项目".to_string()));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["attachment"]["kind"], "document");
        assert_eq!(json["attachment"]["payload"], "# 项目");
        assert!(json.get("persona_id").is_none());
    }
}
