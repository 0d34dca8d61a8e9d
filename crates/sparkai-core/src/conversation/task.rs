//! Outstanding completion tasks.
//!
//! Every call the conversation asks the orchestrator to make is stamped with
//! a ticket and the id of the session it was issued for. A result is only
//! applied if both still match.

use std::fmt;

use uuid::Uuid;

use sparkai_types::chat::Step;
use sparkai_types::llm::{CompletionRequest, GenerationSettings, Message};

/// Where a document request came from; decides the step after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOrigin {
    /// A selected idea from the current batch.
    Idea,
    /// A free-text project description.
    FreeText,
}

/// What a completion is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    Refinement,
    Ideas,
    Document(DocumentOrigin),
    PersonaFeedback { persona_id: String },
    Recommendation,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Refinement => write!(f, "refinement"),
            TaskKind::Ideas => write!(f, "ideas"),
            TaskKind::Document(DocumentOrigin::Idea) => write!(f, "document"),
            TaskKind::Document(DocumentOrigin::FreeText) => write!(f, "document(free_text)"),
            TaskKind::PersonaFeedback { persona_id } => write!(f, "persona_feedback({persona_id})"),
            TaskKind::Recommendation => write!(f, "recommendation"),
        }
    }
}

/// The busy sub-state of a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTask {
    pub ticket: Uuid,
    pub session_id: Uuid,
    pub kind: TaskKind,
    /// Step restored if the task is abandoned.
    pub fallback: Step,
}

/// A completion the orchestrator should send to the gateway.
#[derive(Debug, Clone)]
pub struct TaskRequest {
    pub ticket: Uuid,
    pub session_id: Uuid,
    pub kind: TaskKind,
    pub messages: Vec<Message>,
}

impl TaskRequest {
    pub(crate) fn new(pending: &PendingTask, messages: Vec<Message>) -> Self {
        Self {
            ticket: pending.ticket,
            session_id: pending.session_id,
            kind: pending.kind.clone(),
            messages,
        }
    }

    /// Build the gateway request with the configured generation parameters.
    pub fn completion_request(&self, settings: &GenerationSettings) -> CompletionRequest {
        CompletionRequest::with_settings(settings, self.messages.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_kind_display() {
        assert_eq!(TaskKind::Ideas.to_string(), "ideas");
        let kind = TaskKind::PersonaFeedback {
            persona_id: "idg".to_string(),
        };
        assert_eq!(kind.to_string(), "persona_feedback(idg)");
    }

    #[test]
    fn test_completion_request_carries_settings() {
        let pending = PendingTask {
            ticket: Uuid::now_v7(),
            session_id: Uuid::now_v7(),
            kind: TaskKind::Recommendation,
            fallback: Step::AwaitingTopic,
        };
        let task = TaskRequest::new(&pending, vec![Message::system("s"), Message::user("u")]);
        let settings = GenerationSettings {
            model: "deepseek-reasoner".to_string(),
            ..GenerationSettings::default()
        };
        let request = task.completion_request(&settings);
        assert_eq!(request.model, "deepseek-reasoner");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.frequency_penalty, Some(0.5));
    }
}
