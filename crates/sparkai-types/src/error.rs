use thiserror::Error;
use uuid::Uuid;

/// Errors from repository operations (used by trait definitions in sparkai-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("corrupt stored data: {0}")]
    Corrupt(String),
}

/// Rejections from conversation entry points.
///
/// None of these alter the conversation; the caller decides how to surface
/// them (the chat loop prints a hint).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    #[error("a request is already in progress")]
    Busy,

    #[error("input is empty")]
    EmptyInput,

    #[error("input is not accepted in step '{step}'")]
    InputNotAccepted { step: String },

    #[error("unknown idea: '{0}'")]
    UnknownIdea(String),

    #[error("unknown persona: '{0}'")]
    UnknownPersona(String),

    #[error("no idea context to refresh from")]
    NoIdeaContext,

    #[error("result does not match the outstanding request")]
    StaleTicket,

    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("no active session; describe your idea to start one")]
    NoActiveSession,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_conversation_error_display() {
        let err = ConversationError::InputNotAccepted {
            step: "document_ready".to_string(),
        };
        assert_eq!(err.to_string(), "input is not accepted in step 'document_ready'");
        assert!(
            ConversationError::UnknownPersona("nobody".to_string())
                .to_string()
                .contains("nobody")
        );
    }
}
