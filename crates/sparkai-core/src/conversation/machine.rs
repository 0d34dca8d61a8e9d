//! The conversation state machine.
//!
//! `Conversation` wraps one [`ChatSession`] and owns its step transitions.
//! Entry points are synchronous: they validate the request, append messages,
//! move the step, and hand back a [`TaskRequest`] when a completion is needed.
//! The orchestrator performs the call and feeds the text back through
//! [`Conversation::resolve`].

use uuid::Uuid;

use sparkai_types::chat::{Attachment, ChatMessage, ChatSession, Step, TaskEntry};
use sparkai_types::error::ConversationError;
use sparkai_types::idea::VerdictStatus;
use sparkai_types::llm::{LlmError, Message};

use crate::interpret;
use crate::persona;

use super::prompt;
use super::task::{DocumentOrigin, PendingTask, TaskKind, TaskRequest};

/// Clarifying rounds before idea generation is forced.
pub const MAX_REFINEMENT_ROUNDS: u8 = 2;

/// Ideas requested per batch.
pub const IDEA_COUNT: usize = 4;

/// Document title used when the description came from free text.
pub const DOCUMENT_PLACEHOLDER_TITLE: &str = "我的项目";

/// Prefix of the user message recorded when an idea is selected.
const IDEA_SELECTION_PREFIX: &str = "我选择：";

mod reply {
    pub const IDEAS_INTRO: &str =
        "基于你的想法，我为你发散了以下几个方向。请选择一个你最感兴趣的，我们将深入探讨并生成项目文档。";
    pub const DOCUMENT_READY: &str = "项目文档已生成！你可以查看详情，或者邀请模拟投资人进行点评。";
    pub const COMPANIES_INTRO: &str = "基于你的项目方向，我为你推荐了以下 ABCD 轮次的标杆公司：";
    pub const PERSONA_SELECTOR: &str = "请选择一位投资人来点评你的项目：";
    pub const DOCUMENT_PROMPT: &str = "请描述你的项目，我会为你生成一份完整的项目文档。";
    pub const RECOMMEND_PROMPT: &str =
        "请描述你的项目方向或所在行业，我会为你推荐 A-D 轮次的标杆公司。";

    pub const REFINEMENT_FAILED: &str = "抱歉，分析需求时出现了问题。请检查网络连接或 API Key 后重新描述你的想法。";
    pub const IDEAS_FAILED: &str = "抱歉，生成创意方向时出现了问题，请稍后重试。";
    pub const DOCUMENT_FAILED: &str = "抱歉，生成项目文档时出现了问题，请稍后重试。";
    pub const PERSONA_FAILED: &str = "抱歉，这位投资人暂时无法回应，请稍后再试。";
    pub const RECOMMEND_FAILED: &str = "抱歉，获取轮次推荐时出现了问题，请稍后重试。";
}

/// What a submission turns into, decided before anything is appended.
enum SubmitAction {
    Refine,
    ForceIdeas,
    Ideas,
    Recommend,
    Document,
    Feedback(String),
    SelectPersona,
}

/// A live conversation: one session plus at most one outstanding task.
#[derive(Debug, Clone)]
pub struct Conversation {
    session: ChatSession,
    pending: Option<PendingTask>,
}

impl Conversation {
    /// Wrap a session, settling any busy step left over from an interrupted run.
    pub fn new(mut session: ChatSession) -> Self {
        let settled = match &session.step {
            Step::GeneratingIdeas => Some(if session.ideas.is_empty() {
                Step::AwaitingTopic
            } else {
                Step::AwaitingIdeaSelection
            }),
            Step::GeneratingDocument(TaskEntry::InFlight) => {
                Some(match interrupted_document_origin(&session) {
                    DocumentOrigin::Idea => Step::AwaitingIdeaSelection,
                    DocumentOrigin::FreeText => Step::AwaitingTopic,
                })
            }
            Step::RecommendingCompanies(TaskEntry::InFlight) => Some(if session.document.is_some() {
                Step::DocumentReady
            } else {
                Step::AwaitingTopic
            }),
            _ => None,
        };
        if let Some(step) = settled {
            tracing::info!(
                session_id = %session.id,
                from = %session.step,
                to = %step,
                "Settling interrupted step"
            );
            session.step = step;
        }

        Self {
            session,
            pending: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.session.id
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn into_session(self) -> ChatSession {
        self.session
    }

    pub fn step(&self) -> &Step {
        &self.session.step
    }

    pub fn pending(&self) -> Option<&PendingTask> {
        self.pending.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Refresh the derived title and `updated_at` ahead of a snapshot.
    pub(crate) fn touch(&mut self) {
        self.session.derive_title();
        self.session.updated_at = chrono::Utc::now();
    }

    /// Free-text input from the user.
    pub fn submit(&mut self, text: &str) -> Result<Option<TaskRequest>, ConversationError> {
        self.ensure_idle()?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ConversationError::EmptyInput);
        }

        let action = match &self.session.step {
            Step::AwaitingTopic => SubmitAction::Refine,
            Step::RefiningRequirements if self.session.refinement_rounds >= MAX_REFINEMENT_ROUNDS => {
                SubmitAction::ForceIdeas
            }
            Step::RefiningRequirements => SubmitAction::Refine,
            Step::AwaitingIdeaSelection => SubmitAction::Ideas,
            Step::RecommendingCompanies(TaskEntry::AwaitingInput) => SubmitAction::Recommend,
            Step::GeneratingDocument(TaskEntry::AwaitingInput) => SubmitAction::Document,
            Step::PersonaDialogue {
                persona_id: Some(id),
            } => SubmitAction::Feedback(id.clone()),
            Step::PersonaDialogue { persona_id: None } => SubmitAction::SelectPersona,
            step @ (Step::DocumentReady
            | Step::GeneratingIdeas
            | Step::GeneratingDocument(TaskEntry::InFlight)
            | Step::RecommendingCompanies(TaskEntry::InFlight)) => {
                return Err(ConversationError::InputNotAccepted {
                    step: step.to_string(),
                });
            }
        };

        let history = self.session.messages.clone();
        self.push(ChatMessage::user(text));

        let task = match action {
            SubmitAction::Refine => {
                let fallback = self.session.step.clone();
                self.session.step = Step::RefiningRequirements;
                let messages = prompt::refinement(&history, text, self.session.refinement_rounds);
                Some(self.begin(TaskKind::Refinement, Step::RefiningRequirements, fallback, messages))
            }
            SubmitAction::ForceIdeas => {
                tracing::debug!(
                    session_id = %self.session.id,
                    rounds = self.session.refinement_rounds,
                    "Refinement rounds exhausted; generating ideas"
                );
                let context = prompt::transcript(&self.session.messages);
                Some(self.begin_ideas(context, Step::RefiningRequirements))
            }
            SubmitAction::Ideas => Some(self.begin_ideas(text.to_string(), Step::AwaitingIdeaSelection)),
            SubmitAction::Recommend => Some(self.begin(
                TaskKind::Recommendation,
                Step::RecommendingCompanies(TaskEntry::InFlight),
                Step::AwaitingTopic,
                prompt::recommendation(text),
            )),
            SubmitAction::Document => Some(self.begin(
                TaskKind::Document(DocumentOrigin::FreeText),
                Step::GeneratingDocument(TaskEntry::InFlight),
                Step::AwaitingTopic,
                prompt::document(DOCUMENT_PLACEHOLDER_TITLE, text),
            )),
            SubmitAction::Feedback(persona_id) => Some(self.begin_feedback(persona_id, text)),
            SubmitAction::SelectPersona => {
                self.push(
                    ChatMessage::assistant(reply::PERSONA_SELECTOR)
                        .with_attachment(Attachment::PersonaSelector(persona::ids())),
                );
                None
            }
        };

        Ok(task)
    }

    /// Pick one idea from the current batch and generate its document.
    pub fn select_idea(&mut self, idea_id: &str) -> Result<TaskRequest, ConversationError> {
        self.ensure_idle()?;
        self.ensure_step(&Step::AwaitingIdeaSelection)?;

        let idea_id = idea_id.trim();
        let idea = self
            .session
            .ideas
            .iter()
            .find(|idea| idea.id == idea_id)
            .cloned()
            .ok_or_else(|| ConversationError::UnknownIdea(idea_id.to_string()))?;

        self.push(ChatMessage::user(format!("{IDEA_SELECTION_PREFIX}{}", idea.title)));
        Ok(self.begin(
            TaskKind::Document(DocumentOrigin::Idea),
            Step::GeneratingDocument(TaskEntry::InFlight),
            Step::AwaitingIdeaSelection,
            prompt::document(&idea.title, &idea.description),
        ))
    }

    /// Regenerate the idea batch from the context it was built from.
    pub fn refresh_ideas(&mut self) -> Result<TaskRequest, ConversationError> {
        self.ensure_idle()?;
        self.ensure_step(&Step::AwaitingIdeaSelection)?;

        let context = self
            .session
            .idea_context
            .clone()
            .ok_or(ConversationError::NoIdeaContext)?;
        Ok(self.begin_ideas(context, Step::AwaitingIdeaSelection))
    }

    /// Ask a persona for feedback on the document, or on the latest input.
    pub fn consult_persona(
        &mut self,
        persona_id: &str,
    ) -> Result<Option<TaskRequest>, ConversationError> {
        self.ensure_idle()?;
        let persona = persona::lookup(persona_id)
            .ok_or_else(|| ConversationError::UnknownPersona(persona_id.to_string()))?;

        let context = self.session.document.clone().or_else(|| {
            self.session
                .last_user_message()
                .map(|message| message.content.clone())
        });

        self.push(ChatMessage::user(format!("我想听听 {} 的看法。", persona.name)));
        self.session.step = Step::PersonaDialogue {
            persona_id: Some(persona.id.to_string()),
        };

        match context {
            Some(context) => Ok(Some(self.begin_feedback(persona.id.to_string(), &context))),
            None => {
                self.push(
                    ChatMessage::assistant(format!(
                        "请先简单介绍一下你的项目，{} 会据此给出点评。",
                        persona.name
                    ))
                    .with_persona(persona.id),
                );
                Ok(None)
            }
        }
    }

    /// Enter the investor dialogue without a persona selected.
    pub fn enter_persona_dialogue(&mut self) -> Result<(), ConversationError> {
        self.ensure_idle()?;
        self.session.step = Step::PersonaDialogue { persona_id: None };
        Ok(())
    }

    /// Recommend companies for the given text, or ask for a description.
    pub fn recommend_companies(
        &mut self,
        text: Option<&str>,
    ) -> Result<Option<TaskRequest>, ConversationError> {
        self.ensure_idle()?;

        match text.map(str::trim).filter(|t| !t.is_empty()) {
            Some(text) => {
                let fallback = resting_step(&self.session.step);
                self.push(ChatMessage::user(text));
                Ok(Some(self.begin(
                    TaskKind::Recommendation,
                    Step::RecommendingCompanies(TaskEntry::InFlight),
                    fallback,
                    prompt::recommendation(text),
                )))
            }
            None => {
                self.push(ChatMessage::assistant(reply::RECOMMEND_PROMPT));
                self.session.step = Step::RecommendingCompanies(TaskEntry::AwaitingInput);
                Ok(None)
            }
        }
    }

    /// Ask for a free-text description to build a document from.
    pub fn draft_document(&mut self) -> Result<(), ConversationError> {
        self.ensure_idle()?;
        self.push(ChatMessage::assistant(reply::DOCUMENT_PROMPT));
        self.session.step = Step::GeneratingDocument(TaskEntry::AwaitingInput);
        Ok(())
    }

    /// Apply the outcome of the outstanding task.
    ///
    /// Returns a follow-up task when the result chains into another call
    /// (a "ready" verdict chains into idea generation).
    pub fn resolve(
        &mut self,
        ticket: Uuid,
        outcome: Result<String, LlmError>,
    ) -> Result<Option<TaskRequest>, ConversationError> {
        let Some(pending) = self.pending.take_if(|p| p.ticket == ticket) else {
            return Err(ConversationError::StaleTicket);
        };

        let text = match outcome {
            Ok(text) => text,
            Err(e) => {
                self.fail(pending, &e);
                return Ok(None);
            }
        };

        let follow_up = match pending.kind {
            TaskKind::Refinement => {
                let verdict = interpret::parse_verdict(&text);
                self.push(ChatMessage::assistant(verdict.content));
                match verdict.status {
                    VerdictStatus::Ask => {
                        self.session.refinement_rounds =
                            (self.session.refinement_rounds + 1).min(MAX_REFINEMENT_ROUNDS);
                        self.session.step = Step::RefiningRequirements;
                        None
                    }
                    VerdictStatus::Ready => {
                        let context = prompt::transcript(&self.session.messages);
                        Some(self.begin_ideas(context, Step::AwaitingTopic))
                    }
                }
            }
            TaskKind::Ideas => {
                let ideas = interpret::parse_ideas(&text);
                self.session.ideas = ideas.clone();
                self.push(
                    ChatMessage::assistant(reply::IDEAS_INTRO)
                        .with_attachment(Attachment::IdeaList(ideas)),
                );
                self.session.step = Step::AwaitingIdeaSelection;
                None
            }
            TaskKind::Document(_) => {
                let document = interpret::parse_document(&text);
                self.session.document = Some(document.clone());
                self.push(
                    ChatMessage::assistant(reply::DOCUMENT_READY)
                        .with_attachment(Attachment::Document(document)),
                );
                self.session.step = Step::DocumentReady;
                None
            }
            TaskKind::PersonaFeedback { persona_id } => {
                self.push(ChatMessage::assistant(text).with_persona(persona_id.clone()));
                self.session.step = Step::PersonaDialogue {
                    persona_id: Some(persona_id),
                };
                None
            }
            TaskKind::Recommendation => {
                let companies = interpret::parse_companies(&text);
                self.push(
                    ChatMessage::assistant(reply::COMPANIES_INTRO)
                        .with_attachment(Attachment::CompanyList(companies)),
                );
                self.session.step = pending.fallback;
                None
            }
        };

        Ok(follow_up)
    }

    /// Drop the outstanding task and restore the step it started from.
    pub fn abandon_pending(&mut self) -> Option<PendingTask> {
        let pending = self.pending.take()?;
        tracing::info!(
            session_id = %self.session.id,
            task = %pending.kind,
            fallback = %pending.fallback,
            "Abandoning outstanding task"
        );
        self.session.step = pending.fallback.clone();
        Some(pending)
    }

    fn fail(&mut self, pending: PendingTask, error: &LlmError) {
        tracing::warn!(
            session_id = %self.session.id,
            task = %pending.kind,
            error = %error,
            "Completion failed"
        );

        let (text, step) = match pending.kind {
            TaskKind::Refinement => (reply::REFINEMENT_FAILED, Step::AwaitingTopic),
            TaskKind::Ideas => (reply::IDEAS_FAILED, Step::AwaitingTopic),
            TaskKind::Document(DocumentOrigin::Idea) => {
                (reply::DOCUMENT_FAILED, Step::AwaitingIdeaSelection)
            }
            TaskKind::Document(DocumentOrigin::FreeText) => {
                (reply::DOCUMENT_FAILED, Step::AwaitingTopic)
            }
            TaskKind::PersonaFeedback { persona_id } => (
                reply::PERSONA_FAILED,
                Step::PersonaDialogue {
                    persona_id: Some(persona_id),
                },
            ),
            TaskKind::Recommendation => (reply::RECOMMEND_FAILED, Step::AwaitingTopic),
        };

        self.push(ChatMessage::assistant(text));
        self.session.step = step;
    }

    fn begin_ideas(&mut self, context: String, fallback: Step) -> TaskRequest {
        let messages = prompt::ideas(&context);
        self.session.idea_context = Some(context);
        self.begin(TaskKind::Ideas, Step::GeneratingIdeas, fallback, messages)
    }

    fn begin_feedback(&mut self, persona_id: String, context: &str) -> TaskRequest {
        let step = Step::PersonaDialogue {
            persona_id: Some(persona_id.clone()),
        };
        let messages = prompt::persona_feedback(&persona_id, context);
        self.begin(TaskKind::PersonaFeedback { persona_id }, step.clone(), step, messages)
    }

    fn begin(
        &mut self,
        kind: TaskKind,
        busy: Step,
        fallback: Step,
        messages: Vec<Message>,
    ) -> TaskRequest {
        let pending = PendingTask {
            ticket: Uuid::now_v7(),
            session_id: self.session.id,
            kind,
            fallback,
        };
        tracing::debug!(
            session_id = %self.session.id,
            task = %pending.kind,
            messages = messages.len(),
            "Starting task"
        );
        self.session.step = busy;
        let task = TaskRequest::new(&pending, messages);
        self.pending = Some(pending);
        task
    }

    fn push(&mut self, message: ChatMessage) {
        self.session.messages.push(message);
    }

    fn ensure_idle(&self) -> Result<(), ConversationError> {
        if self.pending.is_some() {
            return Err(ConversationError::Busy);
        }
        Ok(())
    }

    fn ensure_step(&self, expected: &Step) -> Result<(), ConversationError> {
        if &self.session.step != expected {
            return Err(ConversationError::InputNotAccepted {
                step: self.session.step.to_string(),
            });
        }
        Ok(())
    }
}

/// The step a recommendation returns to once it completes.
fn resting_step(step: &Step) -> Step {
    match step {
        Step::GeneratingIdeas
        | Step::GeneratingDocument(_)
        | Step::RecommendingCompanies(_) => Step::AwaitingTopic,
        other => other.clone(),
    }
}

/// Origin of a document request that was in flight when the session was saved.
///
/// Pending tasks are not persisted, so the last user message decides: an idea
/// selection names a title from the current batch.
fn interrupted_document_origin(session: &ChatSession) -> DocumentOrigin {
    let selected = session
        .last_user_message()
        .and_then(|message| message.content.strip_prefix(IDEA_SELECTION_PREFIX));
    match selected {
        Some(title) if session.ideas.iter().any(|idea| idea.title == title) => DocumentOrigin::Idea,
        _ => DocumentOrigin::FreeText,
    }
}
