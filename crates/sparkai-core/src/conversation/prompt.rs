//! Prompt builders, one per task.
//!
//! Each returns the full message list (system prompt first) for a single
//! completion. Generation parameters are applied later by the orchestrator.

use sparkai_types::chat::{ChatMessage, MessageRole};
use sparkai_types::llm::Message;

use crate::persona;

use super::machine::{IDEA_COUNT, MAX_REFINEMENT_ROUNDS};

/// Clarify a vague idea, or declare it ready, as a JSON object.
pub fn refinement(history: &[ChatMessage], input: &str, rounds: u8) -> Vec<Message> {
    let system = format!(
        "You are an expert startup consultant.
Your goal is to help the user clarify their vague hackathon/startup idea to make it more attractive, creative, and feasible.

Current Status:
- Round Count: {rounds} (Max {MAX_REFINEMENT_ROUNDS} rounds of questioning allowed)

Task:
1. Analyze the User's latest input and the conversation history.
2. Decide if you have enough information to generate high-quality project ideas.
   - Information needed: Target Audience, Core Value Proposition, Tech Stack preference (optional), Key Innovation.
3. IF (Information is missing OR vague) AND (Round Count < {MAX_REFINEMENT_ROUNDS}):
   - Return status: \"ask\"
   - Content: Ask 1-2 specific, insightful questions to clarify the missing info. Be encouraging but probing. (IN CHINESE)
4. IF (Information is sufficient) OR (Round Count >= {MAX_REFINEMENT_ROUNDS}):
   - Return status: \"ready\"
   - Content: A brief summary of the refined requirements, acknowledging you are ready to generate ideas. (IN CHINESE)

Format output STRICTLY as a JSON object:
{{
  \"status\": \"ask\" | \"ready\",
  \"content\": \"Your question or summary here\"
}}
Do NOT include markdown formatting."
    );

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(system));
    messages.extend(history.iter().filter_map(to_llm_message));
    messages.push(Message::user(input));
    messages
}

/// Brainstorm exactly [`IDEA_COUNT`] ideas as a JSON array.
pub fn ideas(context: &str) -> Vec<Message> {
    let system = format!(
        "You are an expert startup consultant and hackathon mentor.
Your task is to brainstorm {IDEA_COUNT} distinct and innovative project ideas based on the user's requirements context.

IMPORTANT: ALL CONTENT MUST BE IN CHINESE (Except for the English name of the project).

Context:
{context}

For each idea, provide:
1. A catchy, tech-savvy name (English is okay for the name).
2. A one-sentence elevator pitch describing the core value and technology (MUST BE IN CHINESE).

Format the output STRICTLY as a JSON array of exactly {IDEA_COUNT} objects, like this:
[
  {{\"id\": \"1\", \"title\": \"Idea Name 1\", \"description\": \"中文描述 1\"}},
  {{\"id\": \"2\", \"title\": \"Idea Name 2\", \"description\": \"中文描述 2\"}},
  ...
]
Do NOT include any markdown formatting (like ```json), just the raw JSON string."
    );

    vec![
        Message::system(system),
        Message::user("Please generate the ideas based on the context above."),
    ]
}

/// Six-section Markdown pitch document.
pub fn document(title: &str, description: &str) -> Vec<Message> {
    const SYSTEM: &str = "You are an experienced product manager and technical architect.
Create a detailed project documentation (Markdown format) for the following startup/hackathon idea.

IMPORTANT: ALL CONTENT MUST BE IN CHINESE.

Structure:
# Project Title
## 1. Executive Summary (项目摘要)
## 2. Problem Statement & Pain Points (痛点分析)
## 3. Solution Architecture (Frontend, Backend, AI/Tech Stack) (技术架构)
## 4. Key Features (核心功能)
## 5. Market Analysis & Business Model (市场与商业模式)
## 6. Implementation Roadmap (MVP to Beta) (实施路线图)

Keep it professional, concise, and actionable. Use Geek/VC terminology.";

    vec![
        Message::system(SYSTEM),
        Message::user(format!("Title: {title}\nDescription: {description}")),
    ]
}

/// Feedback on a project from one persona.
pub fn persona_feedback(persona_id: &str, context: &str) -> Vec<Message> {
    vec![
        Message::system(persona::prompt_for(persona_id)),
        Message::user(format!(
            "Here is my project idea:\n\n{context}\n\nPlease give me your feedback."
        )),
    ]
}

/// One representative company per funding round A-D, as a JSON array.
pub fn recommendation(input: &str) -> Vec<Message> {
    const SYSTEM: &str = "You are a venture capital analyst and market researcher.
Your task is to recommend representative companies for A, B, C, and D funding rounds based on the user's input (project idea, industry, or domain).

IMPORTANT: ALL CONTENT MUST BE IN CHINESE.

For each round (A, B, C, D), provide:
1. A representative company name (real existing companies if possible, or highly plausible examples).
2. A brief reason why they fit this round and how they relate to the user's domain (IN CHINESE).

Format the output STRICTLY as a JSON array of objects, like this:
[
  {\"round\": \"A\", \"company\": \"Company A\", \"reason\": \"中文理由 A\"},
  {\"round\": \"B\", \"company\": \"Company B\", \"reason\": \"中文理由 B\"},
  {\"round\": \"C\", \"company\": \"Company C\", \"reason\": \"中文理由 C\"},
  {\"round\": \"D\", \"company\": \"Company D\", \"reason\": \"中文理由 D\"}
]
Do NOT include any markdown formatting (like ```json), just the raw JSON string.";

    vec![Message::system(SYSTEM), Message::user(input)]
}

/// Plain-text transcript of the conversation, used as idea context.
pub fn transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .filter_map(|m| {
            let label = match m.role {
                MessageRole::User => "用户",
                MessageRole::Assistant => "顾问",
                MessageRole::System => return None,
            };
            Some(format!("{label}：{}", m.content))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn to_llm_message(message: &ChatMessage) -> Option<Message> {
    match message.role {
        MessageRole::User => Some(Message::user(message.content.clone())),
        MessageRole::Assistant => Some(Message::assistant(message.content.clone())),
        MessageRole::System => None,
    }
}
