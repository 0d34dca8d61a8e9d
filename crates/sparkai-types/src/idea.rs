//! Structured results extracted from completion text.
//!
//! Ideas, company recommendations, and refinement verdicts are the three
//! shapes the model is asked to produce as JSON. Each carries the sentinel
//! value substituted when the model's output cannot be parsed.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// One candidate product direction.
///
/// `id` is unique within one generated batch only; a refreshed batch may
/// reuse the same ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idea {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    pub description: String,
}

/// Models sometimes emit `"id": 1` instead of `"id": "1"`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

impl Idea {
    /// Placeholder shown when the idea list could not be parsed.
    pub fn parse_error() -> Self {
        Self {
            id: "1".to_string(),
            title: "Parse Error".to_string(),
            description: "Could not parse AI response. Please try again.".to_string(),
        }
    }

    pub fn is_parse_error(&self) -> bool {
        *self == Self::parse_error()
    }
}

/// Funding stage a recommended company typically invests at.
///
/// `Error` only ever appears in the parse-failure sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FundingRound {
    A,
    B,
    C,
    D,
    Error,
}

impl fmt::Display for FundingRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FundingRound::A => write!(f, "A"),
            FundingRound::B => write!(f, "B"),
            FundingRound::C => write!(f, "C"),
            FundingRound::D => write!(f, "D"),
            FundingRound::Error => write!(f, "Error"),
        }
    }
}

impl FromStr for FundingRound {
    type Err = String;

    /// Accepts `A`, `a`, `A轮`, `Series A` and `A round` (and likewise for B-D).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "Error" {
            return Ok(FundingRound::Error);
        }

        let lowered = trimmed.to_lowercase();
        let letter = lowered
            .strip_prefix("series ")
            .or_else(|| lowered.strip_suffix(" round"))
            .or_else(|| lowered.strip_suffix('轮'))
            .unwrap_or(&lowered)
            .trim();

        match letter {
            "a" => Ok(FundingRound::A),
            "b" => Ok(FundingRound::B),
            "c" => Ok(FundingRound::C),
            "d" => Ok(FundingRound::D),
            _ => Err(format!("invalid funding round: '{s}'")),
        }
    }
}

impl TryFrom<String> for FundingRound {
    type Error = String;

    fn try_from(value: String) -> Result<Self, String> {
        value.parse()
    }
}

impl From<FundingRound> for String {
    fn from(round: FundingRound) -> Self {
        round.to_string()
    }
}

/// One suggested investor for a funding stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecommendation {
    pub round: FundingRound,
    pub company: String,
    pub reason: String,
}

impl CompanyRecommendation {
    /// Placeholder shown when the recommendation list could not be parsed.
    pub fn parse_error() -> Self {
        Self {
            round: FundingRound::Error,
            company: "Parse Error".to_string(),
            reason: "Could not parse AI response.".to_string(),
        }
    }
}

/// Whether the refinement dialogue should continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStatus {
    /// Ask the user another clarifying question.
    Ask,
    /// Enough is known; proceed to idea generation.
    Ready,
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerdictStatus::Ask => write!(f, "ask"),
            VerdictStatus::Ready => write!(f, "ready"),
        }
    }
}

/// The model's decision after a refinement round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinementVerdict {
    pub status: VerdictStatus,
    pub content: String,
}

impl RefinementVerdict {
    /// Used when the verdict cannot be parsed: move on rather than stall.
    pub fn fallback() -> Self {
        Self {
            status: VerdictStatus::Ready,
            content: "我已经掌握了足够的信息，接下来为你生成创意方向。".to_string(),
        }
    }
}
