//! Response interpreter: completion text to structured results.
//!
//! Models are asked for raw JSON but routinely wrap it in prose or code
//! fences, so each parser first cuts out the outermost bracketed span. None of
//! these functions fail: list results degrade to a one-entry sentinel list and
//! the refinement verdict degrades to "ready", each with a warning.

use serde::de::DeserializeOwned;

use sparkai_types::idea::{CompanyRecommendation, Idea, RefinementVerdict};

const PREVIEW_CHARS: usize = 200;

/// Substring from the first `[` to the last `]`, inclusive.
pub fn extract_array(text: &str) -> Option<&str> {
    extract_between(text, '[', ']')
}

/// Substring from the first `{` to the last `}`, inclusive.
pub fn extract_object(text: &str) -> Option<&str> {
    extract_between(text, '{', '}')
}

fn extract_between(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Parse a generated idea list; never empty.
pub fn parse_ideas(text: &str) -> Vec<Idea> {
    match parse_array::<Idea>(text, "ideas") {
        Some(ideas) if !ideas.is_empty() => ideas,
        Some(_) => {
            tracing::warn!(
                content_preview = %preview(text),
                "Idea list was empty; substituting parse-error entry"
            );
            vec![Idea::parse_error()]
        }
        None => vec![Idea::parse_error()],
    }
}

/// Parse a company recommendation list; never empty.
pub fn parse_companies(text: &str) -> Vec<CompanyRecommendation> {
    match parse_array::<CompanyRecommendation>(text, "companies") {
        Some(companies) if !companies.is_empty() => companies,
        Some(_) => {
            tracing::warn!(
                content_preview = %preview(text),
                "Company list was empty; substituting parse-error entry"
            );
            vec![CompanyRecommendation::parse_error()]
        }
        None => vec![CompanyRecommendation::parse_error()],
    }
}

/// Parse a refinement verdict, falling back to "ready".
pub fn parse_verdict(text: &str) -> RefinementVerdict {
    let Some(object) = extract_object(text) else {
        tracing::warn!(
            content_preview = %preview(text),
            "No JSON object in refinement response; proceeding to idea generation"
        );
        return RefinementVerdict::fallback();
    };

    match serde_json::from_str::<RefinementVerdict>(object) {
        Ok(verdict) => verdict,
        Err(e) => {
            tracing::warn!(
                error = %e,
                content_preview = %preview(text),
                "Failed to parse refinement verdict; proceeding to idea generation"
            );
            RefinementVerdict::fallback()
        }
    }
}

/// Document text is used verbatim.
pub fn parse_document(text: &str) -> String {
    text.to_string()
}

fn parse_array<T: DeserializeOwned>(text: &str, what: &'static str) -> Option<Vec<T>> {
    let Some(array) = extract_array(text) else {
        tracing::warn!(
            what,
            content_preview = %preview(text),
            "No JSON array in response; substituting parse-error entry"
        );
        return None;
    };

    match serde_json::from_str::<Vec<T>>(array) {
        Ok(items) => Some(items),
        Err(e) => {
            tracing::warn!(
                what,
                error = %e,
                content_preview = %preview(text),
                "Failed to parse JSON array; substituting parse-error entry"
            );
            None
        }
    }
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparkai_types::idea::{FundingRound, VerdictStatus};

    #[test]
    fn test_extract_array_spans_outermost_brackets() {
        let text = "Here you go:\n```json\n[{\"a\":[1,2]}]\n```\nEnjoy";
        assert_eq!(extract_array(text), Some("[{\"a\":[1,2]}]"));
        assert_eq!(extract_array("no brackets"), None);
        assert_eq!(extract_array("] backwards ["), None);
    }

    #[test]
    fn test_extract_object() {
        assert_eq!(extract_object("x {\"k\":{\"n\":1}} y"), Some("{\"k\":{\"n\":1}}"));
        assert_eq!(extract_object("{"), None);
    }

    #[test]
    fn test_parse_ideas_from_fenced_json() {
        let text = r#"```json
[
  {"id": "1", "title": "PetPal", "description": "宠物社交平台"},
  {"id": "2", "title": "PawMap", "description": "宠物友好地图"}
]
```"#;
        let ideas = parse_ideas(text);
        assert_eq!(ideas.len(), 2);
        assert_eq!(ideas[1].title, "PawMap");
    }

    #[test]
    fn test_parse_ideas_sentinel_on_prose() {
        let ideas = parse_ideas("抱歉，我无法生成创意。");
        assert_eq!(ideas, vec![Idea::parse_error()]);
    }

    #[test]
    fn test_parse_ideas_sentinel_on_bad_json() {
        let ideas = parse_ideas("[{\"id\": 1, \"title\": }]");
        assert_eq!(ideas, vec![Idea::parse_error()]);
    }

    #[test]
    fn test_parse_ideas_sentinel_on_empty_array() {
        assert_eq!(parse_ideas("[]"), vec![Idea::parse_error()]);
    }

    #[test]
    fn test_parse_companies_normalizes_rounds() {
        let text = r#"[
            {"round": "A轮", "company": "小红书", "reason": "社区"},
            {"round": "Series B", "company": "得物", "reason": "潮流"},
            {"round": "c", "company": "美团", "reason": "本地生活"},
            {"round": "D round", "company": "拼多多", "reason": "下沉市场"}
        ]"#;
        let companies = parse_companies(text);
        let rounds: Vec<_> = companies.iter().map(|c| c.round).collect();
        assert_eq!(
            rounds,
            vec![FundingRound::A, FundingRound::B, FundingRound::C, FundingRound::D]
        );
    }

    #[test]
    fn test_parse_companies_bad_round_fails_whole_list() {
        let text = r#"[{"round": "A", "company": "X", "reason": "Y"}, {"round": "Seed", "company": "Z", "reason": "W"}]"#;
        assert_eq!(parse_companies(text), vec![CompanyRecommendation::parse_error()]);
    }

    #[test]
    fn test_parse_verdict() {
        let verdict = parse_verdict("好的：{\"status\":\"ask\",\"content\":\"谁是目标用户？\"}");
        assert_eq!(verdict.status, VerdictStatus::Ask);
        assert_eq!(verdict.content, "谁是目标用户？");
    }

    #[test]
    fn test_parse_verdict_fallback() {
        assert_eq!(parse_verdict("just text"), RefinementVerdict::fallback());
        assert_eq!(
            parse_verdict("{\"status\":\"maybe\",\"content\":\"?\"}"),
            RefinementVerdict::fallback()
        );
    }

    #[test]
    fn test_parse_document_verbatim() {
        let doc = "# 项目\n\n```rust\nfn main() {}\n```\n";
        assert_eq!(parse_document(doc), doc);
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let text = "中".repeat(500);
        assert_eq!(preview(&text).chars().count(), PREVIEW_CHARS);
    }
}
