//! Persona catalog: the simulated investors available for pitch feedback.
//!
//! Dispatch from id to prompt is a plain table lookup.

mod catalog;

use sparkai_types::persona::Persona;

pub use catalog::GENERIC_PROMPT;

/// Every persona, in display order.
pub fn all() -> &'static [Persona] {
    catalog::PERSONAS
}

/// Find a persona by id (case-insensitive).
pub fn lookup(id: &str) -> Option<&'static Persona> {
    let id = id.trim();
    catalog::PERSONAS
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(id))
}

/// System prompt for a persona; unknown ids get [`GENERIC_PROMPT`].
pub fn prompt_for(id: &str) -> &'static str {
    lookup(id).map(|p| p.prompt).unwrap_or(GENERIC_PROMPT)
}

/// Ids of all personas, as carried by a persona-selector message.
pub fn ids() -> Vec<String> {
    catalog::PERSONAS.iter().map(|p| p.id.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_ids_unique() {
        let ids: HashSet<_> = all().iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), all().len());
        assert_eq!(all().len(), 8);
    }

    #[test]
    fn test_lookup() {
        let persona = lookup("sequoia").unwrap();
        assert_eq!(persona.name, "沈南鹏");
        assert_eq!(lookup(" ELON ").unwrap().id, "elon");
        assert!(lookup("softbank").is_none());
    }

    #[test]
    fn test_prompt_for_falls_back() {
        assert!(prompt_for("ycombinator").contains("Paul Graham"));
        assert_eq!(prompt_for("unknown"), GENERIC_PROMPT);
    }

    #[test]
    fn test_every_prompt_requests_chinese() {
        for persona in all() {
            assert!(persona.prompt.contains("REPLY IN CHINESE"), "{}", persona.id);
        }
    }
}
