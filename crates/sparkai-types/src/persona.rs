//! Investor persona type.
//!
//! Personas are static: the catalog lives in `sparkai-core::persona` and
//! every field is a compile-time string.

use serde::Serialize;

/// A simulated investor whose fixed prompt shapes feedback on a pitch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Persona {
    pub id: &'static str,
    pub name: &'static str,
    pub role: &'static str,
    pub company: &'static str,
    pub avatar: &'static str,
    pub style_summary: &'static str,
    #[serde(skip)]
    pub prompt: &'static str,
}

impl Persona {
    /// "name, role @ company" as shown in selectors.
    pub fn display_line(&self) -> String {
        format!("{}，{} @ {}", self.name, self.role, self.company)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_skips_prompt() {
        let persona = Persona {
            id: "x",
            name: "X",
            role: "合伙人",
            company: "Y",
            avatar: "🦄",
            style_summary: "直接",
            prompt: "secret prompt",
        };
        let json = serde_json::to_string(&persona).unwrap();
        assert!(!json.contains("secret prompt"));
        assert!(json.contains("\"id\":\"x\""));
        assert_eq!(persona.display_line(), "X，合伙人 @ Y");
    }
}
