//! Navigation hand-off into the chat loop.
//!
//! Carries an initial topic and/or persona selected before the conversation
//! started. It is consumed exactly once.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandOff {
    pub topic: Option<String>,
    pub persona_id: Option<String>,
}

impl HandOff {
    pub fn new(topic: Option<String>, persona_id: Option<String>) -> Self {
        Self {
            topic: topic.filter(|t| !t.trim().is_empty()),
            persona_id: persona_id.filter(|p| !p.trim().is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.topic.is_none() && self.persona_id.is_none()
    }

    /// Take the contents, leaving an empty hand-off behind.
    pub fn take(&mut self) -> HandOff {
        std::mem::take(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_consumes_once() {
        let mut handoff = HandOff::new(Some("远程办公".to_string()), None);
        let first = handoff.take();
        assert_eq!(first.topic.as_deref(), Some("远程办公"));
        assert!(handoff.is_empty());
        assert!(handoff.take().is_empty());
    }

    #[test]
    fn test_blank_values_dropped() {
        let handoff = HandOff::new(Some("  ".to_string()), Some(String::new()));
        assert!(handoff.is_empty());
    }
}
