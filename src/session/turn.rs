//! Turn, transcript and history entry types

use crate::llm::LlmMessage;
use serde::{Deserialize, Serialize};

/// Who wrote a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a conversation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Backend view of this turn
    pub fn to_llm_message(&self) -> LlmMessage {
        match self.role {
            Role::User => LlmMessage::user(self.content.clone()),
            Role::Assistant => LlmMessage::assistant(self.content.clone()),
        }
    }
}

/// Chronological sequence of turns
pub type Transcript = Vec<Turn>;

/// A saved conversation in the sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub title: String,
    pub transcript: Transcript,
}

impl ConversationEntry {
    pub fn new(title: impl Into<String>, transcript: Transcript) -> Self {
        Self {
            title: title.into(),
            transcript,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Turn::assistant("hi")).unwrap(),
            r#"{"role":"assistant","content":"hi"}"#
        );
    }

    #[test]
    fn test_to_llm_message() {
        assert_eq!(Turn::user("a").to_llm_message(), LlmMessage::user("a"));
        assert_eq!(
            Turn::assistant("b").to_llm_message(),
            LlmMessage::assistant("b")
        );
    }
}
