//! Message types for chat-completion requests

use serde::{Deserialize, Serialize};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instruction that frames the model's behaviour
    System,
    /// User message
    User,
    /// Assistant message
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A role-tagged text message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,

    /// Message text; the API may return no content at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Message {
    /// Create a system message with text
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Some(text.into()),
        }
    }

    /// Create a user message with text
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(text.into()),
        }
    }

    /// Text content of the message, if any
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text(), Some("Hello"));
    }

    #[test]
    fn test_system_message() {
        let msg = Message::system("Be creative");
        assert_eq!(msg.role, Role::System);
        assert_eq!(msg.role.as_str(), "system");
    }

    #[test]
    fn test_message_without_content() {
        let msg: Message = serde_json::from_str(r#"{"role":"assistant"}"#).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.text(), None);
    }

    #[test]
    fn test_message_serialization() {
        let json = serde_json::to_value(Message::user("Test")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "Test"}));
    }
}
