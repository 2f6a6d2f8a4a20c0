//! Public API types re-used by external crates (e.g., the HTTP API layer).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the transcript sent by the UI.
///
/// # Example
/// ```
/// use contextor::{ChatMessage, Role};
/// let m: ChatMessage = serde_json::from_str(r#"{"role":"user","content":"Hi"}"#).unwrap();
/// assert_eq!(m.role, Role::User);
/// assert!(m.id.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: None,
            role: Role::User,
            content: content.into(),
        }
    }
}

/// The single message returned for a request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub id: String,
    pub content: String,
    pub role: Role,
}

impl AnswerResult {
    /// Assistant message with a fresh random id.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            role: Role::Assistant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_serializes_with_lowercase_role() {
        let a = AnswerResult::assistant("hello");
        let v = serde_json::to_value(&a).unwrap();
        assert_eq!(v["role"], "assistant");
        assert_eq!(v["content"], "hello");
        assert!(Uuid::parse_str(v["id"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn ids_are_fresh() {
        assert_ne!(AnswerResult::assistant("a").id, AnswerResult::assistant("a").id);
    }
}
