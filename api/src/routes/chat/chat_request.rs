use contextor::{ChatMessage, Role};
use serde::Deserialize;

/// Request payload for POST /api/chat.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    /// Conversation so far; only the last entry is answered. Absent and
    /// `null` both mean an empty conversation.
    #[serde(default)]
    pub messages: Option<Vec<InboundMessage>>,
}

/// One message as sent by the chat UI. Every field is optional so that an
/// incomplete message yields the "ask me something" reply instead of a 400.
#[derive(Debug, Default, Deserialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl From<InboundMessage> for ChatMessage {
    fn from(m: InboundMessage) -> Self {
        let role = match m.role.as_deref() {
            Some("assistant") => Role::Assistant,
            _ => Role::User,
        };
        ChatMessage {
            id: m.id,
            role,
            content: m.content.unwrap_or_default(),
        }
    }
}

impl ChatRequest {
    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
            .unwrap_or_default()
            .into_iter()
            .map(ChatMessage::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_messages() {
        let req: ChatRequest = serde_json::from_str(
            r#"{"messages":[{"role":"assistant","content":"hi"},{"id":"7","role":"system"},{}]}"#,
        )
        .unwrap();
        let msgs = req.into_messages();
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[0].role, Role::Assistant);
        assert_eq!(msgs[1].role, Role::User);
        assert_eq!(msgs[1].id.as_deref(), Some("7"));
        assert_eq!(msgs[2].content, "");
    }

    #[test]
    fn missing_or_null_messages_is_empty() {
        let req: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(req.into_messages().is_empty());
        let req: ChatRequest = serde_json::from_str(r#"{"messages":null}"#).unwrap();
        assert!(req.into_messages().is_empty());
    }
}
