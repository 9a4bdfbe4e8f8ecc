use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::thread::ThreadId;

/// Kind of a chat message, decoded from the optional `message_type` wire
/// field. Unrecognized values are preserved verbatim instead of rejected,
/// so newer backend message kinds pass through the client untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum MessageKind {
    #[default]
    Text,
    System,
    Other(String),
}

impl From<Option<String>> for MessageKind {
    fn from(value: Option<String>) -> Self {
        match value.as_deref() {
            None | Some("") | Some("text") => MessageKind::Text,
            Some("system") => MessageKind::System,
            Some(other) => MessageKind::Other(other.to_string()),
        }
    }
}

impl From<MessageKind> for Option<String> {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Text => Some("text".to_string()),
            MessageKind::System => Some("system".to_string()),
            MessageKind::Other(other) => Some(other),
        }
    }
}

/// One chat message as reported by the backend.
///
/// Messages are immutable once created: the server assigns `id`
/// (monotonic, never reused) and `sent_at`, and this subsystem never
/// observes edits or deletions. The sender fields are nullable because a
/// sender account may have been deleted or anonymized after the fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub sender_id: Option<i64>,
    pub sender_username: Option<String>,
    pub content: String,
    #[serde(rename = "message_type", default)]
    pub kind: MessageKind,
    pub sent_at: DateTime<Utc>,
    pub room_id: Option<i64>,
    pub conversation_id: Option<i64>,
}

impl Message {
    /// The thread this message belongs to.
    ///
    /// Exactly one of `room_id`/`conversation_id` is expected to be set.
    /// A payload violating that is tolerated: `room_id` wins over
    /// `conversation_id`, and `None` means the owning thread is unknown.
    pub fn thread_id(&self) -> Option<ThreadId> {
        match (self.room_id, self.conversation_id) {
            (Some(room), _) => Some(ThreadId::Room(room)),
            (None, Some(conversation)) => Some(ThreadId::Conversation(conversation)),
            (None, None) => None,
        }
    }

    /// Display name of the sender, falling back for anonymized accounts.
    pub fn sender_label(&self) -> &str {
        self.sender_username.as_deref().unwrap_or("(deleted user)")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "id": 42,
            "sender_id": 7,
            "sender_username": "ada",
            "content": "hello",
            "sent_at": "2024-05-01T12:30:00Z",
            "room_id": 3,
            "conversation_id": null
        }"#
    }

    #[test]
    fn test_message_deserialization() {
        let message: Message = serde_json::from_str(sample_json()).expect("valid payload");

        assert_eq!(message.id, 42);
        assert_eq!(message.sender_username.as_deref(), Some("ada"));
        assert_eq!(message.kind, MessageKind::Text);
        assert_eq!(message.thread_id(), Some(ThreadId::Room(3)));
    }

    #[test]
    fn test_message_kind_defaults_to_text_when_absent() {
        let message: Message = serde_json::from_str(sample_json()).expect("valid payload");
        assert_eq!(message.kind, MessageKind::Text);
    }

    #[test]
    fn test_message_kind_preserves_unknown_values() {
        let kind = MessageKind::from(Some("ai_summary".to_string()));
        assert_eq!(kind, MessageKind::Other("ai_summary".to_string()));

        let wire: Option<String> = kind.into();
        assert_eq!(wire.as_deref(), Some("ai_summary"));
    }

    #[test]
    fn test_message_kind_known_values() {
        assert_eq!(MessageKind::from(None), MessageKind::Text);
        assert_eq!(MessageKind::from(Some("text".to_string())), MessageKind::Text);
        assert_eq!(
            MessageKind::from(Some("system".to_string())),
            MessageKind::System
        );
    }

    #[test]
    fn test_thread_id_resolution() {
        let mut message: Message = serde_json::from_str(sample_json()).expect("valid payload");

        message.room_id = None;
        message.conversation_id = Some(9);
        assert_eq!(message.thread_id(), Some(ThreadId::Conversation(9)));

        message.conversation_id = None;
        assert_eq!(message.thread_id(), None);

        // Malformed payload with both ids set: room wins.
        message.room_id = Some(1);
        message.conversation_id = Some(2);
        assert_eq!(message.thread_id(), Some(ThreadId::Room(1)));
    }

    #[test]
    fn test_sender_label_for_anonymized_sender() {
        let mut message: Message = serde_json::from_str(sample_json()).expect("valid payload");
        message.sender_id = None;
        message.sender_username = None;

        assert_eq!(message.sender_label(), "(deleted user)");
    }
}
