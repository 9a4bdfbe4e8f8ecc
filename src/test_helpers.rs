//! Shared fixtures for unit and integration tests

use chrono::{TimeZone, Utc};

use crate::core::state::pagination::PaginationState;
use crate::core::state::thread::ThreadState;
use crate::domain::{Message, MessageKind};

/// A room message with a deterministic body and timestamp derived from
/// its id, so ordering assertions stay readable.
pub fn room_message(id: i64) -> Message {
    Message {
        id,
        sender_id: Some(100 + id),
        sender_username: Some(format!("user{id}")),
        content: format!("message {id}"),
        kind: MessageKind::Text,
        sent_at: Utc
            .timestamp_opt(1_700_000_000 + id, 0)
            .single()
            .expect("in-range timestamp"),
        room_id: Some(1),
        conversation_id: None,
    }
}

/// Like [`room_message`] but scoped to a conversation thread.
pub fn conversation_message(id: i64) -> Message {
    Message {
        room_id: None,
        conversation_id: Some(1),
        ..room_message(id)
    }
}

pub fn thread_with_messages(messages: Vec<Message>, pagination: PaginationState) -> ThreadState {
    ThreadState::with_initial(messages, pagination)
}
