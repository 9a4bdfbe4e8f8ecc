use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Poll cadence for room threads. Rooms are broadcast spaces with many
/// readers per writer, so a slow refresh keeps backend load bounded.
const ROOM_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Poll cadence for conversation threads. Conversations are few-party
/// exchanges where replies arrive quickly, so they refresh faster.
const CONVERSATION_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Identity of a message-containing thread.
///
/// Rooms and conversations are distinct backend entities with distinct
/// REST prefixes, but the synchronization protocol treats them
/// identically; this enum is the only place the distinction lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreadId {
    Room(i64),
    Conversation(i64),
}

impl ThreadId {
    /// REST path for this thread's message collection, relative to the
    /// backend base URL.
    pub fn messages_path(&self) -> String {
        match self {
            ThreadId::Room(id) => format!("rooms/{id}/messages"),
            ThreadId::Conversation(id) => format!("conversations/{id}/messages"),
        }
    }

    /// REST path for this thread's detail resource.
    pub fn detail_path(&self) -> String {
        match self {
            ThreadId::Room(id) => format!("rooms/{id}"),
            ThreadId::Conversation(id) => format!("conversations/{id}"),
        }
    }

    /// Default refresh cadence for this thread kind.
    pub fn poll_interval(&self) -> Duration {
        match self {
            ThreadId::Room(_) => ROOM_POLL_INTERVAL,
            ThreadId::Conversation(_) => CONVERSATION_POLL_INTERVAL,
        }
    }

    pub fn numeric_id(&self) -> i64 {
        match self {
            ThreadId::Room(id) | ThreadId::Conversation(id) => *id,
        }
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadId::Room(id) => write!(f, "room {id}"),
            ThreadId::Conversation(id) => write!(f, "conversation {id}"),
        }
    }
}

/// Whether the viewer is allowed to observe and post to a thread right
/// now. Both flags must hold for the refresh driver to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liveness {
    /// Viewer is a current member/participant of the thread.
    pub is_member: bool,
    /// Thread is active (not archived or closed).
    pub is_active: bool,
}

impl Liveness {
    pub fn new(is_member: bool, is_active: bool) -> Self {
        Self {
            is_member,
            is_active,
        }
    }

    /// True iff the live refresh driver may run.
    pub fn permits_polling(&self) -> bool {
        self.is_member && self.is_active
    }
}

impl Default for Liveness {
    fn default() -> Self {
        // Until a snapshot has been fetched nothing is known about the
        // viewer, so the driver stays idle.
        Self {
            is_member: false,
            is_active: false,
        }
    }
}
