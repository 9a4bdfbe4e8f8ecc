use serde::{Deserialize, Serialize};

use crate::core::state::pagination::MessagePage;
use crate::domain::{Liveness, Message};

/// Which fetch a failure belongs to. A failed page-1 refresh is
/// swallowed (the next tick retries naturally); a failed load-older is
/// surfaced so the user can retry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchStage {
    Latest,
    Older,
}

/// Domain messages for a thread view.
///
/// Everything that can change the view's state arrives here: user
/// intents (editing and submitting the draft, requesting older
/// messages), driver ticks, and the results of the async commands the
/// update function previously issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SyncMsg {
    // View intents
    EditDraft(String),
    Submit,
    LoadOlder,

    // Driver
    PollTick,
    LivenessChanged(Liveness),

    // Command results
    LatestPage(MessagePage),
    OlderPage(MessagePage),
    SentConfirmed(Message),
    SendFailed { message: String },
    FetchFailed { stage: FetchStage, message: String },
}

impl SyncMsg {
    /// Poll ticks fire every few seconds forever; everything else is
    /// rare enough to log individually.
    pub fn is_frequent(&self) -> bool {
        matches!(self, SyncMsg::PollTick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequent_detection() {
        assert!(SyncMsg::PollTick.is_frequent());
        assert!(!SyncMsg::Submit.is_frequent());
        assert!(!SyncMsg::LoadOlder.is_frequent());
    }

    #[test]
    fn test_msg_serialization() {
        let msg = SyncMsg::SendFailed {
            message: "boom".to_string(),
        };
        let serialized = serde_json::to_string(&msg).expect("serializable");
        let deserialized: SyncMsg = serde_json::from_str(&serialized).expect("deserializable");
        assert_eq!(msg, deserialized);
    }
}
