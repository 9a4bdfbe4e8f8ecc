use serde::{Deserialize, Serialize};

/// Side effects requested by the update function.
///
/// Commands capture application intent (what to fetch or submit); the
/// runtime owns execution details and feeds results back as messages.
/// Nothing here performs I/O itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncCmd {
    /// Fetch page 1 to pick up the newest messages.
    FetchLatest { page_size: u32 },
    /// Fetch a deeper (older) page.
    FetchOlder { page: u32, page_size: u32 },
    /// Submit a validated draft to the backend.
    SubmitDraft { content: String },
    /// Do nothing (for testing).
    None,
}

impl SyncCmd {
    /// Combine multiple commands into one.
    pub fn batch(commands: Vec<SyncCmd>) -> Vec<SyncCmd> {
        commands
            .into_iter()
            .filter(|cmd| *cmd != SyncCmd::None)
            .collect()
    }

    /// Human-readable name for runtime logs.
    pub fn name(&self) -> &'static str {
        match self {
            SyncCmd::FetchLatest { .. } => "FetchLatest",
            SyncCmd::FetchOlder { .. } => "FetchOlder",
            SyncCmd::SubmitDraft { .. } => "SubmitDraft",
            SyncCmd::None => "None",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_drops_no_ops() {
        let cmds = SyncCmd::batch(vec![
            SyncCmd::None,
            SyncCmd::FetchLatest { page_size: 50 },
            SyncCmd::None,
        ]);
        assert_eq!(cmds, vec![SyncCmd::FetchLatest { page_size: 50 }]);
    }

    #[test]
    fn test_name() {
        assert_eq!(SyncCmd::FetchLatest { page_size: 1 }.name(), "FetchLatest");
        assert_eq!(
            SyncCmd::FetchOlder {
                page: 2,
                page_size: 1
            }
            .name(),
            "FetchOlder"
        );
        assert_eq!(
            SyncCmd::SubmitDraft {
                content: "hi".to_string()
            }
            .name(),
            "SubmitDraft"
        );
    }

    #[test]
    fn test_cmd_serialization() {
        let cmd = SyncCmd::SubmitDraft {
            content: "hello".to_string(),
        };
        let serialized = serde_json::to_string(&cmd).expect("serializable");
        let deserialized: SyncCmd = serde_json::from_str(&serialized).expect("deserializable");
        assert_eq!(cmd, deserialized);
    }
}
