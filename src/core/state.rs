use crate::core::send::MESSAGE_MAX_LENGTH;
use crate::domain::{Liveness, Message, ThreadId};

pub mod pagination;
pub mod thread;

pub use pagination::{MessagePage, PageMeta, PaginationState};
pub use thread::ThreadState;

/// Default page size used when neither the server nor previous state
/// supplied one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Unified state for one synchronized thread view.
#[derive(Debug, Clone)]
pub struct SyncState {
    /// Which thread this view is bound to.
    pub thread_id: ThreadId,
    /// Messages plus pagination, maintained by the merge engine.
    pub thread: ThreadState,
    /// Whether the viewer may observe/post right now.
    pub liveness: Liveness,
    /// Draft composition state.
    pub input: InputState,
    /// Last surfaced message-list error (load-older failures). Poll
    /// failures are never surfaced here.
    pub last_error: Option<String>,
    /// Tunables injected from configuration.
    pub limits: SyncLimits,
}

/// Draft input buffer and its submission status.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub content: String,
    pub error: Option<String>,
    pub submitting: bool,
}

/// Per-view tunables, sourced from configuration.
#[derive(Debug, Clone, Copy)]
pub struct SyncLimits {
    /// Page size used when the server never reported one.
    pub fallback_page_size: u32,
    /// Maximum draft length in characters.
    pub max_message_length: usize,
}

impl Default for SyncLimits {
    fn default() -> Self {
        Self {
            fallback_page_size: DEFAULT_PAGE_SIZE,
            max_message_length: MESSAGE_MAX_LENGTH,
        }
    }
}

impl SyncState {
    /// A fresh view of the given thread with nothing loaded yet.
    pub fn new(thread_id: ThreadId) -> Self {
        Self {
            thread_id,
            thread: ThreadState::new(),
            liveness: Liveness::default(),
            input: InputState::default(),
            last_error: None,
            limits: SyncLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: SyncLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Seed with server-rendered initial messages (the first page), as
    /// handed over by whoever opened the view.
    pub fn with_initial(mut self, messages: Vec<Message>, pagination: PaginationState) -> Self {
        self.thread = ThreadState::with_initial(messages, pagination);
        self
    }

    /// Page size to request on the next fetch: last known, else fallback.
    pub fn page_size_for_fetch(&self) -> u32 {
        let known = self.thread.pagination().page_size;
        if known > 0 {
            known
        } else {
            self.limits.fallback_page_size
        }
    }

    /// True iff the live refresh driver may run for this view.
    pub fn should_poll(&self) -> bool {
        self.liveness.permits_polling()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_helpers::room_message;

    #[test]
    fn test_new_state_is_idle_and_empty() {
        let state = SyncState::new(ThreadId::Room(1));

        assert!(state.thread.is_empty());
        assert!(!state.should_poll());
        assert!(state.input.content.is_empty());
        assert_eq!(state.last_error, None);
    }

    #[test]
    fn test_page_size_for_fetch_prefers_known_size() {
        let mut state = SyncState::new(ThreadId::Room(1));
        assert_eq!(state.page_size_for_fetch(), DEFAULT_PAGE_SIZE);

        state.thread = ThreadState::with_initial(
            vec![room_message(1)],
            PaginationState {
                page: 1,
                page_size: 20,
                has_more: false,
                total: 1,
                total_pages: 1,
            },
        );
        assert_eq!(state.page_size_for_fetch(), 20);
    }

    #[test]
    fn test_should_poll_follows_liveness() {
        let mut state = SyncState::new(ThreadId::Conversation(4));
        assert!(!state.should_poll());

        state.liveness = Liveness::new(true, true);
        assert!(state.should_poll());

        state.liveness = Liveness::new(true, false);
        assert!(!state.should_poll());
    }
}
