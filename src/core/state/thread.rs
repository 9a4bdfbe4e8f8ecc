//! Locally held view of one thread's message list

use std::collections::HashSet;

use crate::core::state::pagination::{nonzero, pages_for, MessagePage, PaginationState};
use crate::domain::Message;

/// The locally materialized slice of a thread's messages, newest first,
/// together with the pagination metadata describing it.
///
/// The list is owned by a single view session and only ever rewritten
/// wholesale by one of the three merge operations below; no two entries
/// share an id. The merge operations perform no I/O, raise no errors and
/// are safe to call in any order — interleavings of a poll result and a
/// load-older result commute for message-set membership, while `page`
/// and `has_more` are last-writer-wins (an accepted inconsistency
/// window, matched to how the views actually behave).
#[derive(Debug, Clone, Default)]
pub struct ThreadState {
    messages: Vec<Message>,
    pagination: PaginationState,
    loading_older: bool,
    polling: bool,
}

impl ThreadState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a freshly opened view with server-rendered state.
    pub fn with_initial(messages: Vec<Message>, pagination: PaginationState) -> Self {
        Self {
            messages,
            pagination,
            loading_older: false,
            polling: false,
        }
    }

    /// Messages, newest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn pagination(&self) -> PaginationState {
        self.pagination
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.messages.iter().any(|message| message.id == id)
    }

    /// The newest message currently held, if any.
    pub fn newest(&self) -> Option<&Message> {
        self.messages.first()
    }

    // In-flight markers. The merge operations themselves do not care;
    // the driver uses these to guard re-entry and to surface progress.

    pub fn is_loading_older(&self) -> bool {
        self.loading_older
    }

    pub fn start_loading_older(&mut self) {
        self.loading_older = true;
    }

    pub fn finish_loading_older(&mut self) {
        self.loading_older = false;
    }

    pub fn is_polling(&self) -> bool {
        self.polling
    }

    pub fn start_polling_fetch(&mut self) {
        self.polling = true;
    }

    pub fn finish_polling_fetch(&mut self) {
        self.polling = false;
    }

    /// Fold in a message the server just confirmed for the local viewer.
    ///
    /// The message is known-good (the send call returned it), so it is
    /// prepended immediately instead of waiting for the next poll.
    /// Returns `false` if an entry with the same id was already present
    /// (duplicate submission, or a race with the refresh poller), in
    /// which case nothing changes — `total` included.
    ///
    /// On insert, `total` grows by one and `total_pages` is recomputed
    /// monotonically (it never shrinks); `has_more` follows from the
    /// unchanged current page.
    pub fn apply_sent(&mut self, message: Message, fallback_page_size: u32) -> bool {
        if self.contains(message.id) {
            return false;
        }

        self.messages.insert(0, message);

        let previous = self.pagination;
        let page_size = nonzero(previous.page_size).unwrap_or(fallback_page_size);
        let total = previous.total + 1;
        let total_pages = if page_size > 0 {
            previous.total_pages.max(pages_for(total, page_size))
        } else {
            previous.total_pages
        };

        self.pagination = PaginationState {
            page: previous.page,
            page_size,
            has_more: previous.page < total_pages,
            total,
            total_pages,
        };

        true
    }

    /// Merge a freshly polled page 1 into the local list.
    ///
    /// The server's page-1 entries come first, in server order, and are
    /// authoritative: a local copy of any id the server still reports is
    /// replaced. Older messages already paged in locally are preserved
    /// after them. Applying the same payload twice is a no-op.
    ///
    /// `page` never regresses below the depth already loaded and never
    /// reports past the end: `min(max(previous, server), total_pages)`.
    pub fn merge_latest(&mut self, page: MessagePage, fallback_page_size: u32) {
        let MessagePage { messages: latest, meta } = page;

        let latest_ids: HashSet<i64> = latest.iter().map(|message| message.id).collect();
        let mut merged = latest;
        merged.extend(
            self.messages
                .drain(..)
                .filter(|message| !latest_ids.contains(&message.id)),
        );
        self.messages = merged;

        let previous = self.pagination;
        let resolved = PaginationState::resolve(&meta, &previous, fallback_page_size, 1);
        let highest_loaded = resolved.page.max(previous.page);
        let pinned = highest_loaded.min(resolved.total_pages);
        self.pagination = resolved.with_page(pinned, meta.has_more);
    }

    /// Append a page of older messages fetched for `previous.page + 1`.
    ///
    /// The relative order of everything already held is untouched; only
    /// genuinely new (older) entries are appended, in server order.
    /// Whether this call was allowed (`has_more`, no load in flight) is
    /// the caller's concern — the merge itself is harmless to repeat.
    pub fn merge_older(&mut self, page: MessagePage, fallback_page_size: u32) {
        let MessagePage { messages: older, meta } = page;

        let existing: HashSet<i64> = self.messages.iter().map(|message| message.id).collect();
        self.messages.extend(
            older
                .into_iter()
                .filter(|message| !existing.contains(&message.id)),
        );

        let requested_page = self.pagination.page.saturating_add(1);
        self.pagination =
            PaginationState::resolve(&meta, &self.pagination, fallback_page_size, requested_page);
    }
}
