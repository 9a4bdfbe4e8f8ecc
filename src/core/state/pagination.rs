//! Pagination state and the arithmetic that keeps it consistent

use serde::{Deserialize, Serialize};

use crate::domain::Message;

/// Advisory pagination metadata attached to a server page response.
///
/// Every field is optional on the wire: the backend is the source of
/// truth for the message list itself, but its metadata is treated as a
/// hint and any missing or malformed field is derived locally instead.
/// Zero and negative values carry no meaning for any of these fields and
/// are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub page_size: Option<i64>,
    #[serde(default)]
    pub total_pages: Option<i64>,
    #[serde(default)]
    pub has_more: Option<bool>,
}

impl PageMeta {
    fn page_size(&self) -> Option<u32> {
        positive(self.page_size)
    }

    fn page(&self) -> Option<u32> {
        positive(self.page)
    }

    fn total_pages(&self) -> Option<u32> {
        positive(self.total_pages)
    }

    fn total(&self) -> Option<u64> {
        self.total.and_then(|value| u64::try_from(value).ok())
    }
}

/// One page of messages as returned by
/// `GET <thread>/messages?page=N&page_size=M`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePage {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

/// Describes the locally materialized slice of a server-side,
/// reverse-chronological paginated message list.
///
/// Invariants (maintained by [`PaginationState::resolve`] and the merge
/// operations, never checked at runtime):
/// - `total_pages == max(1, ceil(total / page_size))` whenever
///   `page_size > 0`, unless the server supplied an explicit value
/// - `has_more == page < total_pages` unless the server supplied an
///   explicit boolean
///
/// `page_size == 0` means "not yet known"; callers supply a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    pub page: u32,
    pub page_size: u32,
    pub has_more: bool,
    pub total: u64,
    pub total_pages: u32,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 0,
            has_more: false,
            total: 0,
            total_pages: 1,
        }
    }
}

impl PaginationState {
    /// Derive a consistent state from a server response.
    ///
    /// Field resolution order (first usable value wins):
    /// - `page_size`: server, previous, `fallback_page_size`
    /// - `total`: server, previous
    /// - `total_pages`: server; else derived from `total`/`page_size`;
    ///   else previous
    /// - `page`: server, `default_page` (the caller decides what "no
    ///   answer" means: previous page for a refresh, requested next page
    ///   for a load-older)
    /// - `has_more`: server verbatim (including an explicit `false`);
    ///   else `page < total_pages`
    ///
    /// Total function: malformed input falls back, it never fails.
    pub fn resolve(
        meta: &PageMeta,
        previous: &PaginationState,
        fallback_page_size: u32,
        default_page: u32,
    ) -> PaginationState {
        let page_size = meta
            .page_size()
            .or(nonzero(previous.page_size))
            .unwrap_or(fallback_page_size);

        let total = meta.total().unwrap_or(previous.total);

        let total_pages = meta.total_pages().unwrap_or(if page_size > 0 {
            pages_for(total, page_size)
        } else {
            previous.total_pages
        });
        let total_pages = total_pages.max(1);

        let page = meta.page().unwrap_or(default_page).max(1);
        let has_more = meta.has_more.unwrap_or(page < total_pages);

        PaginationState {
            page,
            page_size,
            has_more,
            total,
            total_pages,
        }
    }

    /// Re-pin `page` after the fact (used by the refresh merge, which
    /// never lets a background poll regress the loaded depth), keeping
    /// `has_more` consistent unless the server pinned it explicitly.
    pub fn with_page(mut self, page: u32, explicit_has_more: Option<bool>) -> PaginationState {
        self.page = page.max(1);
        self.has_more = explicit_has_more.unwrap_or(self.page < self.total_pages);
        self
    }
}

/// `max(1, ceil(total / page_size))` — the page count floor is 1 even
/// for an empty thread.
pub(crate) fn pages_for(total: u64, page_size: u32) -> u32 {
    debug_assert!(page_size > 0);
    let pages = total.div_ceil(u64::from(page_size));
    u32::try_from(pages.max(1)).unwrap_or(u32::MAX)
}

pub(crate) fn nonzero(value: u32) -> Option<u32> {
    (value > 0).then_some(value)
}

fn positive(value: Option<i64>) -> Option<u32> {
    value
        .filter(|value| *value > 0)
        .and_then(|value| u32::try_from(value).ok())
}
