use crate::core::cmd::SyncCmd;
use crate::core::msg::{FetchStage, SyncMsg};
use crate::core::send::validate_draft;
use crate::core::state::SyncState;

/// Elm-like update function.
///
/// The single mutation path for a thread view: consumes the current
/// state and a message, returns the next state and the side effects to
/// run. One call is the atomic transaction unit — the event loop applies
/// calls sequentially, which is all the concurrency control the
/// protocol needs.
pub fn update(msg: SyncMsg, mut state: SyncState) -> (SyncState, Vec<SyncCmd>) {
    match msg {
        SyncMsg::EditDraft(content) => {
            state.input.content = content;
            (state, vec![])
        }

        SyncMsg::Submit => {
            if state.input.submitting {
                // A submission is already in flight; the view disables
                // its send control, this is the defensive twin.
                return (state, vec![]);
            }

            match validate_draft(
                &state.input.content,
                state.liveness.is_member,
                state.limits.max_message_length,
            ) {
                Ok(content) => {
                    state.input.submitting = true;
                    state.input.error = None;
                    (state, vec![SyncCmd::SubmitDraft { content }])
                }
                Err(err) => {
                    state.input.error = Some(err.to_string());
                    (state, vec![])
                }
            }
        }

        SyncMsg::SentConfirmed(message) => {
            let fallback = state.limits.fallback_page_size;
            state.thread.apply_sent(message, fallback);
            state.input.content.clear();
            state.input.error = None;
            state.input.submitting = false;
            (state, vec![])
        }

        SyncMsg::SendFailed { message } => {
            state.input.submitting = false;
            state.input.error = Some(message);
            (state, vec![])
        }

        SyncMsg::PollTick => {
            if !state.should_poll() {
                // A tick raced a liveness flip; the driver has already
                // been told to stand down.
                return (state, vec![]);
            }

            state.thread.start_polling_fetch();
            let page_size = state.page_size_for_fetch();
            (state, vec![SyncCmd::FetchLatest { page_size }])
        }

        SyncMsg::LivenessChanged(liveness) => {
            let was_polling = state.should_poll();
            state.liveness = liveness;

            // Entering the pollable state refreshes immediately rather
            // than waiting a full interval.
            if state.should_poll() && !was_polling {
                state.thread.start_polling_fetch();
                let page_size = state.page_size_for_fetch();
                (state, vec![SyncCmd::FetchLatest { page_size }])
            } else {
                (state, vec![])
            }
        }

        SyncMsg::LatestPage(page) => {
            let fallback = state.limits.fallback_page_size;
            state.thread.merge_latest(page, fallback);
            state.thread.finish_polling_fetch();
            state.last_error = None;
            (state, vec![])
        }

        SyncMsg::LoadOlder => {
            if !state.liveness.is_member
                || !state.thread.pagination().has_more
                || state.thread.is_loading_older()
            {
                return (state, vec![]);
            }

            state.thread.start_loading_older();
            let page = state.thread.pagination().page.saturating_add(1);
            let page_size = state.page_size_for_fetch();
            (state, vec![SyncCmd::FetchOlder { page, page_size }])
        }

        SyncMsg::OlderPage(page) => {
            let fallback = state.limits.fallback_page_size;
            state.thread.merge_older(page, fallback);
            state.thread.finish_loading_older();
            state.last_error = None;
            (state, vec![])
        }

        SyncMsg::FetchFailed { stage, message } => {
            match stage {
                // A missed refresh is harmless; the next tick retries.
                FetchStage::Latest => {
                    state.thread.finish_polling_fetch();
                }
                // A failed load-older is user-initiated, so it is
                // surfaced and the user may retry manually.
                FetchStage::Older => {
                    state.thread.finish_loading_older();
                    state.last_error = Some(message);
                }
            }
            (state, vec![])
        }
    }
}
