//! Runtime that wires the Elm core to the outside world
//!
//! Owns the event loop for one thread view: messages arrive on an mpsc
//! channel (from the poller, the stdin reader, and completed I/O tasks),
//! pass through the pure update function, and the returned commands are
//! executed as spawned tokio tasks whose results come back as messages.
//! After every update the poller is re-synced to the liveness predicate.

use std::collections::HashSet;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::cmd::SyncCmd;
use crate::core::msg::{FetchStage, SyncMsg};
use crate::core::state::SyncState;
use crate::core::update::update;
use crate::infrastructure::api::ApiClient;
use crate::infrastructure::config::Config;
use crate::infrastructure::poller::Poller;
use crate::Result;

/// How often the viewer's membership/active standing is re-checked.
/// Liveness changes rarely; this only bounds how long a revoked
/// membership keeps a timer alive.
const LIVENESS_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

pub struct SyncRuntime {
    state: SyncState,
    client: ApiClient,
    viewer_id: Option<i64>,
    poller: Poller,
    msg_tx: mpsc::UnboundedSender<SyncMsg>,
    msg_rx: mpsc::UnboundedReceiver<SyncMsg>,
    cancel: CancellationToken,
    /// Ids already written to the terminal, so merges only print what
    /// is genuinely new.
    printed: HashSet<i64>,
    last_input_error: Option<String>,
    last_list_error: Option<String>,
}

impl SyncRuntime {
    pub fn new(state: SyncState, config: &Config) -> Result<Self> {
        let client = ApiClient::new(&config.backend_url)?;
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let poller = Poller::new(msg_tx.clone(), config.poll_interval(state.thread_id));

        Ok(Self {
            state,
            client,
            viewer_id: config.viewer_id,
            poller,
            msg_tx,
            msg_rx,
            cancel: CancellationToken::new(),
            printed: HashSet::new(),
            last_input_error: None,
            last_list_error: None,
        })
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    /// Sender for feeding view intents (stdin lines, load-older
    /// requests) into the loop.
    pub fn msg_sender(&self) -> mpsc::UnboundedSender<SyncMsg> {
        self.msg_tx.clone()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run until cancelled or interrupted. In-flight fetches at that
    /// point are simply dropped, results unapplied.
    pub async fn run(&mut self) -> Result<()> {
        let mut liveness_ticker = tokio::time::interval(LIVENESS_REFRESH_INTERVAL);
        liveness_ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => break,
                result = tokio::signal::ctrl_c() => {
                    result?;
                    tracing::info!("interrupted, shutting down");
                    break;
                }
                // Fires immediately on startup, then every interval.
                _ = liveness_ticker.tick() => self.spawn_liveness_fetch(),
                msg = self.msg_rx.recv() => {
                    match msg {
                        Some(msg) => self.handle_msg(msg),
                        None => break,
                    }
                }
            }
        }

        Ok(())
    }

    /// Apply one message: update, execute the returned commands, re-sync
    /// the poller, report changes to the terminal.
    pub fn handle_msg(&mut self, msg: SyncMsg) {
        if !msg.is_frequent() {
            tracing::debug!(?msg, "applying message");
        }

        let (next, cmds) = update(msg, self.state.clone());
        self.state = next;

        for cmd in &cmds {
            tracing::debug!(cmd = cmd.name(), "executing command");
            self.execute(cmd.clone());
        }

        self.poller.sync_to(self.state.should_poll());
        self.report();
    }

    fn execute(&self, cmd: SyncCmd) {
        let client = self.client.clone();
        let thread = self.state.thread_id;
        let msg_tx = self.msg_tx.clone();

        match cmd {
            SyncCmd::FetchLatest { page_size } => {
                tokio::spawn(async move {
                    match client.fetch_messages(thread, 1, page_size).await {
                        Ok(page) => {
                            let _ = msg_tx.send(SyncMsg::LatestPage(page));
                        }
                        Err(err) => {
                            tracing::warn!(%thread, error = %err, "page-1 refresh failed");
                            let _ = msg_tx.send(SyncMsg::FetchFailed {
                                stage: FetchStage::Latest,
                                message: err.to_string(),
                            });
                        }
                    }
                });
            }

            SyncCmd::FetchOlder { page, page_size } => {
                tokio::spawn(async move {
                    match client.fetch_messages(thread, page, page_size).await {
                        Ok(page) => {
                            let _ = msg_tx.send(SyncMsg::OlderPage(page));
                        }
                        Err(err) => {
                            tracing::warn!(%thread, page, error = %err, "load-older failed");
                            let _ = msg_tx.send(SyncMsg::FetchFailed {
                                stage: FetchStage::Older,
                                message: err.to_string(),
                            });
                        }
                    }
                });
            }

            SyncCmd::SubmitDraft { content } => {
                tokio::spawn(async move {
                    match client.send_message(thread, &content).await {
                        Ok(message) => {
                            let _ = msg_tx.send(SyncMsg::SentConfirmed(message));
                        }
                        Err(err) => {
                            tracing::warn!(%thread, error = %err, "send failed");
                            let _ = msg_tx.send(SyncMsg::SendFailed {
                                message: err.send_failure_message(),
                            });
                        }
                    }
                });
            }

            SyncCmd::None => {}
        }
    }

    fn spawn_liveness_fetch(&self) {
        let client = self.client.clone();
        let thread = self.state.thread_id;
        let viewer_id = self.viewer_id;
        let msg_tx = self.msg_tx.clone();

        tokio::spawn(async move {
            match client.fetch_liveness(thread, viewer_id).await {
                Ok(liveness) => {
                    let _ = msg_tx.send(SyncMsg::LivenessChanged(liveness));
                }
                Err(err) => {
                    // Keep whatever standing was last known.
                    tracing::warn!(%thread, error = %err, "liveness check failed");
                }
            }
        });
    }

    /// Print newly merged messages in chronological order, and surface
    /// error transitions once each.
    fn report(&mut self) {
        let fresh: Vec<_> = self
            .state
            .thread
            .messages()
            .iter()
            .rev()
            .filter(|message| !self.printed.contains(&message.id))
            .cloned()
            .collect();

        for message in fresh {
            let when = message.sent_at.format("%H:%M:%S");
            println!("[{when}] {}: {}", message.sender_label(), message.content);
            self.printed.insert(message.id);
        }

        if self.state.input.error != self.last_input_error {
            if let Some(error) = &self.state.input.error {
                eprintln!("! {error}");
            }
            self.last_input_error.clone_from(&self.state.input.error);
        }

        if self.state.last_error != self.last_list_error {
            if let Some(error) = &self.state.last_error {
                eprintln!("! {error}");
            }
            self.last_list_error.clone_from(&self.state.last_error);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::state::pagination::{MessagePage, PageMeta};
    use crate::domain::{Liveness, ThreadId};
    use crate::infrastructure::poller::PollerPhase;
    use crate::test_helpers::room_message;

    fn test_runtime(thread: ThreadId) -> SyncRuntime {
        let config = Config {
            // Nothing listens here; spawned fetches fail and surface as
            // FetchFailed messages, which these tests ignore.
            backend_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        SyncRuntime::new(SyncState::new(thread), &config).expect("runtime builds")
    }

    #[tokio::test]
    async fn test_liveness_gates_poller() {
        let mut runtime = test_runtime(ThreadId::Conversation(5));
        assert_eq!(runtime.poller.phase(), PollerPhase::Idle);

        runtime.handle_msg(SyncMsg::LivenessChanged(Liveness::new(true, true)));
        assert!(runtime.state().should_poll());
        assert_eq!(runtime.poller.phase(), PollerPhase::Polling);

        runtime.handle_msg(SyncMsg::LivenessChanged(Liveness::new(true, false)));
        assert!(!runtime.state().should_poll());
        assert_eq!(runtime.poller.phase(), PollerPhase::Idle);
    }

    #[tokio::test]
    async fn test_merged_pages_are_reported_once() {
        let mut runtime = test_runtime(ThreadId::Room(1));

        let page = MessagePage {
            messages: vec![room_message(2), room_message(1)],
            meta: PageMeta {
                total: Some(2),
                page: Some(1),
                page_size: Some(50),
                total_pages: Some(1),
                has_more: Some(false),
            },
        };

        runtime.handle_msg(SyncMsg::LatestPage(page.clone()));
        assert_eq!(runtime.printed.len(), 2);

        // The same page again merges idempotently and prints nothing new.
        runtime.handle_msg(SyncMsg::LatestPage(page));
        assert_eq!(runtime.printed.len(), 2);
        assert_eq!(runtime.state().thread.len(), 2);
    }

    #[tokio::test]
    async fn test_cancellation_stops_run() {
        let mut runtime = test_runtime(ThreadId::Room(1));
        let cancel = runtime.cancellation_token();

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), runtime.run())
            .await
            .expect("run returns promptly after cancel")
            .expect("run succeeds");
    }
}
