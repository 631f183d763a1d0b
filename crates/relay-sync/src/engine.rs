//! Polling sync engine
//!
//! A tokio interval drives one fetch per tick against the active context.
//! Slow responses skip ticks instead of queueing them, so at most one fetch
//! is ever outstanding. Responses are tagged with the epoch current when the
//! fetch started; stopping or retargeting the engine bumps the epoch, and a
//! stale response is discarded instead of merged.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use relay_core::{ChatApi, ConversationId};

use crate::error::SyncResult;
use crate::state::SharedState;

/// Periodic message sync for one context at a time
pub struct SyncEngine {
    api: Arc<dyn ChatApi>,
    state: SharedState,
    page_limit: u32,
    /// Bumped on every start/stop; in-flight responses from an older epoch
    /// are discarded
    epoch: Arc<AtomicU64>,
    target: Option<ConversationId>,
    poll_task: Option<JoinHandle<()>>,
    mention_task: Option<JoinHandle<()>>,
    mention_badge: Arc<AtomicU64>,
    last_error: watch::Sender<Option<String>>,
}

impl SyncEngine {
    /// Create an engine that is not yet polling
    pub fn new(api: Arc<dyn ChatApi>, state: SharedState, page_limit: u32) -> Self {
        let (last_error, _) = watch::channel(None);
        Self {
            api,
            state,
            page_limit,
            epoch: Arc::new(AtomicU64::new(0)),
            target: None,
            poll_task: None,
            mention_task: None,
            mention_badge: Arc::new(AtomicU64::new(0)),
            last_error,
        }
    }

    /// Start polling a context; `conversation` is `None` for the shoutbox
    ///
    /// Restarting while running retargets: the previous loop stops and any
    /// fetch it still has in flight is discarded. The first fetch fires
    /// immediately, then once per `interval`.
    pub fn start(&mut self, conversation: Option<ConversationId>, interval: Duration) {
        self.halt_polling();
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.target.clone_from(&conversation);
        info!(?conversation, ?interval, "sync started");

        let api = Arc::clone(&self.api);
        let state = Arc::clone(&self.state);
        let epochs = Arc::clone(&self.epoch);
        let errors = self.last_error.clone();
        let limit = self.page_limit;

        self.poll_task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut failing = false;

            loop {
                ticker.tick().await;
                let result = api.fetch_messages(conversation.as_ref(), None, limit).await;
                if epochs.load(Ordering::SeqCst) != epoch {
                    debug!("discarding response from a stopped poll loop");
                    return;
                }
                match result {
                    Ok(page) => {
                        if failing {
                            info!("message poll recovered");
                            failing = false;
                        }
                        errors.send_replace(None);
                        state.lock().apply_delta(page.messages);
                    }
                    Err(error) => {
                        // Surface the failure once, then retry quietly each
                        // tick while the known-good state stays on screen
                        if !failing {
                            warn!(%error, "message poll failed, retrying every tick");
                            errors.send_replace(Some(error.to_string()));
                            failing = true;
                        }
                    }
                }
            }
        }));
    }

    /// Stop polling; in-flight responses are discarded, not merged
    pub fn stop(&mut self) {
        if self.poll_task.is_some() {
            info!("sync stopped");
        }
        self.halt_polling();
        self.target = None;
    }

    fn halt_polling(&mut self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
    }

    /// One immediate out-of-band fetch of the current target
    ///
    /// Returns the number of messages merged. A concurrent retarget between
    /// request and response discards the result.
    #[instrument(skip(self))]
    pub async fn force_refresh(&self) -> SyncResult<usize> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let page = self
            .api
            .fetch_messages(self.target.as_ref(), None, self.page_limit)
            .await?;
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!("discarding stale refresh response");
            return Ok(0);
        }
        let count = page.messages.len();
        self.state.lock().apply_delta(page.messages);
        Ok(count)
    }

    /// Fetch the page older than the oldest confirmed message
    ///
    /// Returns whether the server has more history beyond the merged page.
    /// Overlap with already-held messages is harmless: the merge is keyed by
    /// id. With an empty log this loads the newest window, same as the first
    /// poll tick. A concurrent retarget between request and response
    /// discards the result and reports no more history.
    #[instrument(skip(self))]
    pub async fn load_older(&self) -> SyncResult<bool> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let before = self
            .state
            .lock()
            .store
            .oldest_confirmed()
            .map(|m| m.id.clone());
        let page = self
            .api
            .fetch_messages(self.target.as_ref(), before.as_ref(), self.page_limit)
            .await?;
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!("discarding stale history response");
            return Ok(false);
        }
        let count = page.messages.len();
        let has_more = page.has_more;
        self.state.lock().apply_delta(page.messages);
        debug!(count, has_more, "older page merged");
        Ok(has_more)
    }

    /// Start the independent, slower unread-mentions poll
    ///
    /// Failures leave the last known badge value in place.
    pub fn start_mention_poll(&mut self, interval: Duration) {
        self.stop_mention_poll();
        let api = Arc::clone(&self.api);
        let badge = Arc::clone(&self.mention_badge);

        self.mention_task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match api.unread_mention_count().await {
                    Ok(count) => badge.store(count, Ordering::SeqCst),
                    Err(error) => debug!(%error, "mention poll failed, keeping last badge"),
                }
            }
        }));
    }

    /// Stop the unread-mentions poll
    pub fn stop_mention_poll(&mut self) {
        if let Some(task) = self.mention_task.take() {
            task.abort();
        }
    }

    /// Last server-reported unread-mentions badge
    pub fn unread_mentions(&self) -> u64 {
        self.mention_badge.load(Ordering::SeqCst)
    }

    /// Whether the message poll loop is running
    pub fn is_running(&self) -> bool {
        self.poll_task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// The context currently being polled
    pub fn target(&self) -> Option<&ConversationId> {
        self.target.as_ref()
    }

    /// Observe the surfaced poll failure, `None` while healthy
    pub fn errors(&self) -> watch::Receiver<Option<String>> {
        self.last_error.subscribe()
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
        if let Some(task) = self.mention_task.take() {
            task.abort();
        }
    }
}
