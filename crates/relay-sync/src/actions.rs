//! Optimistic write paths
//!
//! Every mutation applies locally first and then calls the server. What
//! happens on failure depends on the operation: sends roll their optimistic
//! entry back, reaction and pin toggles revert, deletes stay deleted until
//! the next poll restores the truth, and receipts are fire-and-forget.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use relay_core::{BookmarkId, ChatApi, Message, MessageId, PinState, UserId};
use relay_store::{MessageDraft, StoreError, Toggled};

use crate::error::SyncResult;
use crate::state::SharedState;

/// Message-level mutations for the local viewer
pub struct MessageActions {
    api: Arc<dyn ChatApi>,
    state: SharedState,
    viewer: UserId,
}

impl MessageActions {
    /// Create actions bound to a viewer
    pub fn new(api: Arc<dyn ChatApi>, state: SharedState, viewer: UserId) -> Self {
        Self { api, state, viewer }
    }

    /// Send a message
    ///
    /// The draft is validated and inserted optimistically before the POST;
    /// validation failures never reach the network. On POST failure the
    /// optimistic entry is rolled back and the error surfaces to the caller
    /// for a retry affordance.
    #[instrument(skip(self, draft), fields(conversation = ?draft.conversation_id))]
    pub async fn send(&self, draft: MessageDraft) -> SyncResult<Message> {
        let temp_id = self.state.lock().store.insert_optimistic(&draft)?;
        let outgoing = draft.to_outgoing(temp_id.clone());

        match self.api.post_message(&outgoing).await {
            Ok(posted) => {
                let mut state = self.state.lock();
                state.store.reconcile(&posted.temp_id, posted.message.clone());
                info!(id = %posted.message.id, "message confirmed");
                Ok(posted.message)
            }
            Err(error) => {
                self.state.lock().store.remove_pending(&temp_id);
                warn!(%error, "send failed, optimistic entry rolled back");
                Err(error.into())
            }
        }
    }

    /// Hard-delete a message
    ///
    /// Optimistic with no rollback: on server failure the local removal
    /// stands, and the next poll re-delivers the message if the server still
    /// has it.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &MessageId) -> SyncResult<()> {
        if !self.state.lock().remove_message(id) {
            return Err(StoreError::MessageNotFound(id.clone()).into());
        }
        if let Err(error) = self.api.delete_message(id).await {
            warn!(%error, "server delete failed, next poll restores the truth");
            return Err(error.into());
        }
        Ok(())
    }

    /// Toggle the viewer's reaction on a message
    ///
    /// Applied optimistically; a server failure restores the presence
    /// captured before the toggle, even if a poll replaced the ledger entry
    /// in the meantime. Reacting to an id missing from the log is refused
    /// locally.
    #[instrument(skip(self))]
    pub async fn react(&self, id: &MessageId, emoji: &str) -> SyncResult<Toggled> {
        let (was_present, toggled) = {
            let mut state = self.state.lock();
            if !state.store.contains(id) {
                return Err(StoreError::MessageNotFound(id.clone()).into());
            }
            let was_present = state.reactions.has_reacted(id, emoji, &self.viewer);
            let toggled = state.reactions.toggle(id, emoji, &self.viewer);
            (was_present, toggled)
        };

        match self.api.toggle_reaction(id, emoji).await {
            Ok(_) => Ok(toggled),
            Err(error) => {
                let mut state = self.state.lock();
                if state.reactions.has_reacted(id, emoji, &self.viewer) != was_present {
                    state.reactions.toggle(id, emoji, &self.viewer);
                }
                warn!(%error, "reaction toggle failed, reverted");
                Err(error.into())
            }
        }
    }

    /// Pin a message; an existing pin is overwritten
    #[instrument(skip(self))]
    pub async fn pin(&self, id: &MessageId) -> SyncResult<PinState> {
        let (previous, optimistic) = {
            let mut state = self.state.lock();
            if !state.store.contains(id) {
                return Err(StoreError::MessageNotFound(id.clone()).into());
            }
            let previous = state.pins.pin_of(id).cloned();
            let optimistic = state.pins.pin(id, &self.viewer);
            (previous, optimistic)
        };

        match self.api.set_pin(id, true).await {
            Ok(Some(state)) => {
                self.state.lock().pins.set_pin_state(id, Some(state.clone()));
                Ok(state)
            }
            // Server did not echo a state; keep the optimistic one
            Ok(None) => Ok(optimistic),
            Err(error) => {
                self.state.lock().pins.set_pin_state(id, previous);
                warn!(%error, "pin failed, reverted");
                Err(error.into())
            }
        }
    }

    /// Remove a message's pin
    #[instrument(skip(self))]
    pub async fn unpin(&self, id: &MessageId) -> SyncResult<()> {
        let previous = self.state.lock().pins.unpin(id);

        if let Err(error) = self.api.set_pin(id, false).await {
            self.state.lock().pins.set_pin_state(id, previous);
            warn!(%error, "unpin failed, reverted");
            return Err(error.into());
        }
        Ok(())
    }

    /// Bookmark a message, or update the note of an existing bookmark
    ///
    /// The message must exist at bookmark time; the record may later dangle
    /// if the message is deleted.
    #[instrument(skip(self, note))]
    pub async fn bookmark(&self, id: &MessageId, note: Option<String>) -> SyncResult<BookmarkId> {
        let (bookmark_id, previous_note, existed) = {
            let mut state = self.state.lock();
            if !state.store.contains(id) {
                return Err(StoreError::MessageNotFound(id.clone()).into());
            }
            let previous = state.pins.bookmark_of(&self.viewer, id).cloned();
            let bookmark_id = state.pins.bookmark(id, &self.viewer, note.clone());
            (
                bookmark_id,
                previous.as_ref().and_then(|b| b.note.clone()),
                previous.is_some(),
            )
        };

        match self.api.create_bookmark(id, note.as_deref()).await {
            Ok(_) => Ok(bookmark_id),
            Err(error) => {
                let mut state = self.state.lock();
                if existed {
                    state.pins.bookmark(id, &self.viewer, previous_note);
                } else {
                    state.pins.remove_bookmark(&bookmark_id);
                }
                warn!(%error, "bookmark failed, reverted");
                Err(error.into())
            }
        }
    }

    /// Remove a bookmark
    ///
    /// Like delete, the local removal stands even on server failure; the
    /// next bookmark list refresh restores the truth.
    #[instrument(skip(self))]
    pub async fn remove_bookmark(&self, id: &BookmarkId) -> SyncResult<()> {
        self.state.lock().pins.remove_bookmark(id);
        if let Err(error) = self.api.delete_bookmark(id).await {
            warn!(%error, "server bookmark delete failed");
            return Err(error.into());
        }
        Ok(())
    }

    /// Refresh the viewer's bookmark list from the server
    pub async fn refresh_bookmarks(&self) -> SyncResult<usize> {
        let bookmarks = self.api.list_bookmarks().await?;
        let count = bookmarks.len();
        self.state
            .lock()
            .pins
            .replace_bookmarks(&self.viewer, bookmarks);
        Ok(count)
    }

    /// A message became visible in the viewport
    ///
    /// Each (message, viewer) pair is evaluated once per mount, recorded
    /// locally behind the privacy gate, and posted best-effort: a lost
    /// receipt POST is not retried and is not an error.
    #[instrument(skip(self))]
    pub async fn mark_visible(&self, id: &MessageId) -> SyncResult<bool> {
        let recorded = {
            let mut state = self.state.lock();
            state.store.contains(id)
                && state.visibility.should_mark(id, &self.viewer)
                && state.receipts.mark_read(id, &self.viewer)
        };

        if recorded {
            if let Err(error) = self.api.post_read_receipt(id).await {
                debug!(%error, "receipt post lost, not retried");
            }
        }
        Ok(recorded)
    }

    /// Refresh a message's receipts from the server
    pub async fn refresh_receipts(&self, id: &MessageId) -> SyncResult<usize> {
        let receipts = self.api.fetch_read_receipts(id).await?;
        let count = receipts.len();
        self.state.lock().receipts.ingest(receipts);
        Ok(count)
    }
}
