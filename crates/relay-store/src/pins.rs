//! Pins and bookmarks - per-message/per-user flags independent of the log
//!
//! Both live in side tables keyed by message id. Deleting a message does not
//! clean them up; records referencing a missing id are dangling and
//! consumers must null-check against the store.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use relay_core::{Bookmark, BookmarkId, MessageId, PinState, UserId};

/// Pin and bookmark state
#[derive(Debug, Default)]
pub struct PinBookmarkManager {
    pins: HashMap<MessageId, PinState>,
    bookmarks: Vec<Bookmark>,
}

impl PinBookmarkManager {
    /// Create empty state
    pub fn new() -> Self {
        Self::default()
    }

    // === Pins ===

    /// Pin a message; an existing pin is overwritten (last pinner wins, no
    /// pin history)
    pub fn pin(&mut self, message_id: &MessageId, user: &UserId) -> PinState {
        let state = PinState {
            pinned_by: user.clone(),
            pinned_at: Utc::now(),
        };
        self.pins.insert(message_id.clone(), state.clone());
        state
    }

    /// Remove a message's pin, returning the previous state if any
    pub fn unpin(&mut self, message_id: &MessageId) -> Option<PinState> {
        self.pins.remove(message_id)
    }

    /// Current pin state of a message
    pub fn pin_of(&self, message_id: &MessageId) -> Option<&PinState> {
        self.pins.get(message_id)
    }

    /// Overwrite a message's pin state with the server snapshot from a delta
    pub fn set_pin_state(&mut self, message_id: &MessageId, state: Option<PinState>) {
        match state {
            Some(state) => {
                self.pins.insert(message_id.clone(), state);
            }
            None => {
                self.pins.remove(message_id);
            }
        }
    }

    /// Ids of all currently pinned messages
    pub fn pinned_ids(&self) -> impl Iterator<Item = &MessageId> {
        self.pins.keys()
    }

    // === Bookmarks ===

    /// Bookmark a message for a user
    ///
    /// One bookmark per (user, message) pair: re-bookmarking updates the
    /// note in place and returns the existing id.
    pub fn bookmark(
        &mut self,
        message_id: &MessageId,
        user: &UserId,
        note: Option<String>,
    ) -> BookmarkId {
        if let Some(existing) = self
            .bookmarks
            .iter_mut()
            .find(|b| b.message_id == *message_id && b.user_id == *user)
        {
            existing.note = note;
            return existing.id.clone();
        }

        let id = BookmarkId::new(Uuid::new_v4().to_string());
        self.bookmarks.push(Bookmark {
            id: id.clone(),
            user_id: user.clone(),
            message_id: message_id.clone(),
            note,
            bookmarked_at: Utc::now(),
        });
        id
    }

    /// Delete a bookmark by id
    pub fn remove_bookmark(&mut self, id: &BookmarkId) -> bool {
        let before = self.bookmarks.len();
        self.bookmarks.retain(|b| b.id != *id);
        self.bookmarks.len() < before
    }

    /// All bookmarks of a user, oldest first
    pub fn bookmarks_for(&self, user: &UserId) -> Vec<&Bookmark> {
        self.bookmarks
            .iter()
            .filter(|b| b.user_id == *user)
            .collect()
    }

    /// A user's bookmark on a specific message, if any
    pub fn bookmark_of(&self, user: &UserId, message_id: &MessageId) -> Option<&Bookmark> {
        self.bookmarks
            .iter()
            .find(|b| b.user_id == *user && b.message_id == *message_id)
    }

    /// Replace a user's bookmarks with the server list
    pub fn replace_bookmarks(&mut self, user: &UserId, incoming: Vec<Bookmark>) {
        self.bookmarks.retain(|b| b.user_id != *user);
        self.bookmarks.extend(incoming);
    }
}
