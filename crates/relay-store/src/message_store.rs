//! Authoritative client-side message log
//!
//! Owns identity, ordering, and merge. Every other engine reads this log;
//! only the sync loop and the send/delete code paths mutate it.

use chrono::Utc;
use tracing::debug;

use relay_core::{Message, MessageId, TempId};

use crate::draft::MessageDraft;
use crate::error::StoreResult;

/// Internal tagged entry: optimistic entries keep their temp id until the
/// server echo replaces them.
#[derive(Debug, Clone)]
enum Entry {
    Pending { temp_id: TempId, message: Message },
    Confirmed(Message),
}

impl Entry {
    fn message(&self) -> &Message {
        match self {
            Self::Pending { message, .. } | Self::Confirmed(message) => message,
        }
    }
}

/// Ordered log of messages for one context (shoutbox or a conversation)
///
/// Ordering is ascending `created_at` with id string comparison as a
/// deterministic tiebreak. Merging is keyed by server id: the server copy is
/// authoritative once present, so re-applying a delta is a no-op and
/// out-of-order delta arrival never regresses state.
#[derive(Debug, Default)]
pub struct MessageStore {
    entries: Vec<Entry>,
}

impl MessageStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a validated draft as an optimistic entry
    ///
    /// The entry is visible immediately under a provisional id derived from
    /// the returned temp id, and survives deltas until `reconcile` replaces
    /// it.
    pub fn insert_optimistic(&mut self, draft: &MessageDraft) -> StoreResult<TempId> {
        draft.check()?;
        let temp_id = TempId::generate();
        let message = draft.to_message(temp_id.as_message_id(), Utc::now());
        self.entries.push(Entry::Pending {
            temp_id: temp_id.clone(),
            message,
        });
        self.sort();
        Ok(temp_id)
    }

    /// Replace the optimistic entry carrying `temp_id` with its confirmed
    /// counterpart
    ///
    /// Matching is by temp id, never by content, so two identical bodies
    /// sent in the same second cannot collide. If a poll already delivered
    /// the confirmed message, the merge is keyed by server id and stays a
    /// single entry.
    pub fn reconcile(&mut self, temp_id: &TempId, confirmed: Message) {
        let before = self.entries.len();
        self.entries
            .retain(|e| !matches!(e, Entry::Pending { temp_id: t, .. } if t == temp_id));
        if self.entries.len() == before {
            debug!(%temp_id, "no pending entry for reconcile; merging by id");
        }
        self.upsert(confirmed);
        self.sort();
    }

    /// Merge a delta batch into the log
    ///
    /// Incoming messages replace any existing message with the same id;
    /// unconfirmed optimistic entries are retained. Idempotent by id.
    pub fn apply_delta(&mut self, messages: Vec<Message>) {
        for message in messages {
            self.upsert(message);
        }
        self.sort();
    }

    /// Hard-remove a message from the log
    ///
    /// Reaction and thread views are recomputed, so nothing dangles there;
    /// pins and bookmarks referencing the id become orphaned records their
    /// consumers must null-check.
    pub fn remove(&mut self, id: &MessageId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.message().id != *id);
        self.entries.len() < before
    }

    /// Drop an optimistic entry whose POST failed
    pub fn remove_pending(&mut self, temp_id: &TempId) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|e| !matches!(e, Entry::Pending { temp_id: t, .. } if t == temp_id));
        self.entries.len() < before
    }

    /// Look up a message by id (provisional temp ids included)
    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.entries
            .iter()
            .map(Entry::message)
            .find(|m| m.id == *id)
    }

    /// Check whether a message with this id exists
    pub fn contains(&self, id: &MessageId) -> bool {
        self.get(id).is_some()
    }

    /// Check whether the entry with this id is still awaiting confirmation
    pub fn is_pending(&self, id: &MessageId) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e, Entry::Pending { message, .. } if message.id == *id))
    }

    /// Oldest server-confirmed message, the cursor for fetching older pages
    ///
    /// Pending entries are skipped: their provisional timestamps are local
    /// and cannot anchor a server cursor.
    pub fn oldest_confirmed(&self) -> Option<&Message> {
        self.entries.iter().find_map(|e| match e {
            Entry::Confirmed(message) => Some(message),
            Entry::Pending { .. } => None,
        })
    }

    /// Iterate messages in display order
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().map(Entry::message)
    }

    /// The full ordered sequence, cloned for the presentation layer
    pub fn all(&self) -> Vec<Message> {
        self.iter().cloned().collect()
    }

    /// Number of messages in the log
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries still awaiting server confirmation
    pub fn pending_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, Entry::Pending { .. }))
            .count()
    }

    fn upsert(&mut self, message: Message) {
        for entry in &mut self.entries {
            if let Entry::Confirmed(existing) = entry {
                if existing.id == message.id {
                    *existing = message;
                    return;
                }
            }
        }
        self.entries.push(Entry::Confirmed(message));
    }

    fn sort(&mut self) {
        self.entries.sort_by(|a, b| {
            let (a, b) = (a.message(), b.message());
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
    }
}
