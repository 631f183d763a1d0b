//! Reaction ledger - per-message multiset of (emoji, user) pairs
//!
//! Toggle is the sole mutation primitive. Aggregation is a pure function of
//! the ledger with a stable first-seen emoji order, so the UI never reflows
//! between refreshes.

use relay_core::{Message, MessageId, Reaction, ReactionGroup, UserId};

/// Outcome of a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

/// Client-side reaction state for the whole log
#[derive(Debug, Default)]
pub struct ReactionLedger {
    records: Vec<Reaction>,
}

impl ReactionLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle a (message, emoji, user) triple: remove if present, insert if
    /// absent. Idempotent under repeated identical input pairs.
    pub fn toggle(&mut self, message_id: &MessageId, emoji: &str, user_id: &UserId) -> Toggled {
        let existing = self.records.iter().position(|r| {
            r.message_id == *message_id && r.emoji == emoji && r.user_id == *user_id
        });

        match existing {
            Some(pos) => {
                self.records.remove(pos);
                Toggled::Removed
            }
            None => {
                self.records
                    .push(Reaction::new(message_id.clone(), emoji, user_id.clone()));
                Toggled::Added
            }
        }
    }

    /// Check whether a user has reacted with an emoji
    pub fn has_reacted(&self, message_id: &MessageId, emoji: &str, user_id: &UserId) -> bool {
        self.records.iter().any(|r| {
            r.message_id == *message_id && r.emoji == emoji && r.user_id == *user_id
        })
    }

    /// Check whether a message has at least one reaction
    pub fn has_any(&self, message_id: &MessageId) -> bool {
        self.records.iter().any(|r| r.message_id == *message_id)
    }

    /// Aggregate a message's reactions, grouped by emoji in first-seen
    /// insertion order, flagging groups the viewer belongs to
    pub fn aggregate(&self, message_id: &MessageId, viewer: &UserId) -> Vec<ReactionGroup> {
        let mut groups: Vec<ReactionGroup> = Vec::new();

        for record in self.records.iter().filter(|r| r.message_id == *message_id) {
            match groups.iter_mut().find(|g| g.emoji == record.emoji) {
                Some(group) => {
                    group.count += 1;
                    group.users.push(record.user_id.clone());
                    group.has_reacted |= record.user_id == *viewer;
                }
                None => groups.push(ReactionGroup {
                    emoji: record.emoji.clone(),
                    count: 1,
                    users: vec![record.user_id.clone()],
                    has_reacted: record.user_id == *viewer,
                }),
            }
        }

        groups
    }

    /// Replace a message's reactions with the server snapshot from a delta
    pub fn ingest(&mut self, message: &Message) {
        self.records.retain(|r| r.message_id != message.id);
        self.records.extend(message.reactions.iter().cloned());
    }

    /// Drop all reactions of a removed message
    pub fn remove_message(&mut self, message_id: &MessageId) {
        self.records.retain(|r| r.message_id != *message_id);
    }

    /// Total number of reaction records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the ledger is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
