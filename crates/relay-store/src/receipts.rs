//! Read receipt tracking with a bidirectional privacy gate
//!
//! A user who turns receipts off neither produces receipt records nor sees
//! anyone else's. `read_at` is the first observation for a pair and is never
//! overwritten.

use std::collections::HashSet;

use chrono::Utc;

use relay_core::{MessageId, ReadReceipt, UserId};

/// Per-message, per-viewer "seen" timestamps
#[derive(Debug, Default)]
pub struct ReadReceiptTracker {
    receipts: Vec<ReadReceipt>,
    /// Users with the privacy flag turned off
    hidden: HashSet<UserId>,
}

impl ReadReceiptTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a user's receipt privacy flag
    pub fn set_receipts_enabled(&mut self, user: &UserId, enabled: bool) {
        if enabled {
            self.hidden.remove(user);
        } else {
            self.hidden.insert(user.clone());
        }
    }

    /// Check a user's receipt privacy flag
    pub fn receipts_enabled(&self, user: &UserId) -> bool {
        !self.hidden.contains(user)
    }

    /// Record that a user has seen a message
    ///
    /// Idempotent: repeated calls never change the original `read_at`.
    /// Returns true only when a new receipt was recorded.
    pub fn mark_read(&mut self, message_id: &MessageId, user: &UserId) -> bool {
        if !self.receipts_enabled(user) {
            return false;
        }
        if self.read_at(message_id, user).is_some() {
            return false;
        }
        self.receipts.push(ReadReceipt {
            message_id: message_id.clone(),
            user_id: user.clone(),
            read_at: Utc::now(),
        });
        true
    }

    /// When the given user first saw the message, if recorded
    pub fn read_at(
        &self,
        message_id: &MessageId,
        user: &UserId,
    ) -> Option<chrono::DateTime<Utc>> {
        self.receipts
            .iter()
            .find(|r| r.message_id == *message_id && r.user_id == *user)
            .map(|r| r.read_at)
    }

    /// Receipts for a message as seen by a viewer
    ///
    /// Empty when the viewer has receipts turned off: the gate hides
    /// incoming receipt information symmetrically.
    pub fn receipts_for(&self, message_id: &MessageId, viewer: &UserId) -> Vec<&ReadReceipt> {
        if !self.receipts_enabled(viewer) {
            return Vec::new();
        }
        self.receipts
            .iter()
            .filter(|r| r.message_id == *message_id)
            .collect()
    }

    /// Merge receipts fetched from the server; existing pairs keep their
    /// original `read_at`
    pub fn ingest(&mut self, incoming: Vec<ReadReceipt>) {
        for receipt in incoming {
            if self.read_at(&receipt.message_id, &receipt.user_id).is_none() {
                self.receipts.push(receipt);
            }
        }
    }
}

/// Dedup guard for visibility-triggered marking
///
/// The viewport predicate may fire many times while a message scrolls; each
/// (message, viewer) pair is evaluated at most once per mount.
#[derive(Debug, Default)]
pub struct VisibilityGate {
    evaluated: HashSet<(MessageId, UserId)>,
}

impl VisibilityGate {
    /// Create an empty gate
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time a pair becomes visible this mount
    pub fn should_mark(&mut self, message_id: &MessageId, viewer: &UserId) -> bool {
        self.evaluated
            .insert((message_id.clone(), viewer.clone()))
    }

    /// A new mount re-evaluates everything
    pub fn reset_mount(&mut self) {
        self.evaluated.clear();
    }
}
