//! Reaction entity - one (message, emoji, user) triple

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{MessageId, UserId};

/// A single user's reaction to a message
///
/// Existence is boolean: a user may react with a given emoji to a given
/// message at most once. Counts are derived by aggregation, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub message_id: MessageId,
    pub emoji: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    /// Create a new reaction stamped now
    pub fn new(message_id: MessageId, emoji: impl Into<String>, user_id: UserId) -> Self {
        Self {
            message_id,
            emoji: emoji.into(),
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// Aggregated per-emoji view of a message's reactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionGroup {
    pub emoji: String,
    pub count: usize,
    pub users: Vec<UserId>,
    /// Whether the requesting viewer is among `users`
    pub has_reacted: bool,
}
