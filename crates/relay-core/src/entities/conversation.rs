//! Conversation entity - a direct-message channel between two or more users

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Message;
use crate::value_objects::{ConversationId, UserId};

/// Conversation participant (id plus display name for mention resolution)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: UserId,
    pub name: String,
}

/// Direct-message conversation
///
/// For non-group conversations the unordered participant-id set is unique
/// across all conversations; `name` is required iff `is_group`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    pub participants: Vec<Participant>,
    pub is_group: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<Message>,
    #[serde(default)]
    pub unread_count: u32,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Unordered participant-id set, used for duplicate detection of 1:1
    /// conversations
    pub fn participant_key(&self) -> BTreeSet<UserId> {
        self.participants.iter().map(|p| p.id.clone()).collect()
    }

    /// Check whether this conversation has exactly the given participant set
    pub fn has_participants(&self, ids: &BTreeSet<UserId>) -> bool {
        self.participant_key() == *ids
    }

    /// Check if the conversation has unread messages
    #[inline]
    pub fn has_unread(&self) -> bool {
        self.unread_count > 0
    }
}

/// Result of a create-conversation request: duplicate 1:1 creation resolves
/// to the existing conversation and is signaled distinctly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationOutcome {
    Created(Conversation),
    Existing(Conversation),
}

impl ConversationOutcome {
    /// The conversation this outcome refers to
    pub fn conversation(&self) -> &Conversation {
        match self {
            Self::Created(c) | Self::Existing(c) => c,
        }
    }

    /// True when the request resolved to a pre-existing conversation
    #[inline]
    pub fn is_existing(&self) -> bool {
        matches!(self, Self::Existing(_))
    }
}
