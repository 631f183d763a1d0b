//! Message entity - a single entry in the shoutbox or a DM conversation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Reaction;
use crate::value_objects::{ConversationId, MessageId, UserId};

/// Message author snapshot as the server sends it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// File attachment payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub url: String,
}

impl Attachment {
    /// Check if the attachment is an image
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Animated GIF payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gif {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Recorded voice message payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceMessage {
    pub url: String,
    pub duration_secs: u32,
}

/// Unfurled link preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkPreview {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Active pin state of a message (at most one, last pinner wins)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinState {
    pub pinned_by: UserId,
    pub pinned_at: DateTime<Utc>,
}

/// Message entity
///
/// `conversation_id` is present for direct messages and absent for the shared
/// shoutbox. `reply_to_id` always references a root message; replies of
/// replies are flattened into the root's thread. The rich payloads are
/// mutually non-exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub author: Author,
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ConversationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gif: Option<Gif>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_message: Option<VoiceMessage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link_previews: Vec<LinkPreview>,
    /// Reaction snapshot as delivered by the server; the live client-side
    /// view is the ReactionLedger
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reactions: Vec<Reaction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<PinState>,
}

impl Message {
    /// Create a bare message with the required fields
    pub fn new(id: MessageId, author: Author, body: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            author,
            body,
            created_at,
            edited_at: None,
            reply_to_id: None,
            conversation_id: None,
            attachment: None,
            gif: None,
            voice_message: None,
            link_previews: Vec::new(),
            reactions: Vec::new(),
            mentions: Vec::new(),
            pinned: None,
        }
    }

    /// Check if the message is a reply
    #[inline]
    pub fn is_reply(&self) -> bool {
        self.reply_to_id.is_some()
    }

    /// Check if the message is a thread root
    #[inline]
    pub fn is_root(&self) -> bool {
        self.reply_to_id.is_none()
    }

    /// Check if the message has been edited
    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }

    /// Check if the message mentions the given user
    pub fn mentions_user(&self, user_id: &UserId) -> bool {
        self.mentions.contains(user_id)
    }

    /// Get a truncated preview of the body (for conversation lists)
    pub fn preview(&self, max_len: usize) -> &str {
        if self.body.len() <= max_len {
            &self.body
        } else {
            let mut end = max_len;
            while !self.body.is_char_boundary(end) && end > 0 {
                end -= 1;
            }
            &self.body[..end]
        }
    }
}
