//! Bookmark entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{BookmarkId, MessageId, UserId};

/// Per-user bookmark on a message
///
/// Bookmarks are independent of message lifetime: deleting the message
/// leaves the record dangling, and consumers must tolerate that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: BookmarkId,
    pub user_id: UserId,
    pub message_id: MessageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub bookmarked_at: DateTime<Utc>,
}
