//! Remote API port
//!
//! The chat backend is an external collaborator reached through plain
//! request/response calls. The domain defines the contract here; the
//! infrastructure layer provides the HTTP implementation, and tests provide
//! in-memory mocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entities::{
    Attachment, Bookmark, Conversation, ConversationOutcome, Gif, Message, PinState, ReadReceipt,
    VoiceMessage,
};
use crate::error::ApiResult;
use crate::value_objects::{BookmarkId, ConversationId, MessageId, TempId, UserId};

/// One page of messages from a poll or history fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    pub messages: Vec<Message>,
    pub has_more: bool,
}

/// Outgoing message payload for a POST
///
/// Carries the client-generated temp id so the server echo can be matched
/// back to the optimistic entry by identity, not by content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    pub temp_id: TempId,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ConversationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gif: Option<Gif>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_message: Option<VoiceMessage>,
}

/// Server echo for a posted message: the confirmed message plus the temp id
/// it reconciles against
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedMessage {
    pub temp_id: TempId,
    pub message: Message,
}

/// Result of a server-side reaction toggle
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionToggle {
    pub added: bool,
}

/// Create-conversation request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversation {
    pub participant_ids: Vec<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub is_group: bool,
}

/// Remote chat API contract
///
/// All calls carry the bearer credential supplied at construction time and
/// surface failures through the `ApiError` taxonomy.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Fetch a page of messages, newest-window first; `conversation` is
    /// `None` for the shared shoutbox
    async fn fetch_messages(
        &self,
        conversation: Option<&ConversationId>,
        before: Option<&MessageId>,
        limit: u32,
    ) -> ApiResult<MessagePage>;

    /// Post a message; the response echoes the temp id for reconciliation
    async fn post_message(&self, outgoing: &OutgoingMessage) -> ApiResult<PostedMessage>;

    /// Hard-delete a message
    async fn delete_message(&self, id: &MessageId) -> ApiResult<()>;

    /// Toggle the caller's reaction on a message
    async fn toggle_reaction(&self, id: &MessageId, emoji: &str) -> ApiResult<ReactionToggle>;

    /// Pin or unpin a message; returns the new pin state
    async fn set_pin(&self, id: &MessageId, pinned: bool) -> ApiResult<Option<PinState>>;

    /// Create a bookmark, or update the note of an existing one
    async fn create_bookmark(&self, id: &MessageId, note: Option<&str>) -> ApiResult<Bookmark>;

    /// List the caller's bookmarks
    async fn list_bookmarks(&self) -> ApiResult<Vec<Bookmark>>;

    /// Delete a bookmark
    async fn delete_bookmark(&self, id: &BookmarkId) -> ApiResult<()>;

    /// Record that the caller has seen a message
    async fn post_read_receipt(&self, id: &MessageId) -> ApiResult<()>;

    /// Fetch read receipts for a message
    async fn fetch_read_receipts(&self, id: &MessageId) -> ApiResult<Vec<ReadReceipt>>;

    /// List the caller's conversations
    async fn list_conversations(&self) -> ApiResult<Vec<Conversation>>;

    /// Create a conversation; duplicate 1:1 creation resolves to the
    /// existing conversation
    async fn create_conversation(
        &self,
        request: &CreateConversation,
    ) -> ApiResult<ConversationOutcome>;

    /// Mark a whole conversation read
    async fn mark_conversation_read(&self, id: &ConversationId) -> ApiResult<()>;

    /// Lightweight unread-mentions badge count for the caller
    async fn unread_mention_count(&self) -> ApiResult<u64>;
}
