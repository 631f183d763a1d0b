//! Outgoing message draft

use chrono::{DateTime, Utc};
use validator::Validate;

use relay_core::{
    Attachment, Author, ConversationId, Gif, Message, MessageId, OutgoingMessage, TempId, UserId,
    VoiceMessage,
};

use crate::error::{StoreError, StoreResult, MAX_BODY_LEN};

/// A message the viewer is about to send
///
/// Mentions are resolved against the current participant list before the
/// draft enters the store.
#[derive(Debug, Clone, Validate)]
pub struct MessageDraft {
    pub author: Author,
    #[validate(length(max = 500, message = "Message body must be at most 500 characters"))]
    pub body: String,
    pub conversation_id: Option<ConversationId>,
    pub reply_to_id: Option<MessageId>,
    pub attachment: Option<Attachment>,
    pub gif: Option<Gif>,
    pub voice_message: Option<VoiceMessage>,
    pub mentions: Vec<UserId>,
}

impl MessageDraft {
    /// Create a plain text draft
    pub fn new(author: Author, body: impl Into<String>) -> Self {
        Self {
            author,
            body: body.into(),
            conversation_id: None,
            reply_to_id: None,
            attachment: None,
            gif: None,
            voice_message: None,
            mentions: Vec::new(),
        }
    }

    /// Target a DM conversation instead of the shoutbox
    pub fn in_conversation(mut self, conversation_id: ConversationId) -> Self {
        self.conversation_id = Some(conversation_id);
        self
    }

    /// Make the draft a reply to a root message
    pub fn replying_to(mut self, root_id: MessageId) -> Self {
        self.reply_to_id = Some(root_id);
        self
    }

    /// Validate the draft before it touches the store or the network
    pub fn check(&self) -> StoreResult<()> {
        if self.body.trim().is_empty() {
            return Err(StoreError::EmptyBody);
        }
        if self.body.chars().count() > MAX_BODY_LEN {
            return Err(StoreError::BodyTooLong { max: MAX_BODY_LEN });
        }
        self.validate()
            .map_err(|e| StoreError::Validation(e.to_string()))?;
        Ok(())
    }

    /// Materialize the draft as a message with the given id
    pub fn to_message(&self, id: MessageId, created_at: DateTime<Utc>) -> Message {
        Message {
            id,
            author: self.author.clone(),
            body: self.body.clone(),
            created_at,
            edited_at: None,
            reply_to_id: self.reply_to_id.clone(),
            conversation_id: self.conversation_id.clone(),
            attachment: self.attachment.clone(),
            gif: self.gif.clone(),
            voice_message: self.voice_message.clone(),
            link_previews: Vec::new(),
            reactions: Vec::new(),
            mentions: self.mentions.clone(),
            pinned: None,
        }
    }

    /// Build the wire payload for the POST, carrying the temp id
    pub fn to_outgoing(&self, temp_id: TempId) -> OutgoingMessage {
        OutgoingMessage {
            temp_id,
            body: self.body.clone(),
            conversation_id: self.conversation_id.clone(),
            reply_to_id: self.reply_to_id.clone(),
            attachment: self.attachment.clone(),
            gif: self.gif.clone(),
            voice_message: self.voice_message.clone(),
        }
    }
}
