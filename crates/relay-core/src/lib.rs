//! # relay-core
//!
//! Domain layer containing entities, value objects, the remote API port, and
//! the error taxonomy. This crate has zero dependencies on infrastructure
//! (HTTP client, async runtime internals, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Attachment, Author, Bookmark, Conversation, ConversationOutcome, Gif, LinkPreview, Message,
    Participant, PinState, Reaction, ReactionGroup, ReadReceipt, VoiceMessage,
};
pub use error::{ApiError, ApiResult};
pub use traits::{
    ChatApi, CreateConversation, MessagePage, OutgoingMessage, PostedMessage, ReactionToggle,
};
pub use value_objects::{BookmarkId, ConversationId, MessageId, TempId, UserId};
