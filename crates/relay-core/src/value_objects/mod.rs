//! Value objects - identifiers used throughout the domain

mod ids;

pub use ids::{BookmarkId, ConversationId, MessageId, TempId, UserId};
