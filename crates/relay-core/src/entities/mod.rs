//! Domain entities

mod bookmark;
mod conversation;
mod message;
mod reaction;
mod receipt;

pub use bookmark::Bookmark;
pub use conversation::{Conversation, ConversationOutcome, Participant};
pub use message::{
    Attachment, Author, Gif, LinkPreview, Message, PinState, VoiceMessage,
};
pub use reaction::{Reaction, ReactionGroup};
pub use receipt::ReadReceipt;
