//! Ports - contracts the infrastructure layer implements

mod api;

pub use api::{
    ChatApi, CreateConversation, MessagePage, OutgoingMessage, PostedMessage, ReactionToggle,
};
