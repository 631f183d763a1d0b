//! # relay-sync
//!
//! The application layer over `relay-store` and the `ChatApi` port: the
//! polling sync engine, the optimistic write paths, and the conversation
//! roster. Everything async lives here.

pub mod actions;
pub mod conversations;
pub mod engine;
pub mod error;
pub mod state;

pub use actions::MessageActions;
pub use conversations::ConversationManager;
pub use engine::SyncEngine;
pub use error::{SyncError, SyncResult};
pub use state::{shared_state, ChatState, SharedState};
