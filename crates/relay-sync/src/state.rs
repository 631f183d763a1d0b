//! Shared client state
//!
//! One lock guards the log and every engine derived from it, so a delta
//! lands atomically: a reader never observes the store updated but the
//! reaction ledger still holding the previous snapshot.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use relay_core::{Message, MessageId, UserId};
use relay_store::{
    MentionContext, MentionCounter, MessageStore, PinBookmarkManager, ReactionLedger,
    ReadReceiptTracker, VisibilityGate,
};

/// The full client-side chat state for one viewer
#[derive(Debug)]
pub struct ChatState {
    pub store: MessageStore,
    pub reactions: ReactionLedger,
    pub receipts: ReadReceiptTracker,
    pub pins: PinBookmarkManager,
    pub mentions: MentionCounter,
    pub visibility: VisibilityGate,
}

impl ChatState {
    /// Create empty state for the given viewer
    pub fn new(viewer: UserId) -> Self {
        Self {
            store: MessageStore::new(),
            reactions: ReactionLedger::new(),
            receipts: ReadReceiptTracker::new(),
            pins: PinBookmarkManager::new(),
            mentions: MentionCounter::new(viewer),
            visibility: VisibilityGate::new(),
        }
    }

    /// Merge a fetched batch into the log and refresh every derived engine
    /// from the per-message server snapshots
    pub fn apply_delta(&mut self, messages: Vec<Message>) {
        for message in &messages {
            self.reactions.ingest(message);
            self.pins.set_pin_state(&message.id, message.pinned.clone());
            self.mentions.observe(message);
        }
        let count = messages.len();
        self.store.apply_delta(messages);
        debug!(count, total = self.store.len(), "delta applied");
    }

    /// Hard-remove a message and its reactions
    ///
    /// Pins and bookmarks referencing the id stay as dangling records;
    /// consumers null-check them against the store.
    pub fn remove_message(&mut self, id: &MessageId) -> bool {
        let removed = self.store.remove(id);
        if removed {
            self.reactions.remove_message(id);
        }
        removed
    }

    /// The viewer opened a context; zero its mention badge
    pub fn open_context(&mut self, context: &MentionContext) {
        self.mentions.reset(context);
    }
}

/// Shared handle over [`ChatState`]
///
/// The lock is only ever held for in-memory merges and lookups; it is never
/// held across an await point.
pub type SharedState = Arc<Mutex<ChatState>>;

/// Create a fresh shared state for the given viewer
pub fn shared_state(viewer: UserId) -> SharedState {
    Arc::new(Mutex::new(ChatState::new(viewer)))
}
