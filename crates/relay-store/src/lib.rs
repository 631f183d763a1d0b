//! # relay-store
//!
//! The authoritative client-side message log and every derived-state engine
//! layered on top of it: threads, reactions, mentions, read receipts,
//! pins/bookmarks, and search. Everything here is synchronous and pure;
//! network and timers live in `relay-sync`.

pub mod draft;
pub mod error;
pub mod mentions;
pub mod message_store;
pub mod pins;
pub mod reactions;
pub mod receipts;
pub mod search;
pub mod threads;

pub use draft::MessageDraft;
pub use error::{StoreError, StoreResult, MAX_BODY_LEN};
pub use mentions::{extract_mentions, MentionContext, MentionCounter};
pub use message_store::MessageStore;
pub use pins::PinBookmarkManager;
pub use reactions::{ReactionLedger, Toggled};
pub use receipts::{ReadReceiptTracker, VisibilityGate};
pub use search::{filter, SearchCriteria, SearchHistory, SearchPreset};
pub use threads::{ThreadIndex, ThreadViewState};
