//! String-backed identifiers
//!
//! Server-assigned ids are opaque strings; the client never inspects their
//! structure. Ordering is plain string comparison, which the store relies on
//! for deterministic tie-breaking.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new id from a raw string
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the inner string
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string
            #[inline]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id! {
    /// Server-assigned message identifier
    MessageId
}

string_id! {
    /// User identifier
    UserId
}

string_id! {
    /// Direct-message conversation identifier
    ConversationId
}

string_id! {
    /// Bookmark record identifier
    BookmarkId
}

/// Client-generated temporary id carried by an optimistic message until the
/// server echo replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TempId(Uuid);

impl TempId {
    /// Generate a fresh temporary id
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Provisional message id shown while the entry is pending
    pub fn as_message_id(&self) -> MessageId {
        MessageId::new(format!("temp-{}", self.0))
    }
}

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "temp-{}", self.0)
    }
}
