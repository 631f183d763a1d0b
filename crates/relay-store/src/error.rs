//! Store layer error types

use thiserror::Error;

use relay_core::MessageId;

/// Maximum accepted message body length in characters
pub const MAX_BODY_LEN: usize = 500;

/// Errors from the local store and its validation rules
///
/// Validation failures are raised before any network call and never mutate
/// state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Message body is empty")]
    EmptyBody,

    #[error("Message body too long: max {max} characters")]
    BodyTooLong { max: usize },

    #[error("Group conversations require a name")]
    MissingGroupName,

    #[error("A conversation requires at least two distinct participants")]
    NotEnoughParticipants,

    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl StoreError {
    /// Check if this is a validation error (rejected before any network call)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyBody
                | Self::BodyTooLong { .. }
                | Self::MissingGroupName
                | Self::NotEnoughParticipants
                | Self::Validation(_)
        )
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
