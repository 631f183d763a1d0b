//! Sync layer error type
//!
//! Unifies remote API failures and local store/validation failures for the
//! write paths and the conversation manager.

use thiserror::Error;

use relay_core::ApiError;
use relay_store::StoreError;

/// Errors from sync-layer operations
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SyncError {
    /// Check if the failure is transient (retried on the next poll tick)
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_transient())
    }

    /// Check if the failure was rejected locally before any network call
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_validation())
    }

    /// Check if the referenced resource no longer exists
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Api(e) => e.is_not_found(),
            Self::Store(e) => matches!(e, StoreError::MessageNotFound(_)),
        }
    }
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
