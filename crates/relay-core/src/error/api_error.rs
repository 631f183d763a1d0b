//! API error taxonomy
//!
//! Errors returned by the remote collaborator API. The core treats server
//! error payloads opaquely; what matters is the class of failure, which
//! decides whether local state may be touched and how the caller recovers.

use thiserror::Error;

/// Errors from the remote chat API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network failure or timeout. Never mutates local state; the caller
    /// retries on the next natural poll tick.
    #[error("Network error: {0}")]
    Transient(String),

    /// The referenced resource no longer exists (e.g. reacting to a deleted
    /// message).
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    /// The resource already exists; the caller redirects to it instead of
    /// failing.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bearer credential rejected
    #[error("Unauthorized")]
    Unauthorized,

    /// Any other structured server error, carried opaquely
    #[error("API error {status}: {code}")]
    Api { status: u16, code: String },
}

impl ApiError {
    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create a transient network error
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    /// Check if the failure is transient (safe to retry on the next tick)
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Result type for remote API operations
pub type ApiResult<T> = Result<T, ApiError>;
