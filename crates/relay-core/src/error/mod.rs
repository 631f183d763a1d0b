//! Error types

mod api_error;

pub use api_error::{ApiError, ApiResult};
