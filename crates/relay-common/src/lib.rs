//! # relay-common
//!
//! Shared utilities: environment-driven configuration and tracing setup.

pub mod config;
pub mod telemetry;

pub use config::{ApiConfig, AppConfig, ConfigError, SyncConfig, ViewerConfig};
pub use telemetry::{init_tracing, try_init_tracing, TracingConfig};
