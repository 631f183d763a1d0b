//! Application configuration structs
//!
//! Loads configuration from environment variables. The messaging core itself
//! carries no ambient state: everything configurable (endpoints, poll
//! cadences, the viewer identity and display preferences) is loaded here and
//! injected explicitly.

use serde::Deserialize;
use std::env;

use relay_core::UserId;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub sync: SyncConfig,
    pub viewer: ViewerConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Opaque bearer credential supplied by the auth collaborator
    pub bearer_token: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Polling cadences
///
/// Message polling runs only while a conversation (or the shoutbox) is open;
/// the mention-count poll is always active and runs on its own timer so a
/// slow mentions fetch never delays message polling.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_message_poll_interval_ms")]
    pub message_poll_interval_ms: u64,
    #[serde(default = "default_mention_poll_interval_ms")]
    pub mention_poll_interval_ms: u64,
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

impl SyncConfig {
    /// Message poll interval as a Duration
    pub fn message_poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.message_poll_interval_ms)
    }

    /// Mention poll interval as a Duration
    pub fn mention_poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.mention_poll_interval_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            message_poll_interval_ms: default_message_poll_interval_ms(),
            mention_poll_interval_ms: default_mention_poll_interval_ms(),
            page_limit: default_page_limit(),
        }
    }
}

/// Identity and display preferences of the local viewer
#[derive(Debug, Clone, Deserialize)]
pub struct ViewerConfig {
    pub user_id: UserId,
    pub display_name: String,
    /// Read-receipt privacy flag; the gate is bidirectional
    #[serde(default = "default_show_read_receipts")]
    pub show_read_receipts: bool,
}

// Default value functions
fn default_request_timeout_secs() -> u64 {
    10
}

fn default_message_poll_interval_ms() -> u64 {
    5_000
}

fn default_mention_poll_interval_ms() -> u64 {
    30_000
}

fn default_page_limit() -> u32 {
    50
}

fn default_show_read_receipts() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            api: ApiConfig {
                base_url: env::var("RELAY_API_BASE_URL")
                    .map_err(|_| ConfigError::MissingVar("RELAY_API_BASE_URL"))?,
                bearer_token: env::var("RELAY_API_TOKEN")
                    .map_err(|_| ConfigError::MissingVar("RELAY_API_TOKEN"))?,
                request_timeout_secs: env::var("RELAY_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_request_timeout_secs),
            },
            sync: SyncConfig {
                message_poll_interval_ms: env::var("RELAY_MESSAGE_POLL_INTERVAL_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_message_poll_interval_ms),
                mention_poll_interval_ms: env::var("RELAY_MENTION_POLL_INTERVAL_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_mention_poll_interval_ms),
                page_limit: env::var("RELAY_PAGE_LIMIT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_page_limit),
            },
            viewer: ViewerConfig {
                user_id: env::var("RELAY_USER_ID")
                    .map(UserId::new)
                    .map_err(|_| ConfigError::MissingVar("RELAY_USER_ID"))?,
                display_name: env::var("RELAY_DISPLAY_NAME").unwrap_or_default(),
                show_read_receipts: env::var("RELAY_SHOW_READ_RECEIPTS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_show_read_receipts),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
