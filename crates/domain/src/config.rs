//! Configuration structures
//!
//! Plain data; loading from the environment or files lives in the
//! infrastructure layer.

use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub watch: WatchConfig,
    pub google: GoogleConfig,
}

/// HTTP server binding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8080 }
    }
}

/// Notification-channel watch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Public callback URL registered with the provider for push
    /// notifications. Must be reachable from the provider's network.
    pub callback_url: String,
    /// Requested watch lifetime in minutes. The provider caps this; the
    /// renewal policy keeps channels alive regardless of the value chosen.
    pub expiration_minutes: i64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            callback_url: "https://localhost/api/sync/gcal/notifications".to_string(),
            expiration_minutes: 7 * 24 * 60,
        }
    }
}

/// Google Calendar API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// Base URL of the Calendar API; overridable for tests.
    pub api_base: String,
    /// Static bearer token for single-tenant deployments. Token acquisition
    /// and refresh are handled outside this service.
    pub access_token: Option<String>,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_base: "https://www.googleapis.com/calendar/v3".to_string(),
            access_token: None,
        }
    }
}
