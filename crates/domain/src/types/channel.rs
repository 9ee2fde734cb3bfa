//! Notification-channel identity and lifecycle state

use serde::{Deserialize, Serialize};

/// The `(channelId, resourceId, expiration)` triple assigned by the provider
/// on registration and echoed back on every webhook call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelIdentity {
    pub channel_id: String,
    pub resource_id: String,
    /// Epoch milliseconds, kept as a string to match the provider wire
    /// format.
    pub expiration: String,
}

/// Explicit channel lifecycle state, derived from the persisted sync fields.
///
/// Transitions are checked against this value instead of being re-derived
/// ad-hoc from raw fields on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelState {
    /// No watch registered for this calendar.
    NoChannel,
    /// A watch was registered but the handshake notification has not bound
    /// its resource id yet.
    Renewing { channel_id: String },
    /// A fully established watch.
    Active { channel_id: String, resource_id: String, expires_at_ms: Option<i64> },
}

/// Resource state reported by the provider on each webhook notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Handshake notification sent right after registering a watch.
    Sync,
    /// A real change occurred upstream.
    Exists,
    /// Anything else the provider may send; handled as a no-op.
    Other(String),
}

impl ResourceState {
    /// Parse the `x-goog-resource-state` header value.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "sync" => Self::Sync,
            "exists" => Self::Exists,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Parsed webhook notification parameters (the `x-goog-*` headers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationParams {
    pub channel_id: String,
    pub resource_id: String,
    pub resource_state: ResourceState,
    /// Epoch milliseconds as a string, as delivered by the provider.
    pub expiration: String,
}
