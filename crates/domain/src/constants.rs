//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! sync flow.

/// Lead time before a channel's expiration at which it is proactively
/// renewed. Renewing well ahead of actual expiry absorbs clock skew and
/// processing delay between the provider and this service.
pub const CHANNEL_RENEWAL_LEAD_MS: i64 = 30 * 60 * 1000;

/// Prefix for channel ids minted during a renewal. The provider rejects
/// re-registration under a previously used channel id, so every renewal
/// gets a fresh globally-unique id under this prefix.
pub const RENEWED_CHANNEL_PREFIX: &str = "pri-rfrshd";

/// Calendar id of a user's primary calendar. Sync is scoped to the primary
/// calendar only.
pub const PRIMARY_CALENDAR_ID: &str = "primary";

/// Provider event status marking an event as deleted upstream.
pub const EVENT_STATUS_CANCELLED: &str = "cancelled";

// Webhook notification headers (Google push notifications)
pub const HEADER_CHANNEL_ID: &str = "x-goog-channel-id";
pub const HEADER_RESOURCE_ID: &str = "x-goog-resource-id";
pub const HEADER_RESOURCE_STATE: &str = "x-goog-resource-state";
pub const HEADER_CHANNEL_EXPIRATION: &str = "x-goog-channel-expiration";
