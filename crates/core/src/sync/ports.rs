//! Port interfaces for the calendar sync flow
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use calbridge_domain::{CalendarListRecord, ChannelIdentity, GcalEvent, Result};
use serde::{Deserialize, Serialize};

use super::operations::EventWriteOp;

/// Acknowledgement returned by the provider when a watch is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchAck {
    pub channel_id: String,
    pub resource_id: String,
    /// Epoch milliseconds as a string, provider wire format.
    pub expiration: String,
}

impl WatchAck {
    /// The channel identity triple carried by this acknowledgement.
    pub fn identity(&self) -> ChannelIdentity {
        ChannelIdentity {
            channel_id: self.channel_id.clone(),
            resource_id: self.resource_id.clone(),
            expiration: self.expiration.clone(),
        }
    }
}

/// Result of a successful channel teardown (provider 204).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopAck {
    pub channel_id: String,
    pub resource_id: String,
}

/// One page of an incremental events listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDelta {
    pub items: Vec<GcalEvent>,
    pub next_page_token: Option<String>,
    pub next_sync_token: Option<String>,
}

/// Authenticated calendar-API handle.
///
/// Credential acquisition is the adapter's concern; callers identify the
/// user and the adapter resolves the token.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Register a webhook subscription for the given calendar.
    async fn watch_events(
        &self,
        user: &str,
        calendar_id: &str,
        channel_id: &str,
        callback_url: &str,
        expiration_ms: i64,
    ) -> Result<WatchAck>;

    /// Tear down a notification channel.
    async fn stop_channel(
        &self,
        user: &str,
        channel_id: &str,
        resource_id: &str,
    ) -> Result<StopAck>;

    /// Fetch one page of changes since `sync_token`.
    async fn list_events_delta(
        &self,
        user: &str,
        calendar_id: &str,
        sync_token: &str,
        page_token: Option<&str>,
    ) -> Result<EventDelta>;
}

/// Persistence port for calendar-list records.
#[async_trait]
pub trait CalendarListRepository: Send + Sync {
    async fn find_by_user(&self, user: &str) -> Result<Option<CalendarListRecord>>;

    /// Resolve which user's record an inbound notification belongs to.
    async fn find_by_resource_id(&self, resource_id: &str)
        -> Result<Option<CalendarListRecord>>;

    /// Update the primary calendar's `nextSyncToken` for the given user.
    /// Always targets the primary calendar; multi-calendar sync is out of
    /// scope.
    async fn update_next_sync_token(&self, user: &str, next_sync_token: &str) -> Result<()>;

    /// Clear the primary calendar's `nextSyncToken` (invalid-token
    /// recovery).
    async fn clear_next_sync_token(&self, user: &str) -> Result<()>;

    /// Bind the provider-assigned resource id to whichever calendar entry
    /// holds `channel_id`. Used for the initial handshake notification.
    async fn bind_resource_id(&self, channel_id: &str, resource_id: &str) -> Result<()>;

    /// Atomically replace the primary calendar's channel triple.
    ///
    /// When `expected_channel_id` is given the write only applies if the
    /// stored channel id still matches (compare-and-swap); returns the
    /// updated record, or `None` when the expectation failed.
    async fn replace_sync_data(
        &self,
        user: &str,
        expected_channel_id: Option<&str>,
        identity: &ChannelIdentity,
    ) -> Result<Option<CalendarListRecord>>;
}

/// Summary of an applied bulk write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkWriteSummary {
    pub deleted: usize,
    pub upserted: usize,
    pub modified: usize,
}

/// Persistence port for event records.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Submit a mixed batch of delete/upsert operations as one bulk write.
    async fn bulk_write(&self, ops: Vec<EventWriteOp>) -> Result<BulkWriteSummary>;
}

/// Clock seam so expiry decisions are testable.
pub trait Clock: Send + Sync {
    /// Current time as epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// System clock used in production wiring.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
