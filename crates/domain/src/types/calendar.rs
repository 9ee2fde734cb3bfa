//! Calendar list records and per-calendar sync metadata

use serde::{Deserialize, Serialize};

use crate::types::channel::ChannelState;

/// Per-calendar sync metadata (`google.items.$.sync`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncMeta {
    /// Id of the currently active push-notification channel, if any.
    pub channel_id: Option<String>,
    /// Provider-assigned id of the watched resource; maps inbound webhook
    /// notifications back to this calendar.
    pub resource_id: Option<String>,
    /// Opaque cursor for the calendar's change stream ("last position
    /// consumed").
    pub next_sync_token: Option<String>,
    /// Channel expiration as epoch milliseconds, kept as a string to match
    /// the provider wire format.
    pub expiration: Option<String>,
}

impl SyncMeta {
    /// Expiration parsed to epoch milliseconds; `None` when absent or
    /// malformed.
    pub fn expiration_ms(&self) -> Option<i64> {
        self.expiration.as_deref().and_then(|v| v.parse().ok())
    }

    /// Explicit channel lifecycle state derived from the stored fields.
    pub fn state(&self) -> ChannelState {
        match (&self.channel_id, &self.resource_id) {
            (Some(channel_id), Some(resource_id)) => ChannelState::Active {
                channel_id: channel_id.clone(),
                resource_id: resource_id.clone(),
                expires_at_ms: self.expiration_ms(),
            },
            (Some(channel_id), None) => ChannelState::Renewing { channel_id: channel_id.clone() },
            _ => ChannelState::NoChannel,
        }
    }
}

/// One entry in a user's calendar list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListEntry {
    /// Provider calendar id (`"primary"` for the main calendar).
    pub id: String,
    /// Marks the user's main calendar. Sync is scoped to the primary
    /// calendar only.
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub sync: SyncMeta,
}

/// Provider-scoped calendar data embedded in a calendar-list record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleCalendarData {
    pub items: Vec<CalendarListEntry>,
}

/// One calendar-list record per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListRecord {
    /// Opaque user identifier, unique per record.
    pub user: String,
    pub google: GoogleCalendarData,
    /// Last mutation time, epoch milliseconds.
    #[serde(default)]
    pub updated_at: i64,
}

impl CalendarListRecord {
    /// The user's primary calendar entry, if present.
    pub fn primary_calendar(&self) -> Option<&CalendarListEntry> {
        self.google.items.iter().find(|item| item.primary)
    }

    /// Mutable access to the primary calendar entry.
    pub fn primary_calendar_mut(&mut self) -> Option<&mut CalendarListEntry> {
        self.google.items.iter_mut().find(|item| item.primary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(channel: Option<&str>, resource: Option<&str>, expiration: Option<&str>) -> SyncMeta {
        SyncMeta {
            channel_id: channel.map(str::to_string),
            resource_id: resource.map(str::to_string),
            next_sync_token: None,
            expiration: expiration.map(str::to_string),
        }
    }

    #[test]
    fn derives_channel_state_from_fields() {
        assert_eq!(meta(None, None, None).state(), ChannelState::NoChannel);
        assert_eq!(
            meta(Some("ch1"), None, None).state(),
            ChannelState::Renewing { channel_id: "ch1".into() }
        );
        assert_eq!(
            meta(Some("ch1"), Some("res1"), Some("1700000000000")).state(),
            ChannelState::Active {
                channel_id: "ch1".into(),
                resource_id: "res1".into(),
                expires_at_ms: Some(1_700_000_000_000),
            }
        );
    }

    #[test]
    fn malformed_expiration_parses_to_none() {
        assert_eq!(meta(None, None, Some("soon")).expiration_ms(), None);
        assert_eq!(meta(None, None, Some("1234")).expiration_ms(), Some(1234));
    }
}
