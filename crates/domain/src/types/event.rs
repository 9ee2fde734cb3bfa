//! Provider events and the internal event representation

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::constants::EVENT_STATUS_CANCELLED;
use crate::errors::{CalbridgeError, Result};

/// Raw event as returned by the Google Calendar API delta listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GcalEvent {
    pub id: String,
    pub status: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: Option<GcalEventTime>,
    pub end: Option<GcalEventTime>,
}

/// Start/end of a provider event: either an all-day date or an RFC 3339
/// date-time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GcalEventTime {
    /// All-day events (`YYYY-MM-DD`).
    pub date: Option<String>,
    /// Timed events (RFC 3339).
    pub date_time: Option<String>,
}

impl GcalEvent {
    /// Whether the provider reports this event as deleted upstream.
    pub fn is_cancelled(&self) -> bool {
        self.status.as_deref() == Some(EVENT_STATUS_CANCELLED)
    }
}

/// Internal event record, one per synced calendar event per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// The provider's event identifier; unique within a user's events.
    pub g_event_id: String,
    /// Owning user identifier.
    pub user: String,
    pub title: String,
    pub description: Option<String>,
    /// Unix timestamp (seconds).
    pub start_ts: i64,
    /// Unix timestamp (seconds).
    pub end_ts: i64,
    pub is_all_day: bool,
    /// Where this record came from; always `"googleimport"` in this flow.
    pub origin: String,
}

impl EventRecord {
    /// Map a provider event into the internal shape.
    ///
    /// # Errors
    /// Returns `InvalidInput` when the event is missing start/end times or
    /// carries timestamps that do not parse.
    pub fn from_provider(user: &str, event: &GcalEvent) -> Result<Self> {
        let start = event.start.as_ref().ok_or_else(|| {
            CalbridgeError::InvalidInput(format!("event {} missing start time", event.id))
        })?;
        let end = event.end.as_ref().ok_or_else(|| {
            CalbridgeError::InvalidInput(format!("event {} missing end time", event.id))
        })?;

        let is_all_day = start.date.is_some();
        let start_ts = parse_event_time(start, &event.id, "start")?;
        let end_ts = parse_event_time(end, &event.id, "end")?;

        let title = event
            .summary
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("Untitled Event")
            .to_string();

        Ok(Self {
            g_event_id: event.id.clone(),
            user: user.to_string(),
            title,
            description: event.description.clone(),
            start_ts,
            end_ts,
            is_all_day,
            origin: "googleimport".to_string(),
        })
    }
}

fn parse_event_time(time: &GcalEventTime, event_id: &str, field: &str) -> Result<i64> {
    if let Some(date) = time.date.as_deref() {
        return parse_all_day_timestamp(date, event_id, field);
    }
    if let Some(date_time) = time.date_time.as_deref() {
        return parse_timed_timestamp(date_time, event_id, field);
    }
    Err(CalbridgeError::InvalidInput(format!("event {event_id} has an empty {field} time")))
}

fn parse_all_day_timestamp(value: &str, event_id: &str, field: &str) -> Result<i64> {
    let date = chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        CalbridgeError::InvalidInput(format!(
            "event {event_id}: invalid all-day {field} date '{value}': {e}"
        ))
    })?;

    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
        CalbridgeError::InvalidInput(format!(
            "event {event_id}: could not derive midnight for {field} date '{value}'"
        ))
    })?;

    Ok(midnight.and_utc().timestamp())
}

fn parse_timed_timestamp(value: &str, event_id: &str, field: &str) -> Result<i64> {
    chrono::DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc).timestamp())
        .map_err(|e| {
            CalbridgeError::InvalidInput(format!(
                "event {event_id}: invalid {field} timestamp '{value}': {e}"
            ))
        })
}
