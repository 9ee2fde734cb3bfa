//! In-memory implementations of the calendar-list and event repositories.

use std::collections::HashMap;

use async_trait::async_trait;
use calbridge_core::{
    BulkWriteSummary, CalendarListRepository, EventRepository, EventWriteOp,
};
use calbridge_domain::{
    CalbridgeError, CalendarListRecord, ChannelIdentity, EventRecord, Result,
};
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

/// In-memory calendar-list collection, keyed by user.
#[derive(Default)]
pub struct InMemoryCalendarListRepository {
    records: RwLock<HashMap<String, CalendarListRecord>>,
}

impl InMemoryCalendarListRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record. Used when a user connects their calendar
    /// and by tests.
    pub fn insert(&self, record: CalendarListRecord) {
        self.records.write().insert(record.user.clone(), record);
    }
}

#[async_trait]
impl CalendarListRepository for InMemoryCalendarListRepository {
    async fn find_by_user(&self, user: &str) -> Result<Option<CalendarListRecord>> {
        Ok(self.records.read().get(user).cloned())
    }

    async fn find_by_resource_id(
        &self,
        resource_id: &str,
    ) -> Result<Option<CalendarListRecord>> {
        let records = self.records.read();
        Ok(records
            .values()
            .find(|record| {
                record
                    .google
                    .items
                    .iter()
                    .any(|item| item.sync.resource_id.as_deref() == Some(resource_id))
            })
            .cloned())
    }

    async fn update_next_sync_token(&self, user: &str, next_sync_token: &str) -> Result<()> {
        let mut records = self.records.write();
        let record = records
            .get_mut(user)
            .ok_or_else(|| CalbridgeError::NotFound(format!("no calendar list for user {user}")))?;

        let entry = record.primary_calendar_mut().ok_or_else(|| {
            CalbridgeError::Persistence(format!("user {user} has no primary calendar"))
        })?;

        entry.sync.next_sync_token = Some(next_sync_token.to_string());
        record.updated_at = Utc::now().timestamp_millis();
        debug!(user, "updated next sync token");
        Ok(())
    }

    async fn clear_next_sync_token(&self, user: &str) -> Result<()> {
        let mut records = self.records.write();
        let record = records
            .get_mut(user)
            .ok_or_else(|| CalbridgeError::NotFound(format!("no calendar list for user {user}")))?;

        if let Some(entry) = record.primary_calendar_mut() {
            entry.sync.next_sync_token = None;
        }
        record.updated_at = Utc::now().timestamp_millis();
        debug!(user, "cleared next sync token");
        Ok(())
    }

    async fn bind_resource_id(&self, channel_id: &str, resource_id: &str) -> Result<()> {
        let mut records = self.records.write();
        for record in records.values_mut() {
            if let Some(entry) = record
                .google
                .items
                .iter_mut()
                .find(|item| item.sync.channel_id.as_deref() == Some(channel_id))
            {
                entry.sync.resource_id = Some(resource_id.to_string());
                record.updated_at = Utc::now().timestamp_millis();
                debug!(channel_id, resource_id, "bound resource id");
                return Ok(());
            }
        }

        Err(CalbridgeError::NotFound(format!("no calendar entry holds channel {channel_id}")))
    }

    async fn replace_sync_data(
        &self,
        user: &str,
        expected_channel_id: Option<&str>,
        identity: &ChannelIdentity,
    ) -> Result<Option<CalendarListRecord>> {
        let mut records = self.records.write();
        let record = records
            .get_mut(user)
            .ok_or_else(|| CalbridgeError::NotFound(format!("no calendar list for user {user}")))?;

        let entry = record.primary_calendar_mut().ok_or_else(|| {
            CalbridgeError::Persistence(format!("user {user} has no primary calendar"))
        })?;

        if let Some(expected) = expected_channel_id {
            if entry.sync.channel_id.as_deref() != Some(expected) {
                debug!(user, expected, "sync data replace skipped, channel changed underneath");
                return Ok(None);
            }
        }

        entry.sync.channel_id = Some(identity.channel_id.clone());
        entry.sync.resource_id = Some(identity.resource_id.clone());
        entry.sync.expiration = Some(identity.expiration.clone());
        record.updated_at = Utc::now().timestamp_millis();
        Ok(Some(record.clone()))
    }
}

/// In-memory event collection, keyed by `(user, gEventId)`.
#[derive(Default)]
pub struct InMemoryEventRepository {
    events: RwLock<HashMap<(String, String), EventRecord>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up one event. Test/introspection helper.
    pub fn get(&self, user: &str, g_event_id: &str) -> Option<EventRecord> {
        self.events.read().get(&(user.to_string(), g_event_id.to_string())).cloned()
    }

    /// Number of stored events for a user.
    pub fn count_for(&self, user: &str) -> usize {
        self.events.read().keys().filter(|(u, _)| u == user).count()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn bulk_write(&self, ops: Vec<EventWriteOp>) -> Result<BulkWriteSummary> {
        let mut events = self.events.write();
        let mut summary = BulkWriteSummary::default();

        for op in ops {
            match op {
                EventWriteOp::DeleteMany { user, g_event_ids } => {
                    for id in g_event_ids {
                        if events.remove(&(user.clone(), id)).is_some() {
                            summary.deleted += 1;
                        }
                    }
                }
                EventWriteOp::UpsertOne { user, g_event_id, event } => {
                    match events.insert((user, g_event_id), event) {
                        Some(_) => summary.modified += 1,
                        None => summary.upserted += 1,
                    }
                }
            }
        }

        debug!(
            deleted = summary.deleted,
            upserted = summary.upserted,
            modified = summary.modified,
            "applied bulk write"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use calbridge_domain::{
        CalendarListEntry, GcalEvent, GcalEventTime, GoogleCalendarData, SyncMeta,
    };

    use super::*;

    fn record(user: &str, channel_id: &str, resource_id: &str) -> CalendarListRecord {
        CalendarListRecord {
            user: user.to_string(),
            google: GoogleCalendarData {
                items: vec![CalendarListEntry {
                    id: "primary".to_string(),
                    primary: true,
                    sync: SyncMeta {
                        channel_id: Some(channel_id.to_string()),
                        resource_id: Some(resource_id.to_string()),
                        next_sync_token: Some("tok-1".to_string()),
                        expiration: Some("1700000000000".to_string()),
                    },
                }],
            },
            updated_at: 0,
        }
    }

    fn identity(channel_id: &str) -> ChannelIdentity {
        ChannelIdentity {
            channel_id: channel_id.to_string(),
            resource_id: "res-new".to_string(),
            expiration: "1700009999000".to_string(),
        }
    }

    fn upsert(user: &str, id: &str, title: &str) -> EventWriteOp {
        let event = GcalEvent {
            id: id.to_string(),
            summary: Some(title.to_string()),
            start: Some(GcalEventTime {
                date_time: Some("2024-05-01T09:00:00Z".into()),
                ..GcalEventTime::default()
            }),
            end: Some(GcalEventTime {
                date_time: Some("2024-05-01T10:00:00Z".into()),
                ..GcalEventTime::default()
            }),
            ..GcalEvent::default()
        };
        EventWriteOp::UpsertOne {
            user: user.to_string(),
            g_event_id: id.to_string(),
            event: EventRecord::from_provider(user, &event).unwrap(),
        }
    }

    #[tokio::test]
    async fn replace_sync_data_cas_rejects_stale_expectation() {
        let repo = InMemoryCalendarListRepository::new();
        repo.insert(record("u1", "ch1", "res1"));

        // first renewal wins
        let updated = repo.replace_sync_data("u1", Some("ch1"), &identity("ch2")).await.unwrap();
        assert!(updated.is_some());

        // second renewal still expects ch1 and must lose
        let skipped = repo.replace_sync_data("u1", Some("ch1"), &identity("ch3")).await.unwrap();
        assert!(skipped.is_none());

        let current = repo.find_by_user("u1").await.unwrap().unwrap();
        let sync = &current.primary_calendar().unwrap().sync;
        assert_eq!(sync.channel_id.as_deref(), Some("ch2"));
        assert_eq!(sync.resource_id.as_deref(), Some("res-new"));
    }

    #[tokio::test]
    async fn unconditional_replace_applies() {
        let repo = InMemoryCalendarListRepository::new();
        repo.insert(record("u1", "ch1", "res1"));

        let updated = repo.replace_sync_data("u1", None, &identity("ch9")).await.unwrap();
        assert!(updated.is_some());
    }

    #[tokio::test]
    async fn bind_resource_id_targets_the_matching_channel() {
        let repo = InMemoryCalendarListRepository::new();
        repo.insert(record("u1", "ch1", "res1"));

        repo.bind_resource_id("ch1", "res-bound").await.unwrap();
        let current = repo.find_by_user("u1").await.unwrap().unwrap();
        assert_eq!(
            current.primary_calendar().unwrap().sync.resource_id.as_deref(),
            Some("res-bound")
        );

        let err = repo.bind_resource_id("ch-missing", "res").await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn upsert_applied_twice_keeps_one_record_with_latest_fields() {
        let repo = InMemoryEventRepository::new();

        let first = repo.bulk_write(vec![upsert("u1", "ev1", "old title")]).await.unwrap();
        assert_eq!(first.upserted, 1);

        let second = repo.bulk_write(vec![upsert("u1", "ev1", "new title")]).await.unwrap();
        assert_eq!(second.upserted, 0);
        assert_eq!(second.modified, 1);

        assert_eq!(repo.count_for("u1"), 1);
        assert_eq!(repo.get("u1", "ev1").unwrap().title, "new title");
    }

    #[tokio::test]
    async fn delete_many_removes_only_listed_events_for_the_user() {
        let repo = InMemoryEventRepository::new();
        repo.bulk_write(vec![
            upsert("u1", "ev1", "a"),
            upsert("u1", "ev2", "b"),
            upsert("u2", "ev1", "c"),
        ])
        .await
        .unwrap();

        let summary = repo
            .bulk_write(vec![EventWriteOp::DeleteMany {
                user: "u1".to_string(),
                g_event_ids: vec!["ev1".to_string(), "ev-missing".to_string()],
            }])
            .await
            .unwrap();

        assert_eq!(summary.deleted, 1);
        assert_eq!(repo.count_for("u1"), 1);
        assert_eq!(repo.count_for("u2"), 1);
    }
}
