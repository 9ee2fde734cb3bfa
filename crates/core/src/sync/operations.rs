//! Event classification and bulk-write assembly
//!
//! Pure helpers: no I/O, no clock.

use calbridge_domain::{EventRecord, GcalEvent, Result};

/// Partition of a delta fetch into deletions and upserts.
#[derive(Debug, Clone, Default)]
pub struct EventBatch {
    /// Ids of events the provider reports as cancelled.
    pub to_delete: Vec<String>,
    /// Everything else; assumed upsertable.
    pub to_upsert: Vec<GcalEvent>,
}

impl EventBatch {
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_upsert.is_empty()
    }
}

/// One operation in a bulk write against the event collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventWriteOp {
    /// `deleteMany` matching `{ user, gEventId: { $in: g_event_ids } }`.
    DeleteMany { user: String, g_event_ids: Vec<String> },
    /// `updateOne` with upsert, keyed by `{ gEventId, user }`.
    UpsertOne { user: String, g_event_id: String, event: EventRecord },
}

/// Partition provider events into deletions and upserts.
///
/// Any event not explicitly cancelled is treated as an upsert; there is no
/// separate "unchanged" category, so callers never special-case partial
/// updates. Empty input yields an empty batch.
pub fn categorize_events(events: &[GcalEvent]) -> EventBatch {
    let mut batch = EventBatch::default();
    for event in events {
        if event.is_cancelled() {
            batch.to_delete.push(event.id.clone());
        } else {
            batch.to_upsert.push(event.clone());
        }
    }
    batch
}

/// Build the ordered bulk-write operation list for one user's batch: at most
/// one `DeleteMany` (only when there are deletions) followed by one upsert
/// per remaining event.
///
/// # Errors
/// Returns `InvalidInput` when an upsert event cannot be mapped to the
/// internal shape.
pub fn assemble_bulk_ops(user: &str, batch: &EventBatch) -> Result<Vec<EventWriteOp>> {
    let mut ops = Vec::with_capacity(batch.to_upsert.len() + 1);

    if !batch.to_delete.is_empty() {
        ops.push(EventWriteOp::DeleteMany {
            user: user.to_string(),
            g_event_ids: batch.to_delete.clone(),
        });
    }

    for event in &batch.to_upsert {
        let mapped = EventRecord::from_provider(user, event)?;
        ops.push(EventWriteOp::UpsertOne {
            user: user.to_string(),
            g_event_id: event.id.clone(),
            event: mapped,
        });
    }

    Ok(ops)
}
