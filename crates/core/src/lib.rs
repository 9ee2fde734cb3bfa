//! # Calbridge Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for the calendar provider and the
//!   document store
//! - Sync helpers: event classification, bulk-op assembly, channel
//!   lifecycle decisions
//! - The `SyncService` orchestrating the webhook lifecycle
//!
//! ## Architecture Principles
//! - Only depends on `calbridge-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod sync;

// Re-export specific items to avoid ambiguity
pub use sync::channels::{
    channel_expires_soon, channel_not_found, channel_refresh_needed, find_calendar_by_resource_id,
};
pub use sync::operations::{assemble_bulk_ops, categorize_events, EventBatch, EventWriteOp};
pub use sync::ports::{
    BulkWriteSummary, CalendarListRepository, CalendarProvider, Clock, EventDelta, EventRepository,
    StopAck, SystemClock, WatchAck,
};
pub use sync::service::{
    ChannelPrep, ChannelRenewal, NotificationOutcome, SyncOutcome, SyncService,
};
