//! Domain data types

pub mod calendar;
pub mod channel;
pub mod event;

pub use calendar::{CalendarListEntry, CalendarListRecord, GoogleCalendarData, SyncMeta};
pub use channel::{ChannelIdentity, ChannelState, NotificationParams, ResourceState};
pub use event::{EventRecord, GcalEvent, GcalEventTime};
