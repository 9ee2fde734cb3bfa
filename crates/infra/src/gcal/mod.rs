//! Google Calendar integration
//!
//! Implements the `CalendarProvider` port over the Calendar v3 REST API:
//! watch registration, channel teardown and incremental event listing.

pub mod client;
pub mod token;

pub use client::GoogleCalendarClient;
pub use token::{AccessTokenSource, StaticTokenSource};
