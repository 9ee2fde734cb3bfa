//! # Calbridge Infrastructure
//!
//! Infrastructure implementations of core sync ports.
//!
//! This crate contains:
//! - The reqwest-based Google Calendar API adapter
//! - Document-store adapters for the calendar-list and event collections
//! - Configuration loading
//! - Conversions from external errors into domain errors
//!
//! ## Architecture
//! - Implements traits defined in `calbridge-core`
//! - Depends on `calbridge-domain` and `calbridge-core`
//! - Contains all "impure" code (HTTP, storage, environment)

pub mod config;
pub mod errors;
pub mod gcal;
pub mod store;

// Re-export commonly used items
pub use errors::InfraError;
pub use gcal::{AccessTokenSource, GoogleCalendarClient, StaticTokenSource};
pub use store::{InMemoryCalendarListRepository, InMemoryEventRepository};
