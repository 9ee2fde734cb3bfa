//! Document-store adapters
//!
//! The production document store is an external collaborator; these adapters
//! implement its collection contracts (find-one-and-update with
//! array-element updates, mixed bulk writes) for default wiring and tests.

pub mod memory;

pub use memory::{InMemoryCalendarListRepository, InMemoryEventRepository};
