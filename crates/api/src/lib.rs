//! HTTP surface and composition root for the calendar sync bridge.
//!
//! The binary wires the Google Calendar client and the document-store
//! adapters into the sync service, then exposes it over a thin Axum router:
//! the webhook endpoint the provider calls, watch start/stop endpoints for
//! user-initiated lifecycle changes, and a health probe.

pub mod context;
pub mod routes;

pub use context::AppContext;
pub use routes::router;
