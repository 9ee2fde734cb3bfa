//! Application context
//!
//! Builds the dependency graph once at startup and hands handlers a single
//! cloneable state value.

use std::sync::Arc;

use calbridge_core::{SyncService, SystemClock};
use calbridge_domain::Config;
use calbridge_infra::gcal::{GoogleCalendarClient, StaticTokenSource};
use calbridge_infra::store::{InMemoryCalendarListRepository, InMemoryEventRepository};

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppContext {
    pub sync: Arc<SyncService>,
    pub config: Arc<Config>,
}

impl AppContext {
    /// Wire the default adapters: the Calendar v3 client with a static token
    /// from configuration, and in-memory repositories.
    pub fn new(config: Config) -> Self {
        let token = config.google.access_token.clone().unwrap_or_default();
        let tokens = Arc::new(StaticTokenSource::new(token));
        let provider = Arc::new(GoogleCalendarClient::new(&config.google.api_base, tokens));

        let calendars = Arc::new(InMemoryCalendarListRepository::new());
        let events = Arc::new(InMemoryEventRepository::new());

        let sync = Arc::new(SyncService::new(
            provider,
            calendars,
            events,
            Arc::new(SystemClock),
            config.watch.clone(),
        ));

        Self { sync, config: Arc::new(config) }
    }

    /// Build a context around an existing service. Used by tests to inject
    /// fakes behind the router.
    pub fn with_service(sync: Arc<SyncService>, config: Config) -> Self {
        Self { sync, config: Arc::new(config) }
    }
}
