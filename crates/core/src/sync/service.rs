//! Sync orchestration service
//!
//! Drives the webhook lifecycle: channel handshake, proactive renewal, and
//! the fetch-classify-persist loop. All collaborators are injected through
//! ports, so the service holds no global state.

use std::sync::Arc;

use calbridge_domain::constants::{PRIMARY_CALENDAR_ID, RENEWED_CHANNEL_PREFIX};
use calbridge_domain::{
    CalbridgeError, NotificationParams, ResourceState, Result, WatchConfig,
};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::channels::{channel_refresh_needed, find_calendar_by_resource_id};
use super::operations::{assemble_bulk_ops, categorize_events};
use super::ports::{
    CalendarListRepository, CalendarProvider, Clock, EventRepository, StopAck, WatchAck,
};

/// Outcome of one webhook notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "kind")]
pub enum NotificationOutcome {
    /// Handshake notification bound the resource id to its channel. No
    /// event fetch occurs on this invocation.
    Handshake { channel_id: String, resource_id: String },
    /// Change notification processed end to end.
    Synced {
        user: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        renewal: Option<ChannelRenewal>,
        sync: SyncOutcome,
    },
    /// Unknown resource state; no action taken.
    Ignored { resource_state: String },
}

/// Result of the delta fetch/persist step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "status")]
pub enum SyncOutcome {
    /// The delta was empty; nothing to persist. Benign, not an error.
    NoChanges,
    /// Events were classified and written.
    Applied {
        deleted: usize,
        upserted: usize,
        modified: usize,
        next_sync_token_updated: bool,
    },
}

/// Structured result of a channel renewal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRenewal {
    /// Whether the old channel acknowledged teardown. A channel that had
    /// already expired on the provider side is tolerated and reported as
    /// `false`.
    pub stopped: bool,
    /// The freshly registered watch.
    pub watch: WatchAck,
    /// Whether the new triple was persisted. `false` means another renewal
    /// won the compare-and-swap first and its data was left in place.
    pub persisted: bool,
}

/// Channel decision made before an event fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelPrep {
    pub user: String,
    pub calendar_id: String,
    /// Sync token stored before this notification was handled.
    pub sync_token: Option<String>,
    pub renewal: Option<ChannelRenewal>,
}

/// Orchestrates the webhook lifecycle against the calendar provider and the
/// document store.
pub struct SyncService {
    provider: Arc<dyn CalendarProvider>,
    calendars: Arc<dyn CalendarListRepository>,
    events: Arc<dyn EventRepository>,
    clock: Arc<dyn Clock>,
    watch: WatchConfig,
}

impl SyncService {
    /// Create a new sync service with injected collaborators.
    pub fn new(
        provider: Arc<dyn CalendarProvider>,
        calendars: Arc<dyn CalendarListRepository>,
        events: Arc<dyn EventRepository>,
        clock: Arc<dyn Clock>,
        watch: WatchConfig,
    ) -> Self {
        Self { provider, calendars, events, clock, watch }
    }

    /// Handle one inbound webhook notification.
    ///
    /// `resourceState == "sync"` is the registration handshake and only
    /// binds the resource id; `"exists"` runs the full renew-fetch-persist
    /// sequence; anything else is acknowledged and ignored.
    #[instrument(
        skip(self, params),
        fields(channel_id = %params.channel_id, resource_id = %params.resource_id)
    )]
    pub async fn handle_notification(
        &self,
        params: NotificationParams,
    ) -> Result<NotificationOutcome> {
        match params.resource_state.clone() {
            ResourceState::Sync => {
                self.calendars.bind_resource_id(&params.channel_id, &params.resource_id).await?;
                info!("handshake complete, resource id bound to channel");
                Ok(NotificationOutcome::Handshake {
                    channel_id: params.channel_id,
                    resource_id: params.resource_id,
                })
            }
            ResourceState::Exists => {
                let prep = self.prepare_sync_channels(&params).await?;
                let sync = self.sync_events(&prep).await?;
                Ok(NotificationOutcome::Synced {
                    user: prep.user,
                    renewal: prep.renewal,
                    sync,
                })
            }
            ResourceState::Other(state) => {
                debug!(resource_state = %state, "ignoring notification with unknown resource state");
                Ok(NotificationOutcome::Ignored { resource_state: state })
            }
        }
    }

    /// Resolve the notification's calendar and renew its channel when the
    /// refresh policy requires it.
    pub async fn prepare_sync_channels(
        &self,
        params: &NotificationParams,
    ) -> Result<ChannelPrep> {
        let record =
            self.calendars.find_by_resource_id(&params.resource_id).await?.ok_or_else(|| {
                CalbridgeError::NotFound(format!(
                    "no calendar list matches resourceId {}",
                    params.resource_id
                ))
            })?;

        let entry = find_calendar_by_resource_id(&params.resource_id, &record)?.ok_or_else(
            || {
                CalbridgeError::NotFound(format!(
                    "calendar entry vanished for resourceId {}",
                    params.resource_id
                ))
            },
        )?;

        let user = record.user.clone();
        let calendar_id = entry.id.clone();
        let sync_token = entry.sync.next_sync_token.clone();
        let observed_channel_id = entry.sync.channel_id.clone();
        debug!(user = %user, state = ?entry.sync.state(), "resolved notification target");

        let renewal = if channel_refresh_needed(params, &record, self.clock.now_ms()) {
            Some(
                self.refresh_channel_watch(&user, params, observed_channel_id.as_deref())
                    .await?,
            )
        } else {
            debug!(user = %user, channel_id = %params.channel_id, "channel still active");
            None
        };

        Ok(ChannelPrep { user, calendar_id, sync_token, renewal })
    }

    /// Fetch the event delta, persist it, then advance the sync token.
    ///
    /// The token is written only after the bulk write lands; a crash in
    /// between re-fetches an overlap that the upsert keys absorb, instead of
    /// silently skipping events.
    async fn sync_events(&self, prep: &ChannelPrep) -> Result<SyncOutcome> {
        let sync_token = prep.sync_token.as_deref().ok_or_else(|| {
            CalbridgeError::NotFound(format!("no sync token stored for user {}", prep.user))
        })?;

        let (items, next_sync_token) =
            match self.fetch_full_delta(&prep.user, &prep.calendar_id, sync_token).await {
                Ok(delta) => delta,
                Err(CalbridgeError::Provider { status: 410, detail }) => {
                    warn!(
                        user = %prep.user,
                        "sync token rejected (410 Gone), clearing stored token"
                    );
                    self.calendars.clear_next_sync_token(&prep.user).await?;
                    return Err(CalbridgeError::Provider { status: 410, detail });
                }
                Err(e) => return Err(e),
            };

        if items.is_empty() {
            // Advance the cursor even on an empty delta so the next fetch
            // does not replay the same window.
            if let Some(token) = next_sync_token.as_deref() {
                self.calendars.update_next_sync_token(&prep.user, token).await?;
            }
            info!(user = %prep.user, "delta fetch returned no events");
            return Ok(SyncOutcome::NoChanges);
        }

        let batch = categorize_events(&items);
        let ops = assemble_bulk_ops(&prep.user, &batch)?;
        let summary = self.events.bulk_write(ops).await.map_err(|e| {
            error!(user = %prep.user, error = %e, "event bulk write failed");
            e
        })?;

        let mut token_updated = false;
        if let Some(token) = next_sync_token.as_deref() {
            self.calendars.update_next_sync_token(&prep.user, token).await.map_err(|e| {
                error!(
                    user = %prep.user,
                    attempted_token = token,
                    error = %e,
                    "failed to persist next sync token"
                );
                e
            })?;
            token_updated = true;
        }

        info!(
            user = %prep.user,
            deleted = summary.deleted,
            upserted = summary.upserted,
            modified = summary.modified,
            "sync applied"
        );

        Ok(SyncOutcome::Applied {
            deleted: summary.deleted,
            upserted: summary.upserted,
            modified: summary.modified,
            next_sync_token_updated: token_updated,
        })
    }

    /// Follow pagination within one notification, accumulating items and
    /// keeping the final page's sync token.
    async fn fetch_full_delta(
        &self,
        user: &str,
        calendar_id: &str,
        sync_token: &str,
    ) -> Result<(Vec<calbridge_domain::GcalEvent>, Option<String>)> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        let mut next_sync_token: Option<String> = None;

        loop {
            let page = self
                .provider
                .list_events_delta(user, calendar_id, sync_token, page_token.as_deref())
                .await?;

            items.extend(page.items);
            next_sync_token = page.next_sync_token.or(next_sync_token);
            page_token = page.next_page_token;

            if page_token.is_none() {
                break;
            }
        }

        Ok((items, next_sync_token))
    }

    /// Replace a stale or unmatched channel: stop the old one, register a
    /// fresh watch under a new unique id, and persist the new triple.
    #[instrument(skip(self, params), fields(old_channel = %params.channel_id))]
    pub async fn refresh_channel_watch(
        &self,
        user: &str,
        params: &NotificationParams,
        observed_channel_id: Option<&str>,
    ) -> Result<ChannelRenewal> {
        let stopped = match self
            .stop_watching_channel(user, &params.channel_id, &params.resource_id)
            .await
        {
            Ok(_) => true,
            Err(e) if e.status_code() == 404 => {
                warn!(error = %e, "old channel already gone, continuing renewal");
                false
            }
            Err(e) => return Err(e),
        };

        let new_channel_id = format!("{RENEWED_CHANNEL_PREFIX}{}", Uuid::new_v4());
        let watch = self.start_watching_channel(PRIMARY_CALENDAR_ID, &new_channel_id, user).await?;

        let persisted = self
            .calendars
            .replace_sync_data(user, observed_channel_id, &watch.identity())
            .await?
            .is_some();
        if !persisted {
            warn!(user, "another renewal updated the channel first, leaving its data in place");
        }

        Ok(ChannelRenewal { stopped, watch, persisted })
    }

    /// Register a webhook subscription for the given calendar.
    #[instrument(skip(self))]
    pub async fn start_watching_channel(
        &self,
        calendar_id: &str,
        channel_id: &str,
        user: &str,
    ) -> Result<WatchAck> {
        let expiration_ms = self.clock.now_ms() + self.watch.expiration_minutes * 60 * 1000;

        match self
            .provider
            .watch_events(user, calendar_id, channel_id, &self.watch.callback_url, expiration_ms)
            .await
        {
            Ok(ack) => {
                info!(channel_id, resource_id = %ack.resource_id, "watch channel registered");
                Ok(ack)
            }
            Err(CalbridgeError::Provider { status, detail }) if (400..500).contains(&status) => {
                Err(CalbridgeError::InvalidInput(format!(
                    "start watch failed ({status}): {detail}"
                )))
            }
            Err(e) => {
                error!(channel_id, error = %e, "start watch failed");
                Err(CalbridgeError::Internal(format!("start watch failed: {e}")))
            }
        }
    }

    /// Register a watch for a user-initiated request and persist the
    /// returned channel identity on the primary calendar.
    ///
    /// Only the primary calendar can be watched; the persisted triple always
    /// lands on the primary entry, so accepting another calendar id would
    /// register one calendar while recording its channel on another.
    pub async fn begin_channel_watch(
        &self,
        user: &str,
        calendar_id: &str,
        channel_id: &str,
    ) -> Result<WatchAck> {
        if calendar_id != PRIMARY_CALENDAR_ID {
            return Err(CalbridgeError::InvalidInput(format!(
                "only the primary calendar can be watched, got {calendar_id}"
            )));
        }

        let ack = self.start_watching_channel(calendar_id, channel_id, user).await?;
        self.calendars.replace_sync_data(user, None, &ack.identity()).await?;
        Ok(ack)
    }

    /// Request channel teardown from the provider.
    ///
    /// A channel the provider no longer knows (its natural expiry already
    /// passed) is classified as a non-retryable 404; callers tearing down
    /// possibly-expired channels tolerate it.
    #[instrument(skip(self))]
    pub async fn stop_watching_channel(
        &self,
        user: &str,
        channel_id: &str,
        resource_id: &str,
    ) -> Result<StopAck> {
        match self.provider.stop_channel(user, channel_id, resource_id).await {
            Ok(ack) => {
                info!(user, channel_id, "watch channel stopped");
                Ok(ack)
            }
            Err(CalbridgeError::Provider { status: 404, detail }) => Err(
                CalbridgeError::NotFound(format!("stop watch failed, channel gone: {detail}")),
            ),
            Err(e) => {
                error!(user, channel_id, error = %e, "stop watch failed");
                Err(e)
            }
        }
    }
}
