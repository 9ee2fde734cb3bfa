//! Channel lifecycle decision helpers

use calbridge_domain::constants::CHANNEL_RENEWAL_LEAD_MS;
use calbridge_domain::{
    CalbridgeError, CalendarListEntry, CalendarListRecord, NotificationParams, Result,
};
use tracing::{debug, error};

/// True unless exactly one calendar entry holds `channel_id`.
///
/// More than one match is treated the same as zero for this predicate;
/// duplicate detection is a separate concern raised elsewhere.
pub fn channel_not_found(record: &CalendarListRecord, channel_id: &str) -> bool {
    let matches = record
        .google
        .items
        .iter()
        .filter(|item| item.sync.channel_id.as_deref() == Some(channel_id))
        .count();
    matches != 1
}

/// True when the channel expires within the renewal lead window
/// (`now + 30min`).
pub fn channel_expires_soon(expiration_ms: i64, now_ms: i64) -> bool {
    expiration_ms < now_ms + CHANNEL_RENEWAL_LEAD_MS
}

/// Central renewal policy gate: a channel is renewed when it cannot be
/// matched to a stored entry or when it is close to expiring.
pub fn channel_refresh_needed(
    params: &NotificationParams,
    record: &CalendarListRecord,
    now_ms: i64,
) -> bool {
    let not_found = channel_not_found(record, &params.channel_id);
    // A malformed expiration parses to 0 and therefore reads as expired.
    let expiration_ms = params.expiration.parse::<i64>().unwrap_or(0);
    let expiring = channel_expires_soon(expiration_ms, now_ms);

    if not_found || expiring {
        debug!(
            channel_id = %params.channel_id,
            not_found,
            expiring,
            "channel refresh needed"
        );
    }

    not_found || expiring
}

/// Locate the calendar entry watched under `resource_id`.
///
/// Zero matches is a caller-handled miss; more than one violates the
/// one-calendar-per-resource invariant and raises a classified,
/// non-retryable error.
pub fn find_calendar_by_resource_id<'a>(
    resource_id: &str,
    record: &'a CalendarListRecord,
) -> Result<Option<&'a CalendarListEntry>> {
    let mut matches = record
        .google
        .items
        .iter()
        .filter(|item| item.sync.resource_id.as_deref() == Some(resource_id));

    let first = matches.next();
    if matches.next().is_some() {
        return Err(CalbridgeError::DuplicateResource(format!(
            "duplicate resourceId: {resource_id}"
        )));
    }

    if first.is_none() {
        error!(resource_id, user = %record.user, "no calendar matches resourceId");
    }

    Ok(first)
}
