//! Google Calendar API client
//!
//! Reqwest implementation of the `CalendarProvider` port. Non-success
//! responses are classified by status so callers can react to the
//! interesting ones (404 on stop, 410 on a stale sync token).

use std::sync::Arc;

use async_trait::async_trait;
use calbridge_core::{CalendarProvider, EventDelta, StopAck, WatchAck};
use calbridge_domain::{CalbridgeError, GcalEvent, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::token::AccessTokenSource;
use crate::errors::InfraError;

/// Google Calendar API client implementing the `CalendarProvider` port.
pub struct GoogleCalendarClient {
    http: Client,
    api_base: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl GoogleCalendarClient {
    /// Create a new client against `api_base` (the Calendar v3 root).
    pub fn new(api_base: impl Into<String>, tokens: Arc<dyn AccessTokenSource>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self { http: Client::new(), api_base, tokens }
    }

    async fn classify_failure(response: reqwest::Response) -> CalbridgeError {
        let status = response.status().as_u16();
        let detail = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
        CalbridgeError::Provider { status, detail }
    }
}

#[derive(Debug, Serialize)]
struct WatchRequest<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    address: &'a str,
    expiration: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WatchResponse {
    id: String,
    resource_id: String,
    expiration: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StopRequest<'a> {
    id: &'a str,
    resource_id: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct EventsPage {
    items: Vec<GcalEvent>,
    next_page_token: Option<String>,
    next_sync_token: Option<String>,
}

#[async_trait]
impl CalendarProvider for GoogleCalendarClient {
    async fn watch_events(
        &self,
        user: &str,
        calendar_id: &str,
        channel_id: &str,
        callback_url: &str,
        expiration_ms: i64,
    ) -> Result<WatchAck> {
        let token = self.tokens.access_token(user).await?;
        let url = format!("{}/calendars/{}/events/watch", self.api_base, calendar_id);
        let body = WatchRequest {
            id: channel_id,
            kind: "web_hook",
            address: callback_url,
            expiration: expiration_ms.to_string(),
        };

        debug!(calendar_id, channel_id, "registering watch channel");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(InfraError::from)?;

        if !response.status().is_success() {
            return Err(Self::classify_failure(response).await);
        }

        let ack: WatchResponse = response.json().await.map_err(InfraError::from)?;
        Ok(WatchAck {
            channel_id: ack.id,
            resource_id: ack.resource_id,
            expiration: ack.expiration,
        })
    }

    async fn stop_channel(
        &self,
        user: &str,
        channel_id: &str,
        resource_id: &str,
    ) -> Result<StopAck> {
        let token = self.tokens.access_token(user).await?;
        let url = format!("{}/channels/stop", self.api_base);
        let body = StopRequest { id: channel_id, resource_id };

        debug!(channel_id, resource_id, "stopping watch channel");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(InfraError::from)?;

        // successful teardown is a 204
        if response.status() == StatusCode::NO_CONTENT || response.status().is_success() {
            return Ok(StopAck {
                channel_id: channel_id.to_string(),
                resource_id: resource_id.to_string(),
            });
        }

        Err(Self::classify_failure(response).await)
    }

    async fn list_events_delta(
        &self,
        user: &str,
        calendar_id: &str,
        sync_token: &str,
        page_token: Option<&str>,
    ) -> Result<EventDelta> {
        let token = self.tokens.access_token(user).await?;
        let url = format!("{}/calendars/{}/events", self.api_base, calendar_id);

        let mut query: Vec<(&str, String)> = vec![("syncToken", sync_token.to_string())];
        if let Some(page) = page_token {
            query.push(("pageToken", page.to_string()));
        }

        debug!(calendar_id, page = page_token.is_some(), "fetching event delta");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .query(&query)
            .send()
            .await
            .map_err(InfraError::from)?;

        if !response.status().is_success() {
            return Err(Self::classify_failure(response).await);
        }

        let page: EventsPage = response.json().await.map_err(InfraError::from)?;
        Ok(EventDelta {
            items: page.items,
            next_page_token: page.next_page_token,
            next_sync_token: page.next_sync_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json_string, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::super::token::StaticTokenSource;
    use super::*;

    fn client(server: &MockServer) -> GoogleCalendarClient {
        GoogleCalendarClient::new(server.uri(), Arc::new(StaticTokenSource::new("test-token")))
    }

    #[tokio::test]
    async fn watch_returns_channel_identity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/calendars/primary/events/watch"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "ch1",
                "resourceId": "res1",
                "expiration": "1700001800000"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ack = client(&server)
            .watch_events("u1", "primary", "ch1", "https://example.test/cb", 1_700_001_800_000)
            .await
            .unwrap();

        assert_eq!(ack.channel_id, "ch1");
        assert_eq!(ack.resource_id, "res1");
        assert_eq!(ack.expiration, "1700001800000");
    }

    #[tokio::test]
    async fn watch_client_error_is_classified_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/calendars/primary/events/watch"))
            .respond_with(ResponseTemplate::new(400).set_body_string("channelIdNotUnique"))
            .mount(&server)
            .await;

        let err = client(&server)
            .watch_events("u1", "primary", "ch1", "https://example.test/cb", 0)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn stop_sends_channel_and_resource() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/stop"))
            .and(body_json_string(r#"{"id":"ch1","resourceId":"res1"}"#))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let ack = client(&server).stop_channel("u1", "ch1", "res1").await.unwrap();
        assert_eq!(ack.channel_id, "ch1");
        assert_eq!(ack.resource_id, "res1");
    }

    #[tokio::test]
    async fn stop_of_gone_channel_is_classified_404() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/stop"))
            .respond_with(ResponseTemplate::new(404).set_body_string("channel not found"))
            .mount(&server)
            .await;

        let err = client(&server).stop_channel("u1", "ch1", "res1").await.unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert!(!err.retryable());
    }

    #[tokio::test]
    async fn delta_listing_parses_items_and_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(query_param("syncToken", "tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "id": "a", "status": "confirmed" },
                    { "id": "b", "status": "cancelled" }
                ],
                "nextSyncToken": "tok-2"
            })))
            .mount(&server)
            .await;

        let delta =
            client(&server).list_events_delta("u1", "primary", "tok-1", None).await.unwrap();

        assert_eq!(delta.items.len(), 2);
        assert!(delta.items[1].is_cancelled());
        assert_eq!(delta.next_sync_token.as_deref(), Some("tok-2"));
        assert!(delta.next_page_token.is_none());
    }

    #[tokio::test]
    async fn stale_sync_token_surfaces_as_410() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(410).set_body_string("sync token expired"))
            .mount(&server)
            .await;

        let err =
            client(&server).list_events_delta("u1", "primary", "tok-old", None).await.unwrap_err();

        assert_eq!(err.status_code(), 410);
    }
}
