// --- File: crates/relatify_outlook/src/gateway.rs ---
//! The event gateway: Graph-style calendar API driven over plain HTTP,
//! mapped into the unified event shape.
//!
//! The mapping is where the off-by-one-day bug lives in naive ports: an
//! event's calendar day is taken from its own wall-clock start, never from a
//! UTC truncation of the instant. `11:30pm -08:00` on March 1st stays on
//! March 1st even when this process runs in UTC.

use crate::auth::ProviderAuthManager;
use crate::error::{classify_api_failure, ProviderError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use relatify_common::civil::CivilDate;
use relatify_common::services::{
    CalendarEvent, EventSource, NewProviderEvent, OwnerId, ProviderCalendarApi,
    PROVIDER_ID_PREFIX,
};
use relatify_common::{RelatifyError, HTTP_CLIENT};
use relatify_config::OutlookConfig;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, warn};

/// Events created without an explicit end get this duration.
const DEFAULT_EVENT_DURATION_MINUTES: i64 = 60;
/// Reminder lead time applied to every event we create.
const DEFAULT_REMINDER_MINUTES: u32 = 15;

const CALENDAR_VIEW_SELECT: &str = "id,subject,start,end,location,bodyPreview,isAllDay";

// --- Graph API wire types ---

#[derive(Debug, serde::Deserialize)]
struct GraphCalendarView {
    value: Vec<GraphEvent>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GraphEvent {
    pub id: Option<String>,
    pub subject: Option<String>,
    pub body_preview: Option<String>,
    pub start: Option<GraphDateTimeZone>,
    pub end: Option<GraphDateTimeZone>,
    pub location: Option<GraphLocation>,
    pub is_all_day: Option<bool>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GraphDateTimeZone {
    pub date_time: Option<String>,
    pub time_zone: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GraphLocation {
    pub display_name: Option<String>,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GraphNewEvent {
    pub subject: String,
    pub body: GraphItemBody,
    pub start: GraphZonedTime,
    pub end: GraphZonedTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GraphNewLocation>,
    pub is_reminder_on: bool,
    pub reminder_minutes_before_start: u32,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GraphItemBody {
    pub content_type: &'static str,
    pub content: String,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GraphZonedTime {
    pub date_time: String,
    pub time_zone: &'static str,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GraphNewLocation {
    pub display_name: String,
}

// --- Pure mapping helpers (unit-tested without a server) ---

/// Read a Graph date-time into the event's civil day plus its instant.
///
/// Graph sends either an offset-carrying RFC3339 string or a bare wall-clock
/// string with a separate zone name. Either way the calendar day comes from
/// the wall-clock fields.
pub(crate) fn parse_graph_datetime(
    value: &GraphDateTimeZone,
) -> Result<(CivilDate, DateTime<FixedOffset>), ProviderError> {
    let raw = value.date_time.as_deref().ok_or_else(|| {
        ProviderError::TimeParse("provider event is missing a date-time".to_string())
    })?;

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok((CivilDate::from_datetime(&instant), instant));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| ProviderError::TimeParse(format!("unparseable provider time {raw:?}: {e}")))?;
    let civil: CivilDate = naive.date().into();

    // Pin the instant to the named zone when we recognize it, to UTC when we
    // do not; the civil day is the wall clock either way.
    let instant = match value.time_zone.as_deref().and_then(|z| z.parse::<Tz>().ok()) {
        Some(tz) => tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.fixed_offset()),
        None => None,
    }
    .unwrap_or_else(|| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc).fixed_offset());

    Ok((civil, instant))
}

/// Map one provider event into the unified shape.
pub(crate) fn map_graph_event(event: GraphEvent) -> Result<CalendarEvent, ProviderError> {
    let id = event.id.ok_or_else(|| {
        ProviderError::TimeParse("provider event is missing an id".to_string())
    })?;
    let start = event.start.as_ref().ok_or_else(|| {
        ProviderError::TimeParse("provider event is missing a start".to_string())
    })?;
    let (date, start_instant) = parse_graph_datetime(start)?;
    let end_instant = match event.end.as_ref() {
        Some(end) => Some(parse_graph_datetime(end)?.1),
        None => None,
    };

    Ok(CalendarEvent {
        id: format!("{PROVIDER_ID_PREFIX}{id}"),
        text: event.subject.unwrap_or_else(|| "(no subject)".to_string()),
        date,
        color: None, // resolved at merge time
        owner: OwnerId::ProviderSentinel,
        source: EventSource::Provider,
        start_time: Some(start_instant),
        end_time: end_instant,
        location: event.location.and_then(|l| l.display_name),
        preview: event.body_preview.filter(|p| !p.is_empty()),
        is_all_day: event.is_all_day,
    })
}

/// Build the create-event body, applying the duration and reminder defaults.
/// Rejects bad input before any network call.
pub(crate) fn build_create_body(
    request: &NewProviderEvent,
) -> Result<GraphNewEvent, ProviderError> {
    if let Some(end) = request.end_time {
        if end <= request.start_time {
            return Err(ProviderError::Validation(
                "end time must be after start time".to_string(),
            ));
        }
    }
    if request.subject.trim().is_empty() {
        return Err(ProviderError::Validation(
            "event subject must not be empty".to_string(),
        ));
    }

    let end = request
        .end_time
        .unwrap_or(request.start_time + Duration::minutes(DEFAULT_EVENT_DURATION_MINUTES));

    // Event times are stored in UTC; the provider renders them in the
    // viewer's calendar zone.
    let fmt = |dt: DateTime<FixedOffset>| {
        dt.with_timezone(&Utc)
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string()
    };

    Ok(GraphNewEvent {
        subject: request.subject.clone(),
        body: GraphItemBody {
            content_type: "text",
            content: request.body.clone().unwrap_or_default(),
        },
        start: GraphZonedTime {
            date_time: fmt(request.start_time),
            time_zone: "UTC",
        },
        end: GraphZonedTime {
            date_time: fmt(end),
            time_zone: "UTC",
        },
        location: request.location.clone().map(|name| GraphNewLocation {
            display_name: name,
        }),
        is_reminder_on: true,
        reminder_minutes_before_start: DEFAULT_REMINDER_MINUTES,
    })
}

// --- The gateway ---

/// Fetches, creates and deletes events against the provider's calendar API
/// using tokens from the auth manager.
pub struct OutlookEventGateway {
    http: Client,
    auth: Arc<ProviderAuthManager>,
    config: OutlookConfig,
    time_zone: Tz,
}

impl OutlookEventGateway {
    pub fn new(config: OutlookConfig, auth: Arc<ProviderAuthManager>, time_zone: Tz) -> Self {
        Self {
            http: HTTP_CLIENT.clone(),
            auth,
            config,
            time_zone,
        }
    }

    async fn bearer_token(&self) -> Result<String, ProviderError> {
        self.auth.get_access_token(&self.config.scopes).await
    }

    /// List provider events whose start falls in the civil-day window.
    pub async fn list_events(
        &self,
        start: CivilDate,
        end: CivilDate,
    ) -> Result<Vec<CalendarEvent>, ProviderError> {
        let token = self.bearer_token().await?;
        let (window_start, _) = start.day_bounds(&self.time_zone);
        let (_, window_end) = end.day_bounds(&self.time_zone);

        let response = self
            .http
            .get(format!("{}/me/calendarview", self.config.graph_base_url))
            .query(&[
                ("startDateTime", window_start.to_rfc3339()),
                ("endDateTime", window_end.to_rfc3339()),
                ("$select", CALENDAR_VIEW_SELECT.to_string()),
                ("$orderby", "start/dateTime".to_string()),
            ])
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        if status >= 400 {
            return Err(classify_api_failure(status, &body));
        }

        let view: GraphCalendarView = serde_json::from_str(&body)?;
        debug!("Provider returned {} events for the window", view.value.len());

        let mut events = Vec::with_capacity(view.value.len());
        for raw in view.value {
            match map_graph_event(raw) {
                Ok(event) => events.push(event),
                // One garbled event must not take down the whole fetch.
                Err(e) => warn!("Skipping unmappable provider event: {}", e),
            }
        }
        Ok(events)
    }

    /// Create an event on the provider calendar; returns the provider id.
    pub async fn create_event(&self, request: NewProviderEvent) -> Result<String, ProviderError> {
        let body = build_create_body(&request)?;
        let token = self.bearer_token().await?;

        let response = self
            .http
            .post(format!("{}/me/events", self.config.graph_base_url))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        if status >= 400 {
            return Err(classify_api_failure(status, &text));
        }

        #[derive(serde::Deserialize)]
        struct CreatedEvent {
            id: String,
        }
        let created: CreatedEvent = serde_json::from_str(&text)?;
        Ok(created.id)
    }

    /// Delete an event by its provider id. An already-deleted event counts
    /// as success; other failures are logged and returned so the caller can
    /// still proceed with its own bookkeeping.
    pub async fn delete_event(&self, provider_id: &str) -> Result<(), ProviderError> {
        let token = self.bearer_token().await?;

        let response = self
            .http
            .delete(format!(
                "{}/me/events/{}",
                self.config.graph_base_url, provider_id
            ))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status == 404 {
            return Ok(());
        }
        if status >= 400 {
            let body = response.text().await?;
            let error = classify_api_failure(status, &body);
            warn!("Failed to delete provider event {}: {}", provider_id, error);
            return Err(error);
        }
        Ok(())
    }
}

#[async_trait]
impl ProviderCalendarApi for OutlookEventGateway {
    async fn is_linked(&self) -> bool {
        self.auth.has_linked_account().await
    }

    async fn list_events(
        &self,
        start: CivilDate,
        end: CivilDate,
    ) -> Result<Vec<CalendarEvent>, RelatifyError> {
        OutlookEventGateway::list_events(self, start, end)
            .await
            .map_err(Into::into)
    }

    async fn create_event(&self, event: NewProviderEvent) -> Result<String, RelatifyError> {
        OutlookEventGateway::create_event(self, event)
            .await
            .map_err(Into::into)
    }

    async fn delete_event(&self, provider_id: &str) -> Result<(), RelatifyError> {
        OutlookEventGateway::delete_event(self, provider_id)
            .await
            .map_err(Into::into)
    }
}
