// --- File: crates/relatify_calendar/src/local_store.rs ---
//! Thin HTTP client for CRM-native calendar events.
//!
//! This is a pure data-access boundary: no merge logic, no color logic.
//! Failures propagate to the caller because the CRM backend is the system
//! of record; a calendar that silently drops local events is worse than an
//! error page.

use async_trait::async_trait;
use relatify_common::services::{CalendarEvent, EventSource, LocalCalendarApi, NewLocalEvent, OwnerId};
use relatify_common::{
    external_service_error, not_found, CivilDate, RelatifyError, HTTP_CLIENT,
};
use relatify_config::LocalApiConfig;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// The backend stores ids as integers but older rows serialized them as
/// strings; accept both.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Num(i64),
    Str(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Num(n) => n.to_string(),
            RawId::Str(s) => s,
        }
    }
}

/// One calendar-event row as the CRM backend serves it.
#[derive(Debug, Deserialize)]
struct LocalEventRecord {
    id: RawId,
    event_text: String,
    event_date: CivilDate,
    #[serde(default)]
    color: Option<String>,
    user_id: String,
}

impl From<LocalEventRecord> for CalendarEvent {
    fn from(record: LocalEventRecord) -> Self {
        CalendarEvent {
            id: record.id.into_string(),
            text: record.event_text,
            date: record.event_date,
            color: record.color,
            owner: OwnerId::Local(record.user_id),
            source: EventSource::Local,
            start_time: None,
            end_time: None,
            location: None,
            preview: None,
            is_all_day: None,
        }
    }
}

pub struct LocalEventStore {
    http: Client,
    base_url: String,
}

impl LocalEventStore {
    pub fn new(config: &LocalApiConfig) -> Self {
        Self {
            http: HTTP_CLIENT.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn events_url(&self) -> String {
        format!("{}/calendar-events", self.base_url)
    }

    async fn read_body(response: reqwest::Response) -> Result<(u16, String), RelatifyError> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }
}

#[async_trait]
impl LocalCalendarApi for LocalEventStore {
    async fn list(
        &self,
        start: CivilDate,
        end: CivilDate,
    ) -> Result<Vec<CalendarEvent>, RelatifyError> {
        let response = self
            .http
            .get(self.events_url())
            .query(&[("start", start.date_key()), ("end", end.date_key())])
            .send()
            .await?;
        let (status, body) = Self::read_body(response).await?;
        if status >= 400 {
            return Err(external_service_error(
                "CRM backend",
                format!("list returned status {status}: {body}"),
            ));
        }

        let records: Vec<LocalEventRecord> = serde_json::from_str(&body)?;
        debug!("CRM backend returned {} local events", records.len());
        Ok(records.into_iter().map(CalendarEvent::from).collect())
    }

    async fn create(&self, event: NewLocalEvent) -> Result<CalendarEvent, RelatifyError> {
        if event.event_text.trim().is_empty() {
            return Err(RelatifyError::ValidationError(
                "event_text must not be empty".to_string(),
            ));
        }

        let response = self
            .http
            .post(self.events_url())
            .json(&event)
            .send()
            .await?;
        let (status, body) = Self::read_body(response).await?;
        if status >= 400 {
            return Err(external_service_error(
                "CRM backend",
                format!("create returned status {status}: {body}"),
            ));
        }

        let record: LocalEventRecord = serde_json::from_str(&body)?;
        Ok(record.into())
    }

    async fn delete(&self, id: &str) -> Result<(), RelatifyError> {
        let response = self
            .http
            .delete(format!("{}/{}", self.events_url(), id))
            .send()
            .await?;
        let status = response.status().as_u16();
        if status == 404 {
            return Err(not_found(format!("calendar event {id}")));
        }
        if status >= 400 {
            let body = response.text().await?;
            return Err(external_service_error(
                "CRM backend",
                format!("delete returned status {status}: {body}"),
            ));
        }
        Ok(())
    }
}
