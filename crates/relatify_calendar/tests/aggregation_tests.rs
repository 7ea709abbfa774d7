// --- File: crates/relatify_calendar/tests/aggregation_tests.rs ---
//! End-to-end aggregation scenarios over injected fakes: a window fetch
//! against a healthy CRM backend with the provider in various states of
//! disrepair.

use async_trait::async_trait;
use chrono::DateTime;
use relatify_calendar::colors::ColorAssigner;
use relatify_calendar::orchestrator::SyncOrchestrator;
use relatify_common::services::{
    CalendarEvent, EventSource, LocalCalendarApi, NewLocalEvent, NewProviderEvent, OwnerId,
    ProviderCalendarApi, PROVIDER_SENTINEL,
};
use relatify_common::{external_service_error, CivilDate, RelatifyError};
use std::sync::Arc;

struct CrmBackendFake {
    events: Vec<CalendarEvent>,
}

#[async_trait]
impl LocalCalendarApi for CrmBackendFake {
    async fn list(
        &self,
        start: CivilDate,
        end: CivilDate,
    ) -> Result<Vec<CalendarEvent>, RelatifyError> {
        Ok(self
            .events
            .iter()
            .filter(|e| e.date >= start && e.date <= end)
            .cloned()
            .collect())
    }

    async fn create(&self, _event: NewLocalEvent) -> Result<CalendarEvent, RelatifyError> {
        unimplemented!("read-only fake")
    }

    async fn delete(&self, _id: &str) -> Result<(), RelatifyError> {
        unimplemented!("read-only fake")
    }
}

enum ProviderFake {
    Unreachable,
    /// Events keyed by the RFC3339 start times the provider would report.
    Calendar(Vec<(&'static str, &'static str)>),
}

#[async_trait]
impl ProviderCalendarApi for ProviderFake {
    async fn is_linked(&self) -> bool {
        true
    }

    async fn list_events(
        &self,
        _start: CivilDate,
        _end: CivilDate,
    ) -> Result<Vec<CalendarEvent>, RelatifyError> {
        match self {
            ProviderFake::Unreachable => {
                Err(external_service_error("Outlook", "connection timed out"))
            }
            ProviderFake::Calendar(entries) => Ok(entries
                .iter()
                .map(|(id, start)| {
                    // Same normalization the gateway applies: the civil day
                    // comes from the event's own wall clock.
                    let instant = DateTime::parse_from_rfc3339(start).unwrap();
                    CalendarEvent {
                        id: format!("outlook-{id}"),
                        text: "Provider meeting".to_string(),
                        date: CivilDate::from_datetime(&instant),
                        color: None,
                        owner: OwnerId::ProviderSentinel,
                        source: EventSource::Provider,
                        start_time: Some(instant),
                        end_time: None,
                        location: None,
                        preview: None,
                        is_all_day: None,
                    }
                })
                .collect()),
        }
    }

    async fn create_event(&self, _event: NewProviderEvent) -> Result<String, RelatifyError> {
        unimplemented!("read-only fake")
    }

    async fn delete_event(&self, _provider_id: &str) -> Result<(), RelatifyError> {
        unimplemented!("read-only fake")
    }
}

fn review_event() -> CalendarEvent {
    CalendarEvent {
        id: "42".to_string(),
        text: "Review".to_string(),
        date: CivilDate::parse("2024-03-01").unwrap(),
        color: None,
        owner: OwnerId::Local("user-1".to_string()),
        source: EventSource::Local,
        start_time: None,
        end_time: None,
        location: None,
        preview: None,
        is_all_day: None,
    }
}

fn window() -> (CivilDate, CivilDate) {
    (
        CivilDate::parse("2024-03-01").unwrap(),
        CivilDate::parse("2024-03-03").unwrap(),
    )
}

#[tokio::test]
async fn unreachable_provider_still_yields_the_local_view() {
    let orchestrator = SyncOrchestrator::new(
        Arc::new(CrmBackendFake {
            events: vec![review_event()],
        }),
        Some(Arc::new(ProviderFake::Unreachable)),
        ColorAssigner::default(),
    );

    let (start, end) = window();
    let days = orchestrator
        .get_events_for_window(start, end, "user-1")
        .await
        .expect("provider outage must not fail the window fetch");

    let day = &days["2024-03-01"];
    assert_eq!(day.len(), 1);
    assert_eq!(day[0].text, "Review");
    assert_eq!(day[0].source, EventSource::Local);
    assert!(day[0].color.is_some());
}

#[tokio::test]
async fn late_evening_provider_event_stays_on_its_wall_clock_day() {
    // 23:30 on March 1st in -08:00 is 07:30 March 2nd UTC; the event must
    // render under March 1st regardless of the host timezone.
    let orchestrator = SyncOrchestrator::new(
        Arc::new(CrmBackendFake { events: vec![] }),
        Some(Arc::new(ProviderFake::Calendar(vec![(
            "AAMk1",
            "2024-03-01T23:30:00-08:00",
        )]))),
        ColorAssigner::default(),
    );

    let (start, end) = window();
    let days = orchestrator
        .get_events_for_window(start, end, "")
        .await
        .unwrap();

    assert!(days.contains_key("2024-03-01"));
    assert!(!days.contains_key("2024-03-02"));
    let event = &days["2024-03-01"][0];
    assert_eq!(event.date.date_key(), "2024-03-01");
    assert_eq!(event.source, EventSource::Provider);
}

#[tokio::test]
async fn merged_day_serializes_with_the_sentinel_owner_on_the_wire() {
    let orchestrator = SyncOrchestrator::new(
        Arc::new(CrmBackendFake {
            events: vec![review_event()],
        }),
        Some(Arc::new(ProviderFake::Calendar(vec![(
            "AAMk1",
            "2024-03-01T10:00:00+01:00",
        )]))),
        ColorAssigner::default(),
    );

    let (start, end) = window();
    let days = orchestrator
        .get_events_for_window(start, end, "user-1")
        .await
        .unwrap();

    let json = serde_json::to_value(&days).unwrap();
    let day = json["2024-03-01"].as_array().unwrap();
    assert_eq!(day.len(), 2);
    // Local first, provider second; the sentinel appears as its literal.
    assert_eq!(day[0]["source"], "local");
    assert_eq!(day[0]["user_id"], "user-1");
    assert_eq!(day[1]["source"], "provider");
    assert_eq!(day[1]["user_id"], PROVIDER_SENTINEL);
    assert!(day[1]["id"].as_str().unwrap().starts_with("outlook-"));
}
