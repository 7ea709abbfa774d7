// File: crates/relatify_calendar/src/doc.rs

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::DeleteResponse;
use relatify_common::services::{CalendarEvent, EventSource, NewLocalEvent};

#[utoipa::path(
    get,
    path = "/calendar/view",
    params(
        ("start_date" = String, Query, description = "Start date in YYYY-MM-DD format", example = "2025-05-05", format = "date"),
        ("end_date" = String, Query, description = "End date in YYYY-MM-DD format", example = "2025-05-24", format = "date"),
        ("user_id" = Option<String>, Query, description = "Requesting CRM user id; anchors color assignment")
    ),
    responses(
        (status = 200, description = "Merged events grouped by calendar day",
         example = json!({
             "2025-05-05": [
                 {
                     "id": "42",
                     "event_text": "Review",
                     "event_date": "2025-05-05",
                     "color": "#58b7b3",
                     "user_id": "user-1",
                     "source": "local"
                 },
                 {
                     "id": "outlook-AAMk123",
                     "event_text": "Standup",
                     "event_date": "2025-05-05",
                     "color": "#0078d4",
                     "user_id": "outlook",
                     "source": "provider",
                     "startTime": "2025-05-05T09:00:00+02:00"
                 }
             ]
         })
        ),
        (status = 400, description = "Invalid date range", body = String),
        (status = 502, description = "CRM backend unreachable", body = String)
    )
)]
fn doc_get_view_handler() {}

#[utoipa::path(
    get,
    path = "/calendar/day/{date_key}",
    params(
        ("date_key" = String, Path, description = "Calendar day in YYYY-MM-DD format", example = "2025-05-05")
    ),
    responses(
        (status = 200, description = "Events of one day from the last fetched window", body = Vec<CalendarEvent>)
    )
)]
fn doc_get_day_handler() {}

#[utoipa::path(
    post,
    path = "/calendar/events",
    request_body(content = NewLocalEvent, example = json!({
        "event_text": "Call Dana",
        "event_date": "2025-05-06",
        "color": "#f6786e"
    })),
    responses(
        (status = 200, description = "The stored event", body = CalendarEvent),
        (status = 400, description = "Invalid event data"),
        (status = 502, description = "CRM backend unreachable")
    )
)]
fn doc_create_event_handler() {}

#[utoipa::path(
    delete,
    path = "/calendar/events/{event_id}",
    params(
        ("event_id" = String, Path, description = "The id of the local event to delete")
    ),
    responses(
        (status = 200, description = "Deletion result", body = DeleteResponse,
         example = json!({ "success": true, "message": "Event deleted successfully." })
        ),
        (status = 404, description = "Event not found")
    )
)]
fn doc_delete_event_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_get_view_handler,
        doc_get_day_handler,
        doc_create_event_handler,
        doc_delete_event_handler
    ),
    components(
        schemas(
            CalendarEvent,
            EventSource,
            NewLocalEvent,
            DeleteResponse
        )
    ),
    tags(
        (name = "calendar", description = "Unified calendar aggregation API")
    ),
    servers(
        (url = "/api", description = "Calendar API server")
    )
)]
pub struct CalendarApiDoc;
