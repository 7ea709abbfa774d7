// File: crates/relatify_outlook/src/doc.rs

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{
    ConnectResponse, CreateEventResponse, EventsResponse, LinkStatusResponse, SimpleResponse,
};
use relatify_common::services::{CalendarEvent, EventSource, NewProviderEvent};

#[utoipa::path(
    get,
    path = "/outlook/status",
    responses(
        (status = 200, description = "Whether an Outlook account is linked", body = LinkStatusResponse,
         example = json!({ "linked": true, "account": "dana@example.com" })
        ),
        (status = 503, description = "Outlook service disabled")
    )
)]
fn doc_link_status_handler() {}

#[utoipa::path(
    post,
    path = "/outlook/connect",
    responses(
        (status = 200, description = "Account linked", body = ConnectResponse,
         example = json!({
             "success": true,
             "account": "dana@example.com",
             "message": "Outlook account linked successfully."
         })
        ),
        (status = 401, description = "Sign-in failed or was abandoned"),
        (status = 403, description = "Administrator consent required for the requested scopes")
    )
)]
fn doc_connect_handler() {}

#[utoipa::path(
    get,
    path = "/outlook/events",
    params(
        ("start_date" = String, Query, description = "Start date in YYYY-MM-DD format", example = "2025-05-05", format = "date"),
        ("end_date" = String, Query, description = "End date in YYYY-MM-DD format", example = "2025-05-24", format = "date")
    ),
    responses(
        (status = 200, description = "Provider events in the window", body = EventsResponse),
        (status = 400, description = "Invalid date range", body = String),
        (status = 403, description = "Administrator consent required")
    )
)]
fn doc_list_events_handler() {}

#[utoipa::path(
    post,
    path = "/outlook/events",
    request_body(content = NewProviderEvent, example = json!({
        "subject": "Meeting with client",
        "startTime": "2025-05-15T10:00:00+02:00",
        "body": "Quarterly review",
        "location": "Office 2"
    })),
    responses(
        (status = 200, description = "Event created", body = CreateEventResponse,
         example = json!({
             "success": true,
             "event_id": "AAMkAGI2...",
             "message": "Event created successfully."
         })
        ),
        (status = 400, description = "Invalid event data")
    )
)]
fn doc_create_event_handler() {}

#[utoipa::path(
    delete,
    path = "/outlook/events/{event_id}",
    params(
        ("event_id" = String, Path, description = "The provider id of the event to delete")
    ),
    responses(
        (status = 200, description = "Deletion result", body = SimpleResponse,
         example = json!({ "success": true, "message": "Event deleted successfully." })
        )
    )
)]
fn doc_delete_event_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_link_status_handler,
        doc_connect_handler,
        doc_list_events_handler,
        doc_create_event_handler,
        doc_delete_event_handler
    ),
    components(
        schemas(
            LinkStatusResponse,
            ConnectResponse,
            EventsResponse,
            CreateEventResponse,
            SimpleResponse,
            CalendarEvent,
            EventSource,
            NewProviderEvent
        )
    ),
    tags(
        (name = "outlook", description = "Outlook calendar integration API")
    ),
    servers(
        (url = "/api", description = "Outlook integration API server")
    )
)]
pub struct OutlookApiDoc;
