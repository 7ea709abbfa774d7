// --- File: crates/relatify_calendar/src/handlers.rs ---
use crate::orchestrator::{DayMap, SyncOrchestrator};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use relatify_common::services::{CalendarEvent, NewLocalEvent};
use relatify_common::{CivilDate, HttpStatusCode, RelatifyError};
use relatify_config::AppConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

// Shared state for the calendar handlers
#[derive(Clone)]
pub struct CalendarState {
    pub config: Arc<AppConfig>,
    pub orchestrator: Arc<SyncOrchestrator>,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct ViewQuery {
    /// Inclusive window start, YYYY-MM-DD.
    pub start_date: String,
    /// Inclusive window end, YYYY-MM-DD.
    pub end_date: String,
    /// The requesting CRM user; anchors color assignment.
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

fn error_response(error: RelatifyError) -> (StatusCode, String) {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, error.to_string())
}

fn parse_window(start: &str, end: &str) -> Result<(CivilDate, CivilDate), (StatusCode, String)> {
    let start = CivilDate::parse(start).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid start_date format (YYYY-MM-DD)".to_string(),
        )
    })?;
    let end = CivilDate::parse(end).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid end_date format (YYYY-MM-DD)".to_string(),
        )
    })?;
    if end < start {
        return Err((
            StatusCode::BAD_REQUEST,
            "end_date must be on or after start_date".to_string(),
        ));
    }
    Ok((start, end))
}

/// Handler returning the merged per-day calendar view.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/calendar/view", // Path relative to /api
    params(ViewQuery),
    responses(
        (status = 200, description = "Merged events grouped by calendar day"),
        (status = 400, description = "Bad date range"),
        (status = 502, description = "CRM backend unreachable")
    ),
    tag = "Calendar"
))]
pub async fn get_view_handler(
    State(state): State<Arc<CalendarState>>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<DayMap>, (StatusCode, String)> {
    let (start, end) = parse_window(&query.start_date, &query.end_date)?;
    let current_user = query.user_id.as_deref().unwrap_or_default();

    match state
        .orchestrator
        .get_events_for_window(start, end, current_user)
        .await
    {
        Ok(days) => Ok(Json(days)),
        Err(e) => {
            info!("Error building calendar view: {}", e);
            Err(error_response(e))
        }
    }
}

/// Handler returning one day from the last fetched window.
#[axum::debug_handler]
pub async fn get_day_handler(
    State(state): State<Arc<CalendarState>>,
    Path(date_key): Path<String>,
) -> Result<Json<Vec<CalendarEvent>>, (StatusCode, String)> {
    if CivilDate::parse(&date_key).is_err() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Invalid date format (YYYY-MM-DD)".to_string(),
        ));
    }
    Ok(Json(state.orchestrator.get_events_for_day(&date_key).await))
}

/// Handler creating a CRM-native calendar event.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/calendar/events",
    request_body = NewLocalEvent,
    responses(
        (status = 200, description = "The stored event", body = CalendarEvent),
        (status = 400, description = "Invalid event data"),
        (status = 502, description = "CRM backend unreachable")
    ),
    tag = "Calendar"
))]
pub async fn create_event_handler(
    State(state): State<Arc<CalendarState>>,
    Json(payload): Json<NewLocalEvent>,
) -> Result<Json<CalendarEvent>, (StatusCode, String)> {
    match state.orchestrator.create_local_event(payload).await {
        Ok(created) => {
            info!("Created local event {}", created.id);
            Ok(Json(created))
        }
        Err(e) => {
            info!("Error creating local event: {}", e);
            Err(error_response(e))
        }
    }
}

/// Handler deleting a CRM-native calendar event.
#[axum::debug_handler]
pub async fn delete_event_handler(
    State(state): State<Arc<CalendarState>>,
    Path(event_id): Path<String>,
) -> Result<Json<DeleteResponse>, (StatusCode, String)> {
    match state.orchestrator.delete_local_event(&event_id).await {
        Ok(()) => Ok(Json(DeleteResponse {
            success: true,
            message: "Event deleted successfully.".to_string(),
        })),
        Err(e) => {
            info!("Error deleting local event {}: {}", event_id, e);
            Err(error_response(e))
        }
    }
}
