// --- File: crates/relatify_outlook/src/handlers.rs ---
use crate::auth::ProviderAuthManager;
use crate::error::ProviderError;
use crate::gateway::OutlookEventGateway;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use relatify_common::services::{CalendarEvent, NewProviderEvent, PROVIDER_ID_PREFIX};
use relatify_common::{CivilDate, HttpStatusCode};
use relatify_config::AppConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

// Shared state for the Outlook handlers
#[derive(Clone)]
pub struct OutlookState {
    pub config: Arc<AppConfig>,
    pub auth: Arc<ProviderAuthManager>,
    pub gateway: Arc<OutlookEventGateway>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LinkStatusResponse {
    pub linked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ConnectResponse {
    pub success: bool,
    pub account: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct EventsQuery {
    /// Inclusive window start, YYYY-MM-DD.
    pub start_date: String,
    /// Inclusive window end, YYYY-MM-DD.
    pub end_date: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EventsResponse {
    pub events: Vec<CalendarEvent>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateEventResponse {
    pub success: bool,
    pub event_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SimpleResponse {
    pub success: bool,
    pub message: String,
}

fn error_response(error: ProviderError) -> (StatusCode, String) {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, error.to_string())
}

fn ensure_enabled(state: &OutlookState) -> Result<(), (StatusCode, String)> {
    if !state.config.use_outlook {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "Outlook service is disabled.".to_string(),
        ));
    }
    Ok(())
}

fn parse_window(query: &EventsQuery) -> Result<(CivilDate, CivilDate), (StatusCode, String)> {
    let start = CivilDate::parse(&query.start_date).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid start_date format (YYYY-MM-DD)".to_string(),
        )
    })?;
    let end = CivilDate::parse(&query.end_date).map_err(|_| {
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

/// Handler reporting whether an Outlook account is linked.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/outlook/status", // Path relative to /api
    responses(
        (status = 200, description = "Link status of the Outlook account", body = LinkStatusResponse),
        (status = 503, description = "Outlook service disabled")
    ),
    tag = "Outlook"
))]
pub async fn link_status_handler(
    State(state): State<Arc<OutlookState>>,
) -> Result<Json<LinkStatusResponse>, (StatusCode, String)> {
    ensure_enabled(&state)?;
    let account = state.auth.current_account().await;
    Ok(Json(LinkStatusResponse {
        linked: account.is_some(),
        account,
    }))
}

/// Handler starting the interactive sign-in flow.
///
/// Resolves only once the user finishes (or the device code expires), so the
/// frontend should call it from an explicit "connect calendar" action.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/outlook/connect",
    responses(
        (status = 200, description = "Account linked", body = ConnectResponse),
        (status = 401, description = "Sign-in failed or was abandoned"),
        (status = 403, description = "Administrator consent required")
    ),
    tag = "Outlook"
))]
pub async fn connect_handler(
    State(state): State<Arc<OutlookState>>,
) -> Result<Json<ConnectResponse>, (StatusCode, String)> {
    ensure_enabled(&state)?;
    match state.auth.login().await {
        Ok(account) => Ok(Json(ConnectResponse {
            success: true,
            account,
            message: "Outlook account linked successfully.".to_string(),
        })),
        Err(e) => {
            info!("Outlook sign-in failed: {}", e);
            Err(error_response(e))
        }
    }
}

/// Handler unlinking the Outlook account.
#[axum::debug_handler]
pub async fn disconnect_handler(
    State(state): State<Arc<OutlookState>>,
) -> Result<Json<SimpleResponse>, (StatusCode, String)> {
    ensure_enabled(&state)?;
    state.auth.logout().await;
    Ok(Json(SimpleResponse {
        success: true,
        message: "Outlook account unlinked.".to_string(),
    }))
}

/// Handler listing provider events in a civil-day window.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/outlook/events",
    params(EventsQuery),
    responses(
        (status = 200, description = "Provider events in the window", body = EventsResponse),
        (status = 400, description = "Bad date range"),
        (status = 403, description = "Administrator consent required")
    ),
    tag = "Outlook"
))]
pub async fn list_events_handler(
    State(state): State<Arc<OutlookState>>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventsResponse>, (StatusCode, String)> {
    ensure_enabled(&state)?;
    let (start, end) = parse_window(&query)?;

    match state.gateway.list_events(start, end).await {
        Ok(events) => Ok(Json(EventsResponse { events })),
        Err(e) => {
            info!("Error fetching Outlook events: {}", e);
            Err(error_response(e))
        }
    }
}

/// Handler creating an event on the linked calendar.
#[axum::debug_handler]
pub async fn create_event_handler(
    State(state): State<Arc<OutlookState>>,
    Json(payload): Json<NewProviderEvent>,
) -> Result<Json<CreateEventResponse>, (StatusCode, String)> {
    ensure_enabled(&state)?;

    match state.gateway.create_event(payload).await {
        Ok(event_id) => {
            info!("Created Outlook event {}", event_id);
            Ok(Json(CreateEventResponse {
                success: true,
                event_id,
                message: "Event created successfully.".to_string(),
            }))
        }
        Err(e) => {
            info!("Error creating Outlook event: {}", e);
            Err(error_response(e))
        }
    }
}

/// Handler deleting an event from the linked calendar.
#[axum::debug_handler]
pub async fn delete_event_handler(
    State(state): State<Arc<OutlookState>>,
    Path(event_id): Path<String>,
) -> Result<Json<SimpleResponse>, (StatusCode, String)> {
    ensure_enabled(&state)?;

    // The UI sees prefixed ids; the provider API wants the raw one.
    let provider_id = event_id
        .strip_prefix(PROVIDER_ID_PREFIX)
        .unwrap_or(&event_id);

    match state.gateway.delete_event(provider_id).await {
        Ok(()) => Ok(Json(SimpleResponse {
            success: true,
            message: "Event deleted successfully.".to_string(),
        })),
        Err(e) => {
            info!("Error deleting Outlook event {}: {}", event_id, e);
            Err(error_response(e))
        }
    }
}
