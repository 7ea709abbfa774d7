// --- File: crates/relatify_outlook/src/routes.rs ---

use crate::auth::{DeviceCodeAuth, ProviderAuthManager};
use crate::error::ProviderError;
use crate::gateway::OutlookEventGateway;
use crate::handlers::{
    connect_handler, create_event_handler, delete_event_handler, disconnect_handler,
    link_status_handler, list_events_handler, OutlookState,
};
use axum::{
    routing::{delete, get, post},
    Router,
};
use chrono_tz::Tz;
use relatify_config::AppConfig;
use std::str::FromStr;
use std::sync::Arc;

/// Build the shared Outlook state from config.
///
/// Exposed separately from `routes` because the aggregation feature reuses
/// the same gateway instance; two gateways would mean two sessions.
pub fn build_state(config: Arc<AppConfig>) -> Result<Arc<OutlookState>, ProviderError> {
    let outlook_config = config.outlook.clone().ok_or(ProviderError::Config)?;
    let time_zone = config
        .calendar
        .as_ref()
        .and_then(|c| c.time_zone.as_deref())
        .map(|tz| Tz::from_str(tz).unwrap_or(Tz::UTC))
        .unwrap_or(Tz::UTC);

    let prompt = Arc::new(DeviceCodeAuth::new(outlook_config.clone()));
    let auth = Arc::new(ProviderAuthManager::new(outlook_config.clone(), prompt));
    let gateway = Arc::new(OutlookEventGateway::new(
        outlook_config,
        auth.clone(),
        time_zone,
    ));

    Ok(Arc::new(OutlookState {
        config,
        auth,
        gateway,
    }))
}

/// Creates a router containing all routes for the Outlook feature.
pub fn routes(state: Arc<OutlookState>) -> Router {
    Router::new()
        .route("/outlook/status", get(link_status_handler))
        .route("/outlook/connect", post(connect_handler))
        .route("/outlook/disconnect", post(disconnect_handler))
        .route(
            "/outlook/events",
            get(list_events_handler).post(create_event_handler),
        )
        .route("/outlook/events/{event_id}", delete(delete_event_handler))
        .with_state(state)
}
