// --- File: crates/relatify_calendar/src/routes.rs ---

use crate::colors::ColorAssigner;
use crate::handlers::{
    create_event_handler, delete_event_handler, get_day_handler, get_view_handler, CalendarState,
};
use crate::local_store::LocalEventStore;
use crate::orchestrator::SyncOrchestrator;
use axum::{
    routing::{delete, get, post},
    Router,
};
use relatify_common::services::ProviderCalendarApi;
use relatify_config::AppConfig;
use std::sync::Arc;

/// Build the calendar state from config, wiring in the provider gateway
/// when the Outlook feature is enabled and configured.
pub fn build_state(
    config: Arc<AppConfig>,
    provider: Option<Arc<dyn ProviderCalendarApi>>,
) -> Arc<CalendarState> {
    let local = Arc::new(LocalEventStore::new(&config.local_api));
    let colors = ColorAssigner::from_config(config.calendar.as_ref());
    let orchestrator = Arc::new(SyncOrchestrator::new(local, provider, colors));
    Arc::new(CalendarState {
        config,
        orchestrator,
    })
}

/// Creates a router containing all routes for the unified calendar view.
pub fn routes(state: Arc<CalendarState>) -> Router {
    Router::new()
        .route("/calendar/view", get(get_view_handler))
        .route("/calendar/day/{date_key}", get(get_day_handler))
        .route("/calendar/events", post(create_event_handler))
        .route("/calendar/events/{event_id}", delete(delete_event_handler))
        .with_state(state)
}
