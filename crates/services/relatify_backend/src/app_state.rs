// --- File: crates/services/relatify_backend/src/app_state.rs ---
use relatify_calendar::handlers::CalendarState;
use relatify_calendar::routes as calendar_routes;
use relatify_config::AppConfig;
use std::sync::Arc;
#[cfg(feature = "outlook")]
use tracing::warn;

#[cfg(feature = "outlook")]
use relatify_common::is_outlook_enabled;
#[cfg(feature = "outlook")]
use relatify_common::services::ProviderCalendarApi;
#[cfg(feature = "outlook")]
use relatify_outlook::handlers::OutlookState;
#[cfg(feature = "outlook")]
use relatify_outlook::routes as outlook_routes;

/// Application state shared across all routes.
///
/// The Outlook state is built first so the calendar state can reuse its
/// gateway; the two must share one auth session.
#[derive(Clone)]
pub struct AppState {
    /// Kept as the single source of truth; route state holds its own clone.
    #[allow(dead_code)]
    pub config: Arc<AppConfig>,
    pub calendar_state: Arc<CalendarState>,
    #[cfg(feature = "outlook")]
    pub outlook_state: Option<Arc<OutlookState>>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        #[cfg(feature = "outlook")]
        let outlook_state = if is_outlook_enabled(&config) {
            match outlook_routes::build_state(config.clone()) {
                Ok(state) => Some(state),
                Err(e) => {
                    warn!("Outlook integration disabled, state setup failed: {}", e);
                    None
                }
            }
        } else {
            None
        };

        #[cfg(feature = "outlook")]
        let provider = outlook_state
            .as_ref()
            .map(|s| s.gateway.clone() as Arc<dyn ProviderCalendarApi>);
        #[cfg(not(feature = "outlook"))]
        let provider = None;

        let calendar_state = calendar_routes::build_state(config.clone(), provider);

        Self {
            config,
            calendar_state,
            #[cfg(feature = "outlook")]
            outlook_state,
        }
    }
}
