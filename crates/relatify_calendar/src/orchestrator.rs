// --- File: crates/relatify_calendar/src/orchestrator.rs ---
//! The aggregation core.
//!
//! Fans out to the CRM backend and the external provider concurrently,
//! merges per calendar day, and keeps the provider's availability problems
//! away from local data. Local failures propagate; provider list failures
//! degrade to an empty provider subset with a logged warning.

use crate::colors::ColorAssigner;
use relatify_common::services::{
    CalendarEvent, LocalCalendarApi, NewLocalEvent, OwnerId, ProviderCalendarApi,
};
use relatify_common::{CivilDate, RelatifyError};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Per-day view of merged events, keyed by `YYYY-MM-DD`.
pub type DayMap = BTreeMap<String, Vec<CalendarEvent>>;

pub struct SyncOrchestrator {
    local: Arc<dyn LocalCalendarApi>,
    provider: Option<Arc<dyn ProviderCalendarApi>>,
    colors: ColorAssigner,
    // Last fetched window, for the per-day accessor. Two consecutive window
    // fetches need not observe a consistent snapshot.
    window_cache: RwLock<DayMap>,
}

impl SyncOrchestrator {
    pub fn new(
        local: Arc<dyn LocalCalendarApi>,
        provider: Option<Arc<dyn ProviderCalendarApi>>,
        colors: ColorAssigner,
    ) -> Self {
        Self {
            local,
            provider,
            colors,
            window_cache: RwLock::new(BTreeMap::new()),
        }
    }

    /// Fetch and merge all events in the inclusive civil-day window.
    ///
    /// Within each day local events precede provider events, and each
    /// source keeps its upstream order; there is no re-sort by time,
    /// because date-only local events have no time to sort by. Every
    /// returned event carries a color.
    pub async fn get_events_for_window(
        &self,
        start: CivilDate,
        end: CivilDate,
        current_user: &str,
    ) -> Result<DayMap, RelatifyError> {
        let provider_branch = async {
            match &self.provider {
                Some(provider) if provider.is_linked().await => {
                    provider.list_events(start, end).await
                }
                _ => Ok(Vec::new()),
            }
        };

        let (local_result, provider_result) =
            tokio::join!(self.local.list(start, end), provider_branch);

        // Local data is the system of record; its failure is the caller's.
        let local_events = local_result?;
        let provider_events = provider_result.unwrap_or_else(|e| {
            warn!("Provider event fetch failed, showing local events only: {}", e);
            Vec::new()
        });
        debug!(
            "Merging {} local and {} provider events",
            local_events.len(),
            provider_events.len()
        );

        let color_map = self.resolve_colors(current_user, &local_events);

        let mut days: DayMap = BTreeMap::new();
        for mut event in local_events.into_iter().chain(provider_events) {
            if event.color.is_none() {
                event.color = color_map.get(&event.owner).cloned();
            }
            days.entry(event.date.date_key()).or_default().push(event);
        }

        *self.window_cache.write().await = days.clone();
        Ok(days)
    }

    /// Read one day out of the last fetched window.
    pub async fn get_events_for_day(&self, date_key: &str) -> Vec<CalendarEvent> {
        self.window_cache
            .read()
            .await
            .get(date_key)
            .cloned()
            .unwrap_or_default()
    }

    /// Create a local event through the store, invalidating the cached view.
    pub async fn create_local_event(
        &self,
        event: NewLocalEvent,
    ) -> Result<CalendarEvent, RelatifyError> {
        let created = self.local.create(event).await?;
        self.window_cache.write().await.clear();
        Ok(created)
    }

    /// Delete a local event through the store, invalidating the cached view.
    pub async fn delete_local_event(&self, id: &str) -> Result<(), RelatifyError> {
        self.local.delete(id).await?;
        self.window_cache.write().await.clear();
        Ok(())
    }

    /// Build the owner roster and resolve it to colors.
    ///
    /// The requesting user leads the roster so their color stays stable no
    /// matter whose events happen to appear first in a given window; then
    /// the remaining local owners in first-seen order, then the sentinel.
    fn resolve_colors(
        &self,
        current_user: &str,
        local_events: &[CalendarEvent],
    ) -> std::collections::HashMap<OwnerId, String> {
        let mut roster: Vec<OwnerId> = Vec::new();
        if !current_user.is_empty() {
            roster.push(OwnerId::Local(current_user.to_string()));
        }
        for event in local_events {
            if !roster.contains(&event.owner) {
                roster.push(event.owner.clone());
            }
        }
        roster.push(OwnerId::ProviderSentinel);
        self.colors.assign(&roster)
    }
}
