// --- File: crates/relatify_calendar/src/colors.rs ---
//! Deterministic owner-to-color assignment.
//!
//! Colors exist so the calendar UI can tell owners apart at a glance; they
//! must survive re-renders unchanged, so the assignment depends only on the
//! order owners are handed in, never on hash-map iteration order.

use relatify_common::services::OwnerId;
use relatify_config::CalendarConfig;
use std::collections::HashMap;

/// Palette walked in order when assigning colors to CRM users.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#58b7b3", "#f6786e", "#8e7cc3", "#76a5af", "#e69138", "#6aa84f", "#c27ba0", "#ffd966",
];

/// Reserved color for provider-sourced events. Never part of the palette
/// rotation, so no CRM user can be confused with the external calendar.
pub const DEFAULT_PROVIDER_COLOR: &str = "#0078d4";

pub struct ColorAssigner {
    palette: Vec<String>,
    provider_color: String,
}

impl Default for ColorAssigner {
    fn default() -> Self {
        Self::new(
            DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            DEFAULT_PROVIDER_COLOR.to_string(),
        )
    }
}

impl ColorAssigner {
    pub fn new(palette: Vec<String>, provider_color: String) -> Self {
        // The reserved color must not be reachable through the rotation,
        // including via the fallback palette.
        let mut palette: Vec<String> =
            palette.into_iter().filter(|c| *c != provider_color).collect();
        if palette.is_empty() {
            palette = DEFAULT_PALETTE
                .iter()
                .filter(|c| **c != provider_color)
                .map(|c| c.to_string())
                .collect();
        }
        Self {
            palette,
            provider_color,
        }
    }

    pub fn from_config(config: Option<&CalendarConfig>) -> Self {
        let palette = config
            .and_then(|c| c.palette.clone())
            .unwrap_or_else(|| DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect());
        let provider_color = config
            .and_then(|c| c.provider_color.clone())
            .unwrap_or_else(|| DEFAULT_PROVIDER_COLOR.to_string());
        Self::new(palette, provider_color)
    }

    /// Assign a color to every owner in the roster.
    ///
    /// The i-th distinct local owner, counted in first-seen order, gets
    /// `palette[i % len]`; the provider sentinel always gets the reserved
    /// color. Same roster order in, same mapping out.
    pub fn assign(&self, owners: &[OwnerId]) -> HashMap<OwnerId, String> {
        let mut mapping: HashMap<OwnerId, String> = HashMap::new();
        let mut next_index = 0usize;

        for owner in owners {
            if mapping.contains_key(owner) {
                continue;
            }
            let color = match owner {
                OwnerId::ProviderSentinel => self.provider_color.clone(),
                OwnerId::Local(_) => {
                    let color = self.palette[next_index % self.palette.len()].clone();
                    next_index += 1;
                    color
                }
            };
            mapping.insert(owner.clone(), color);
        }
        mapping
    }
}
