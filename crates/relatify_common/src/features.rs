//! Feature flag handling for the Relatify application.
//!
//! Feature flags are used in two ways:
//!
//! 1. Compile-time feature flags using `#[cfg(feature = "...")]`
//! 2. Runtime feature flags using configuration values
//!
//! This module provides helper functions for checking if features are enabled
//! at runtime based on configuration values.
//!
//! ## Available Features
//!
//! - `openapi`: Enables OpenAPI documentation generation
//! - `outlook`: Enables the external Outlook calendar integration

use relatify_config::AppConfig;
use std::sync::Arc;

/// Check if a feature is enabled at runtime based on configuration.
///
/// A feature counts as enabled when its runtime flag is set *and* its
/// configuration section is present.
pub fn is_feature_enabled<T>(
    _config: &Arc<AppConfig>,
    use_feature: bool,
    feature_config: Option<&T>,
) -> bool {
    use_feature && feature_config.is_some()
}

/// Check if the Outlook calendar integration is enabled at runtime.
#[cfg(feature = "outlook")]
pub fn is_outlook_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config, config.use_outlook, config.outlook.as_ref())
}
