// --- File: crates/relatify_common/src/lib.rs ---

// Declare modules within this crate
pub mod civil;     // Civil-date (calendar day) handling
pub mod error;     // Error handling
pub mod features;  // Feature flag handling
pub mod http;      // HTTP utilities
pub mod logging;   // Logging utilities
pub mod services;  // Service abstractions and the unified event model

#[cfg(test)]
mod civil_proptest;
#[cfg(test)]
mod services_test;

// Re-export error types and utilities for easier access
pub use error::{
    auth_error, config_error, external_service_error, internal_error, not_found,
    permission_error, validation_error, HttpStatusCode, RelatifyError,
};

// Re-export HTTP utilities for easier access
pub use http::{
    client::{create_client, HTTP_CLIENT},
    handle_json_result, map_json_error, IntoHttpResponse,
};

// Re-export the civil-date type: it is the merge key of the whole engine.
pub use civil::CivilDate;

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level, log_error, log_result};

// Re-export feature flag handling utilities for easier access
pub use features::is_feature_enabled;

#[cfg(feature = "outlook")]
pub use features::is_outlook_enabled;
