// --- File: crates/relatify_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Local CRM API Config ---
// Where the CRM backend's own calendar-event endpoints live. This is the
// system of record for local events.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LocalApiConfig {
    pub base_url: String, // e.g. http://127.0.0.1:8000/api
}

// --- Outlook Provider Config ---
// Holds non-secret provider config. Secrets loaded directly from env vars.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OutlookConfig {
    pub client_id: String, // Mandatory
    #[serde(default = "default_tenant")]
    pub tenant: String, // "common" unless the app is single-tenant
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_authority")]
    pub authority: String, // OAuth authority base, without the tenant segment
    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,
    // Secrets loaded directly from env vars:
    // OUTLOOK_CLIENT_SECRET (confidential-client deployments only)
}

fn default_tenant() -> String {
    "common".to_string()
}

fn default_scopes() -> Vec<String> {
    vec![
        "Calendars.ReadWrite".to_string(),
        "offline_access".to_string(),
    ]
}

fn default_authority() -> String {
    "https://login.microsoftonline.com".to_string()
}

fn default_graph_base_url() -> String {
    "https://graph.microsoft.com/v1.0".to_string()
}

impl OutlookConfig {
    /// Token endpoint for this tenant.
    pub fn token_url(&self) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.authority, self.tenant)
    }

    /// Device-code endpoint for this tenant.
    pub fn device_code_url(&self) -> String {
        format!("{}/{}/oauth2/v2.0/devicecode", self.authority, self.tenant)
    }
}

// --- Calendar Display Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CalendarConfig {
    /// Ordered palette walked when assigning owner colors.
    pub palette: Option<Vec<String>>,
    /// Reserved color for provider-sourced events, never drawn from the palette.
    pub provider_color: Option<String>,
    /// IANA time zone used when expanding calendar days into query windows.
    pub time_zone: Option<String>,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_outlook: bool,

    // Local CRM API is mandatory: local events must always render.
    pub local_api: LocalApiConfig,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub outlook: Option<OutlookConfig>,
    #[serde(default)]
    pub calendar: Option<CalendarConfig>,
}
