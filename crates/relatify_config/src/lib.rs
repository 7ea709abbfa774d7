// --- File: crates/relatify_config/src/lib.rs ---
pub mod models;

pub use models::{AppConfig, CalendarConfig, LocalApiConfig, OutlookConfig, ServerConfig};

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;

static DOTENV_LOADED: OnceCell<()> = OnceCell::new();

/// Load `.env` once per process so repeated config loads stay cheap.
pub fn ensure_dotenv_loaded() {
    DOTENV_LOADED.get_or_init(|| {
        dotenv::dotenv().ok();
    });
}

/// Loads the unified application configuration.
///
/// Sources, later ones overriding earlier ones:
/// 1. `config/default.toml` (optional)
/// 2. `config/{RUN_ENV}.toml` (optional, RUN_ENV defaults to "development")
/// 3. Environment variables prefixed with `APP`, `__` as section separator
///    (e.g. `APP_SERVER__PORT=8086`, `APP_USE_OUTLOOK=true`).
///
/// Secrets (`OUTLOOK_CLIENT_SECRET`) are read from the environment by the
/// crates that need them and never live in the config file.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".to_string());

    let config = Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8086)?
        .set_default("local_api.base_url", "http://127.0.0.1:8000/api")?
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_env}")).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_in_server_and_local_api() {
        let config = load_config().expect("default config should load");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8086);
        assert!(!config.use_outlook);
        assert!(config.local_api.base_url.starts_with("http://"));
    }

    #[test]
    fn outlook_config_builds_tenant_urls() {
        let outlook = OutlookConfig {
            client_id: "client-123".to_string(),
            tenant: "contoso.onmicrosoft.com".to_string(),
            scopes: vec!["Calendars.ReadWrite".to_string()],
            authority: "https://login.microsoftonline.com".to_string(),
            graph_base_url: "https://graph.microsoft.com/v1.0".to_string(),
        };
        assert_eq!(
            outlook.token_url(),
            "https://login.microsoftonline.com/contoso.onmicrosoft.com/oauth2/v2.0/token"
        );
        assert_eq!(
            outlook.device_code_url(),
            "https://login.microsoftonline.com/contoso.onmicrosoft.com/oauth2/v2.0/devicecode"
        );
    }
}
