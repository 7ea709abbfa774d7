// --- File: crates/relatify_outlook/src/auth.rs ---
//! Token lifecycle for the Outlook integration.
//!
//! The manager owns at most one signed-in account per process. Every gateway
//! call asks it for a token; it answers from cache, then by a silent refresh
//! grant, and only then by the interactive flow (which blocks on a human).
//! Consent failures are surfaced immediately: a tenant that requires
//! administrator consent will not be fixed by retrying.

use crate::error::{classify_api_failure, ProviderError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use relatify_config::OutlookConfig;
use relatify_common::HTTP_CLIENT;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Seconds of validity a cached token must retain to be handed out without
/// a refresh; covers clock skew and request latency.
const EXPIRY_SKEW_SECS: i64 = 60;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A provider account handle plus its cached tokens.
///
/// Created on first sign-in, refreshed silently before gateway calls,
/// discarded on logout or irrecoverable auth failure. Always passed around
/// explicitly; there is no module-level singleton to defeat test injection.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub account_id: String,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub refresh_token: Option<String>,
}

impl AuthSession {
    /// Whether the cached access token can still be used as-is.
    pub fn is_fresh(&self) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_SKEW_SECS) > Utc::now()
    }
}

/// The interactive half of the token lifecycle.
///
/// Production uses the OAuth device-code flow below; tests inject a fake so
/// no human (and no network) is involved.
#[async_trait]
pub trait InteractiveAuth: Send + Sync {
    async fn authenticate(&self, scopes: &[String]) -> Result<AuthSession, ProviderError>;
}

/// The wire half of the silent token grant.
///
/// Returns the raw status and body of a token-endpoint POST so the grant
/// classification stays in one place; tests script responses the way they
/// script [`InteractiveAuth`].
#[async_trait]
pub trait TokenTransport: Send + Sync {
    async fn post_form(&self, url: &str, body: String) -> Result<(u16, String), ProviderError>;
}

pub struct HttpTokenTransport {
    http: Client,
}

impl HttpTokenTransport {
    pub fn new() -> Self {
        Self {
            http: HTTP_CLIENT.clone(),
        }
    }
}

impl Default for HttpTokenTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenTransport for HttpTokenTransport {
    async fn post_form(&self, url: &str, body: String) -> Result<(u16, String), ProviderError> {
        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        Ok((status, text))
    }
}

// --- Token endpoint wire types ---

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    expires_in: i64,
    interval: u64,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    client_id: &'a str,
    grant_type: &'static str,
    refresh_token: &'a str,
    scope: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<String>,
}

#[derive(Serialize)]
struct DeviceCodeRequest<'a> {
    client_id: &'a str,
    scope: String,
}

#[derive(Serialize)]
struct DeviceCodeGrant<'a> {
    client_id: &'a str,
    grant_type: &'static str,
    device_code: &'a str,
}

fn classify_token_failure(status: u16, error: &TokenErrorResponse) -> ProviderError {
    let description = error.error_description.as_deref().unwrap_or_default();
    if description.contains("AADSTS65001") || error.error == "consent_required" {
        return ProviderError::AdminConsentRequired(description.to_string());
    }
    match error.error.as_str() {
        "invalid_grant" | "interaction_required" => ProviderError::Authentication(format!(
            "{}: {}",
            error.error, description
        )),
        "temporarily_unavailable" => ProviderError::Transient(description.to_string()),
        _ => classify_api_failure(status, description),
    }
}

fn parse_token_body(status: u16, body: &str) -> Result<TokenResponse, ProviderError> {
    if status >= 400 {
        if let Ok(error) = serde_json::from_str::<TokenErrorResponse>(body) {
            return Err(classify_token_failure(status, &error));
        }
        return Err(classify_api_failure(status, body));
    }
    Ok(serde_json::from_str(body)?)
}

fn urlencode<T: Serialize>(form: &T) -> Result<String, ProviderError> {
    serde_urlencoded::to_string(form)
        .map_err(|e| ProviderError::Validation(format!("failed to encode token request: {e}")))
}

// --- Interactive device-code flow ---

/// Drives the OAuth 2.0 device-code flow against the tenant authority.
/// "Blocking" in the interactive-login sense: the await resolves only once
/// the user has entered the code in a browser, but the runtime keeps
/// serving other work meanwhile.
pub struct DeviceCodeAuth {
    http: Client,
    config: OutlookConfig,
}

impl DeviceCodeAuth {
    pub fn new(config: OutlookConfig) -> Self {
        Self {
            http: HTTP_CLIENT.clone(),
            config,
        }
    }

    async fn resolve_account_id(&self, access_token: &str) -> Result<String, ProviderError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct MeResponse {
            id: String,
            user_principal_name: Option<String>,
        }

        let response = self
            .http
            .get(format!("{}/me", self.config.graph_base_url))
            .bearer_auth(access_token)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        if status >= 400 {
            return Err(classify_api_failure(status, &body));
        }
        let me: MeResponse = serde_json::from_str(&body)?;
        Ok(me.user_principal_name.unwrap_or(me.id))
    }
}

#[async_trait]
impl InteractiveAuth for DeviceCodeAuth {
    async fn authenticate(&self, scopes: &[String]) -> Result<AuthSession, ProviderError> {
        let request = DeviceCodeRequest {
            client_id: &self.config.client_id,
            scope: scopes.join(" "),
        };
        let response = self
            .http
            .post(self.config.device_code_url())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(urlencode(&request)?)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        if status >= 400 {
            return Err(classify_api_failure(status, &body));
        }
        let device: DeviceCodeResponse = serde_json::from_str(&body)?;

        info!(
            "To link your Outlook calendar, visit {} and enter the code {}",
            device.verification_uri, device.user_code
        );

        let deadline = Utc::now() + Duration::seconds(device.expires_in);
        let mut interval = device.interval.max(1);

        while Utc::now() < deadline {
            tokio::time::sleep(std::time::Duration::from_secs(interval)).await;

            let grant = DeviceCodeGrant {
                client_id: &self.config.client_id,
                grant_type: "urn:ietf:params:oauth:grant-type:device_code",
                device_code: &device.device_code,
            };
            let response = self
                .http
                .post(self.config.token_url())
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(urlencode(&grant)?)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await?;

            if status < 400 {
                let token: TokenResponse = serde_json::from_str(&body)?;
                let account_id = self.resolve_account_id(&token.access_token).await?;
                return Ok(AuthSession {
                    account_id,
                    expires_at: Utc::now() + Duration::seconds(token.expires_in),
                    access_token: token.access_token,
                    refresh_token: token.refresh_token,
                });
            }

            let error: TokenErrorResponse = serde_json::from_str(&body)?;
            match error.error.as_str() {
                "authorization_pending" => continue,
                "slow_down" => interval += 5,
                _ => return Err(classify_token_failure(status, &error)),
            }
        }

        Err(ProviderError::Authentication(
            "device code expired before the user completed sign-in".to_string(),
        ))
    }
}

// --- The auth manager ---

/// Owns the one provider session for this process.
///
/// Signing in again replaces the session wholesale; there is never a partial
/// overwrite, and the lock is held across the whole acquisition so two
/// concurrent fetches cannot race each other into duplicate logins.
pub struct ProviderAuthManager {
    config: OutlookConfig,
    prompt: Arc<dyn InteractiveAuth>,
    transport: Arc<dyn TokenTransport>,
    session: Mutex<Option<AuthSession>>,
}

impl ProviderAuthManager {
    pub fn new(config: OutlookConfig, prompt: Arc<dyn InteractiveAuth>) -> Self {
        Self::with_transport(config, prompt, Arc::new(HttpTokenTransport::new()))
    }

    pub fn with_transport(
        config: OutlookConfig,
        prompt: Arc<dyn InteractiveAuth>,
        transport: Arc<dyn TokenTransport>,
    ) -> Self {
        Self {
            config,
            prompt,
            transport,
            session: Mutex::new(None),
        }
    }

    /// Seed a session restored from persistent storage (or a test fixture).
    pub async fn restore_session(&self, session: AuthSession) {
        *self.session.lock().await = Some(session);
    }

    pub async fn has_linked_account(&self) -> bool {
        self.session.lock().await.is_some()
    }

    pub async fn current_account(&self) -> Option<String> {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|s| s.account_id.clone())
    }

    /// Force the interactive flow; used for first-time connection.
    /// Returns the signed-in account id.
    pub async fn login(&self) -> Result<String, ProviderError> {
        let fresh = self.prompt.authenticate(&self.config.scopes).await?;
        let account_id = fresh.account_id.clone();
        *self.session.lock().await = Some(fresh);
        info!("Outlook account linked: {}", account_id);
        Ok(account_id)
    }

    /// Discard the session; the next token request goes interactive again.
    pub async fn logout(&self) {
        *self.session.lock().await = None;
    }

    /// Get an access token for the given scopes.
    ///
    /// Order of attempts: cached token, silent refresh, interactive flow
    /// (once). Consent failures short-circuit out of the chain; looping on
    /// a tenant that wants admin consent only spams the directory logs.
    pub async fn get_access_token(&self, scopes: &[String]) -> Result<String, ProviderError> {
        let mut session = self.session.lock().await;

        if let Some(current) = session.as_ref() {
            if current.is_fresh() {
                return Ok(current.access_token.clone());
            }
        }

        if let Some(current) = session.clone() {
            if let Some(refresh_token) = current.refresh_token.as_deref() {
                match self.refresh_silently(&current, refresh_token, scopes).await {
                    Ok(renewed) => {
                        let token = renewed.access_token.clone();
                        *session = Some(renewed);
                        return Ok(token);
                    }
                    Err(e @ ProviderError::AdminConsentRequired(_)) => return Err(e),
                    Err(e) => {
                        warn!(
                            "Silent token refresh failed, falling back to interactive sign-in: {}",
                            e
                        );
                    }
                }
            }
        }

        match self.prompt.authenticate(scopes).await {
            Ok(fresh) => {
                let token = fresh.access_token.clone();
                *session = Some(fresh);
                Ok(token)
            }
            Err(e @ ProviderError::AdminConsentRequired(_)) => Err(e),
            Err(e) => {
                // Irrecoverable: clear the account so the next call starts
                // from a clean interactive login.
                *session = None;
                Err(ProviderError::Authentication(format!(
                    "silent and interactive sign-in both failed: {e}"
                )))
            }
        }
    }

    async fn refresh_silently(
        &self,
        current: &AuthSession,
        refresh_token: &str,
        scopes: &[String],
    ) -> Result<AuthSession, ProviderError> {
        let grant = RefreshGrant {
            client_id: &self.config.client_id,
            grant_type: "refresh_token",
            refresh_token,
            scope: scopes.join(" "),
            client_secret: std::env::var("OUTLOOK_CLIENT_SECRET").ok(),
        };
        let (status, body) = self
            .transport
            .post_form(&self.config.token_url(), urlencode(&grant)?)
            .await?;
        let token = parse_token_body(status, &body)?;

        Ok(AuthSession {
            account_id: current.account_id.clone(),
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
            access_token: token.access_token,
            // The endpoint may rotate the refresh token; keep the old one
            // if it did not.
            refresh_token: token
                .refresh_token
                .or_else(|| current.refresh_token.clone()),
        })
    }
}
