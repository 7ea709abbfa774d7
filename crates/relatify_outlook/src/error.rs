// --- File: crates/relatify_outlook/src/error.rs ---
use relatify_common::{
    auth_error, external_service_error, permission_error, HttpStatusCode, RelatifyError,
};
use thiserror::Error;

/// Outlook-specific error types.
///
/// The taxonomy matters to callers: authentication failures clear the
/// session, consent failures must reach the user verbatim (retrying them is
/// pointless without an administrator), transient failures are the only
/// category the read path is allowed to degrade on.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Silent and interactive sign-in both failed; the session was cleared.
    #[error("Outlook authentication failed: {0}")]
    Authentication(String),

    /// The tenant requires administrator consent for the requested scopes.
    #[error("Administrator consent required for the Outlook integration: {0}")]
    AdminConsentRequired(String),

    /// Network trouble, rate limiting or a provider-side outage.
    #[error("Transient Outlook failure: {0}")]
    Transient(String),

    /// Malformed event input, rejected before any network call.
    #[error("Invalid event data: {0}")]
    Validation(String),

    /// A date or time in a provider response could not be parsed.
    #[error("Failed to parse provider time: {0}")]
    TimeParse(String),

    /// Error occurred during an HTTP request to the provider
    #[error("Outlook API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Error parsing an Outlook API response
    #[error("Failed to parse Outlook API response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Error returned by the Outlook API
    #[error("Outlook API returned an error: {message} (Status: {status})")]
    Api { status: u16, message: String },

    /// Missing or incomplete Outlook configuration
    #[error("Outlook configuration missing or incomplete")]
    Config,
}

/// Sort a failed provider response into the taxonomy.
///
/// AADSTS65001 is the directory's "user or admin has not consented" code;
/// `Authorization_RequestDenied` is Graph's scope-denial code. Both mean an
/// administrator has to act, so neither is worth an automatic retry.
pub fn classify_api_failure(status: u16, body: &str) -> ProviderError {
    let consent_denied = body.contains("AADSTS65001")
        || body.contains("consent_required")
        || body.contains("Authorization_RequestDenied");

    if consent_denied || status == 403 {
        return ProviderError::AdminConsentRequired(truncate(body));
    }
    match status {
        401 => ProviderError::Authentication(truncate(body)),
        429 => ProviderError::Transient(format!("rate limited: {}", truncate(body))),
        s if s >= 500 => ProviderError::Transient(format!("status {}: {}", s, truncate(body))),
        s => ProviderError::Api {
            status: s,
            message: truncate(body),
        },
    }
}

// Error bodies can be multi-kilobyte JSON blobs; keep logs and messages sane.
fn truncate(body: &str) -> String {
    const MAX: usize = 300;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &body[..end])
    }
}

/// Convert ProviderError to RelatifyError
impl From<ProviderError> for RelatifyError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Authentication(msg) => auth_error(format!("Outlook: {}", msg)),
            ProviderError::AdminConsentRequired(msg) => permission_error(format!(
                "Administrator consent required for the Outlook integration: {}",
                msg
            )),
            ProviderError::Transient(msg) => external_service_error("Outlook", msg),
            ProviderError::Validation(msg) => RelatifyError::ValidationError(msg),
            ProviderError::TimeParse(msg) => RelatifyError::ParseError(msg),
            ProviderError::Request(e) => {
                RelatifyError::HttpError(format!("Outlook request error: {}", e))
            }
            ProviderError::Parse(e) => {
                RelatifyError::ParseError(format!("Outlook response parse error: {}", e))
            }
            ProviderError::Api { status, message } => external_service_error(
                "Outlook API",
                format!("Status: {}, Message: {}", status, message),
            ),
            ProviderError::Config => {
                RelatifyError::ConfigError("Outlook configuration missing or incomplete".to_string())
            }
        }
    }
}

/// Implement HttpStatusCode for ProviderError to provide a consistent way to
/// convert ProviderError to HTTP status codes.
impl HttpStatusCode for ProviderError {
    fn status_code(&self) -> u16 {
        match self {
            ProviderError::Authentication(_) => 401,
            ProviderError::AdminConsentRequired(_) => 403,
            ProviderError::Transient(_) => 502,
            ProviderError::Validation(_) => 400,
            ProviderError::TimeParse(_) => 502,
            ProviderError::Request(_) => 500,
            ProviderError::Parse(_) => 502,
            ProviderError::Api { status, .. } => *status,
            ProviderError::Config => 500,
        }
    }
}
