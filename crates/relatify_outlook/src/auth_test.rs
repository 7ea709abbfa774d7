#[cfg(test)]
mod tests {
    use crate::auth::{AuthSession, InteractiveAuth, ProviderAuthManager, TokenTransport};
    use crate::error::ProviderError;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use relatify_config::OutlookConfig;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn test_config() -> OutlookConfig {
        OutlookConfig {
            client_id: "client-123".to_string(),
            tenant: "common".to_string(),
            scopes: vec![
                "Calendars.ReadWrite".to_string(),
                "offline_access".to_string(),
            ],
            authority: "https://login.microsoftonline.com".to_string(),
            graph_base_url: "https://graph.microsoft.com/v1.0".to_string(),
        }
    }

    fn fresh_session(account: &str) -> AuthSession {
        AuthSession {
            account_id: account.to_string(),
            access_token: format!("token-for-{account}"),
            expires_at: Utc::now() + Duration::hours(1),
            refresh_token: None,
        }
    }

    fn stale_session(account: &str) -> AuthSession {
        AuthSession {
            account_id: account.to_string(),
            access_token: "stale-token".to_string(),
            expires_at: Utc::now() - Duration::minutes(5),
            refresh_token: None,
        }
    }

    fn stale_session_with_refresh(account: &str, refresh_token: &str) -> AuthSession {
        AuthSession {
            refresh_token: Some(refresh_token.to_string()),
            ..stale_session(account)
        }
    }

    /// Scripted interactive flow: pops one pre-seeded outcome per call and
    /// counts how often a human would have been bothered.
    struct FakePrompt {
        outcomes: Mutex<VecDeque<Result<AuthSession, ProviderError>>>,
        calls: AtomicUsize,
    }

    impl FakePrompt {
        fn with(outcomes: Vec<Result<AuthSession, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InteractiveAuth for FakePrompt {
        async fn authenticate(&self, _scopes: &[String]) -> Result<AuthSession, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcomes
                .lock()
                .await
                .pop_front()
                .expect("unexpected interactive sign-in")
        }
    }

    /// Scripted token endpoint: pops one response per POST and records the
    /// submitted form bodies for inspection.
    struct FakeTransport {
        responses: Mutex<VecDeque<Result<(u16, String), ProviderError>>>,
        requests: Mutex<Vec<(String, String)>>,
    }

    impl FakeTransport {
        fn with(responses: Vec<Result<(u16, String), ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        async fn request_bodies(&self) -> Vec<String> {
            self.requests
                .lock()
                .await
                .iter()
                .map(|(_, body)| body.clone())
                .collect()
        }
    }

    #[async_trait]
    impl TokenTransport for FakeTransport {
        async fn post_form(
            &self,
            url: &str,
            body: String,
        ) -> Result<(u16, String), ProviderError> {
            self.requests.lock().await.push((url.to_string(), body));
            self.responses
                .lock()
                .await
                .pop_front()
                .expect("unexpected token endpoint request")
        }
    }

    fn token_json(access: &str, refresh: Option<&str>, expires_in: i64) -> (u16, String) {
        let mut body = serde_json::json!({
            "access_token": access,
            "expires_in": expires_in,
        });
        if let Some(refresh) = refresh {
            body["refresh_token"] = serde_json::json!(refresh);
        }
        (200, body.to_string())
    }

    fn token_error_json(status: u16, error: &str, description: &str) -> (u16, String) {
        let body = serde_json::json!({
            "error": error,
            "error_description": description,
        });
        (status, body.to_string())
    }

    #[tokio::test]
    async fn test_fresh_cached_token_skips_interactive_flow() {
        let prompt = FakePrompt::with(vec![]);
        let manager = ProviderAuthManager::new(test_config(), prompt.clone());
        manager.restore_session(fresh_session("dana@example.com")).await;

        let token = manager
            .get_access_token(&test_config().scopes)
            .await
            .unwrap();
        assert_eq!(token, "token-for-dana@example.com");
        assert_eq!(prompt.call_count(), 0);
    }

    #[tokio::test]
    async fn test_expired_token_without_refresh_goes_interactive() {
        let prompt = FakePrompt::with(vec![Ok(fresh_session("dana@example.com"))]);
        let manager = ProviderAuthManager::new(test_config(), prompt.clone());
        manager.restore_session(stale_session("dana@example.com")).await;

        let token = manager
            .get_access_token(&test_config().scopes)
            .await
            .unwrap();
        assert_eq!(token, "token-for-dana@example.com");
        assert_eq!(prompt.call_count(), 1);
    }

    #[tokio::test]
    async fn test_no_session_triggers_exactly_one_interactive_attempt() {
        let prompt = FakePrompt::with(vec![Ok(fresh_session("dana@example.com"))]);
        let manager = ProviderAuthManager::new(test_config(), prompt.clone());

        manager
            .get_access_token(&test_config().scopes)
            .await
            .unwrap();
        // The session is now cached; the second call must not go interactive.
        manager
            .get_access_token(&test_config().scopes)
            .await
            .unwrap();
        assert_eq!(prompt.call_count(), 1);
    }

    #[tokio::test]
    async fn test_interactive_failure_clears_the_session() {
        let prompt = FakePrompt::with(vec![Err(ProviderError::Authentication(
            "user closed the browser".to_string(),
        ))]);
        let manager = ProviderAuthManager::new(test_config(), prompt.clone());
        manager.restore_session(stale_session("dana@example.com")).await;

        let error = manager
            .get_access_token(&test_config().scopes)
            .await
            .unwrap_err();
        match error {
            ProviderError::Authentication(msg) => {
                assert!(msg.contains("both failed"), "got: {msg}");
            }
            other => panic!("expected Authentication, got {other:?}"),
        }
        assert!(!manager.has_linked_account().await);
    }

    #[tokio::test]
    async fn test_admin_consent_failure_surfaces_unwrapped() {
        let prompt = FakePrompt::with(vec![Err(ProviderError::AdminConsentRequired(
            "AADSTS65001: consent required".to_string(),
        ))]);
        let manager = ProviderAuthManager::new(test_config(), prompt.clone());

        let error = manager
            .get_access_token(&test_config().scopes)
            .await
            .unwrap_err();
        assert!(matches!(error, ProviderError::AdminConsentRequired(_)));
    }

    #[tokio::test]
    async fn test_login_replaces_the_current_account() {
        let prompt = FakePrompt::with(vec![Ok(fresh_session("second@example.com"))]);
        let manager = ProviderAuthManager::new(test_config(), prompt.clone());
        manager.restore_session(fresh_session("first@example.com")).await;

        let account = manager.login().await.unwrap();
        assert_eq!(account, "second@example.com");
        assert_eq!(
            manager.current_account().await.as_deref(),
            Some("second@example.com")
        );
    }

    #[tokio::test]
    async fn test_logout_unlinks_the_account() {
        let prompt = FakePrompt::with(vec![]);
        let manager = ProviderAuthManager::new(test_config(), prompt);
        manager.restore_session(fresh_session("dana@example.com")).await;
        assert!(manager.has_linked_account().await);

        manager.logout().await;
        assert!(!manager.has_linked_account().await);
        assert_eq!(manager.current_account().await, None);
    }

    #[tokio::test]
    async fn test_silent_refresh_renews_without_interactive_signin() {
        let prompt = FakePrompt::with(vec![]);
        let transport = FakeTransport::with(vec![Ok(token_json("renewed-token", None, 3600))]);
        let manager =
            ProviderAuthManager::with_transport(test_config(), prompt.clone(), transport.clone());
        manager
            .restore_session(stale_session_with_refresh("dana@example.com", "refresh-1"))
            .await;

        let token = manager
            .get_access_token(&test_config().scopes)
            .await
            .unwrap();
        assert_eq!(token, "renewed-token");
        assert_eq!(prompt.call_count(), 0);

        let bodies = transport.request_bodies().await;
        assert_eq!(bodies.len(), 1);
        assert!(bodies[0].contains("grant_type=refresh_token"), "got: {}", bodies[0]);
        assert!(bodies[0].contains("refresh_token=refresh-1"), "got: {}", bodies[0]);
    }

    #[tokio::test]
    async fn test_refresh_token_rotation_carries_into_the_next_grant() {
        let prompt = FakePrompt::with(vec![]);
        // expires_in of 0 leaves each renewed token immediately stale, so
        // every call below exercises the silent path again.
        let transport = FakeTransport::with(vec![
            Ok(token_json("token-1", None, 0)),
            Ok(token_json("token-2", Some("refresh-2"), 0)),
            Ok(token_json("token-3", None, 3600)),
        ]);
        let manager =
            ProviderAuthManager::with_transport(test_config(), prompt.clone(), transport.clone());
        manager
            .restore_session(stale_session_with_refresh("dana@example.com", "refresh-1"))
            .await;

        for _ in 0..3 {
            manager
                .get_access_token(&test_config().scopes)
                .await
                .unwrap();
        }

        let bodies = transport.request_bodies().await;
        assert_eq!(bodies.len(), 3);
        // No rotation in the first response: the second grant reuses the
        // original refresh token.
        assert!(bodies[1].contains("refresh_token=refresh-1"), "got: {}", bodies[1]);
        // The second response rotated it: the third grant uses the new one.
        assert!(bodies[2].contains("refresh_token=refresh-2"), "got: {}", bodies[2]);
        assert_eq!(prompt.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_refresh_falls_back_to_interactive() {
        let prompt = FakePrompt::with(vec![Ok(fresh_session("dana@example.com"))]);
        let transport = FakeTransport::with(vec![Ok(token_error_json(
            400,
            "invalid_grant",
            "refresh token expired",
        ))]);
        let manager =
            ProviderAuthManager::with_transport(test_config(), prompt.clone(), transport);
        manager
            .restore_session(stale_session_with_refresh("dana@example.com", "refresh-1"))
            .await;

        let token = manager
            .get_access_token(&test_config().scopes)
            .await
            .unwrap();
        assert_eq!(token, "token-for-dana@example.com");
        assert_eq!(prompt.call_count(), 1);
    }

    #[tokio::test]
    async fn test_consent_failure_during_refresh_skips_interactive() {
        let prompt = FakePrompt::with(vec![]);
        let transport = FakeTransport::with(vec![Ok(token_error_json(
            403,
            "consent_required",
            "AADSTS65001: the user or administrator has not consented",
        ))]);
        let manager =
            ProviderAuthManager::with_transport(test_config(), prompt.clone(), transport);
        manager
            .restore_session(stale_session_with_refresh("dana@example.com", "refresh-1"))
            .await;

        let error = manager
            .get_access_token(&test_config().scopes)
            .await
            .unwrap_err();
        assert!(matches!(error, ProviderError::AdminConsentRequired(_)));
        // Retrying interactively cannot grant tenant-level consent.
        assert_eq!(prompt.call_count(), 0);
    }

    #[test]
    fn test_token_expiring_within_the_skew_counts_as_stale() {
        let session = AuthSession {
            account_id: "dana@example.com".to_string(),
            access_token: "about-to-expire".to_string(),
            expires_at: Utc::now() + Duration::seconds(30),
            refresh_token: None,
        };
        assert!(!session.is_fresh());
        assert!(fresh_session("dana@example.com").is_fresh());
    }
}
