//! Router integration tests
//!
//! Failover and circuit breaking across registered providers.

#[cfg(test)]
mod tests {
    use crate::common::ScriptedProvider;
    use crate::common::fixtures::chat_request;
    use litellm_ws_gateway::core::types::ProviderSelection;
    use litellm_ws_gateway::utils::error::{CircuitBreakerConfig, CircuitState};
    use litellm_ws_gateway::{GatewayError, ProviderResponse, ProviderRouter};
    use std::sync::Arc;
    use std::time::Duration;

    fn breaker(minimum_volume: u32) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_rate_threshold: 0.5,
            minimum_volume,
            reset_timeout: Duration::from_millis(50),
            rolling_window: Duration::from_secs(60),
        }
    }

    fn router(
        primary: Arc<ScriptedProvider>,
        fallback: Arc<ScriptedProvider>,
        minimum_volume: u32,
    ) -> ProviderRouter {
        let mut router = ProviderRouter::new(Some("main".to_string()), Some("backup".to_string()));
        router.register("main", primary, breaker(minimum_volume)).unwrap();
        router.register("backup", fallback, breaker(minimum_volume)).unwrap();
        router.check_selection().unwrap();
        router
    }

    fn content(response: ProviderResponse) -> String {
        match response {
            ProviderResponse::Complete(response) => response.content,
            ProviderResponse::Stream(_) => panic!("unexpected stream"),
        }
    }

    #[tokio::test]
    async fn test_auto_prefers_primary() {
        let primary = Arc::new(ScriptedProvider::replying("openai", "from main"));
        let fallback = Arc::new(ScriptedProvider::replying("anthropic", "from backup"));
        let router = router(primary.clone(), fallback.clone(), 5);

        let routed = router
            .handle_request(&chat_request("r1", "gpt-4", false))
            .await
            .unwrap();
        assert_eq!(routed.provider, "main");
        assert_eq!(content(routed.response), "from main");
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_auto_fails_over_with_same_request() {
        let primary = Arc::new(ScriptedProvider::failing("openai"));
        let fallback = Arc::new(ScriptedProvider::replying("anthropic", "from backup"));
        let router = router(primary.clone(), fallback.clone(), 5);

        let routed = router
            .handle_request(&chat_request("r1", "gpt-4", false))
            .await
            .unwrap();
        assert_eq!(routed.provider, "backup");
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn test_auto_reports_every_attempt() {
        let router = router(
            Arc::new(ScriptedProvider::failing("openai")),
            Arc::new(ScriptedProvider::failing("anthropic")),
            5,
        );

        let err = router
            .handle_request(&chat_request("r1", "gpt-4", false))
            .await
            .unwrap_err();
        match err {
            GatewayError::AllProvidersUnavailable { attempts } => {
                let names: Vec<_> = attempts.iter().map(|a| a.provider.as_str()).collect();
                assert_eq!(names, vec!["main", "backup"]);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_named_provider_has_no_fallback() {
        let primary = Arc::new(ScriptedProvider::failing("openai"));
        let fallback = Arc::new(ScriptedProvider::replying("anthropic", "unused"));
        let router = router(primary, fallback.clone(), 5);

        let mut request = chat_request("r1", "gpt-4", false);
        request.provider = ProviderSelection::Named("main".to_string());
        let err = router.handle_request(&request).await.unwrap_err();
        assert!(matches!(err, GatewayError::Provider(_)));
        assert_eq!(fallback.calls(), 0);

        request.provider = ProviderSelection::Named("nope".to_string());
        let err = router.handle_request(&request).await.unwrap_err();
        assert_eq!(err.client_code(), "provider_not_found");
    }

    #[tokio::test]
    async fn test_open_breaker_skips_provider_then_recovers() {
        // Two outages open the primary (2/2 > 0.5 at volume 2)
        let primary = Arc::new(ScriptedProvider::failing_times("openai", 2));
        let fallback = Arc::new(ScriptedProvider::replying("anthropic", "from backup"));
        let router = router(primary.clone(), fallback.clone(), 2);

        for id in ["r1", "r2"] {
            let routed = router
                .handle_request(&chat_request(id, "gpt-4", false))
                .await
                .unwrap();
            assert_eq!(routed.provider, "backup");
        }
        let status = router.get_status();
        assert_eq!(status[0].name, "main");
        assert_eq!(status[0].state, CircuitState::Open);

        // Open: the primary is not called at all
        let routed = router
            .handle_request(&chat_request("r3", "gpt-4", false))
            .await
            .unwrap();
        assert_eq!(routed.provider, "backup");
        assert_eq!(primary.calls(), 2);

        // After the reset timeout one trial call goes through and closes the breaker
        tokio::time::sleep(Duration::from_millis(80)).await;
        let routed = router
            .handle_request(&chat_request("r4", "gpt-4", false))
            .await
            .unwrap();
        assert_eq!(routed.provider, "main");
        assert_eq!(router.get_status()[0].state, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let mut router = ProviderRouter::new(None, None);
        router
            .register("main", Arc::new(ScriptedProvider::replying("openai", "x")), breaker(5))
            .unwrap();
        assert!(
            router
                .register("main", Arc::new(ScriptedProvider::replying("openai", "y")), breaker(5))
                .is_err()
        );
        assert_eq!(router.primary_name(), Some("main"));
    }
}
