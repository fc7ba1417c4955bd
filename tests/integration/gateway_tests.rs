//! End-to-end pipeline tests
//!
//! A connection is authenticated with a signed token, registered with the connection manager,
//! and fed raw client frames. Providers, ledger and transport are in-process fakes.

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{TEST_SECRET, chat_frame, token, token_with_id};
    use crate::common::{FakeLedger, RecordingTransport, ScriptedProvider};
    use actix_web::http::StatusCode;
    use actix_web::{test, web};
    use litellm_ws_gateway::auth::{ConnectionAuthenticator, InMemoryRevocationList, JwtVerifier};
    use litellm_ws_gateway::config::{AuthConfig, Config, CreditConfig};
    use litellm_ws_gateway::core::audit::{UsageRecord, UsageSink};
    use litellm_ws_gateway::core::credits::{CreditEstimator, CreditService, InMemoryDeadLetters};
    use litellm_ws_gateway::server::AppState;
    use litellm_ws_gateway::utils::error::CircuitBreakerConfig;
    use litellm_ws_gateway::{HttpServer, ProviderRouter, ServerMessage};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct CollectingSink {
        records: Mutex<Vec<UsageRecord>>,
    }

    impl UsageSink for CollectingSink {
        fn record(&self, record: UsageRecord) {
            self.records.lock().push(record);
        }
    }

    struct Harness {
        state: AppState,
        ledger: Arc<FakeLedger>,
        audit: Arc<CollectingSink>,
    }

    fn harness(primary: ScriptedProvider, balance: f64) -> Harness {
        let mut config = Config::default();
        config.gateway.auth = AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
            ..Default::default()
        };

        let authenticator = ConnectionAuthenticator::new(
            JwtVerifier::new(&config.gateway.auth),
            Arc::new(InMemoryRevocationList::new(["stolen"])),
        );

        let mut router = ProviderRouter::new(Some("main".to_string()), Some("backup".to_string()));
        router
            .register("main", Arc::new(primary), CircuitBreakerConfig::default())
            .unwrap();
        router
            .register(
                "backup",
                Arc::new(ScriptedProvider::replying("anthropic", "backup says hi")),
                CircuitBreakerConfig::default(),
            )
            .unwrap();

        let ledger = Arc::new(FakeLedger::with_balance("dev-1", balance));
        let credits = CreditService::new(
            CreditEstimator::from_config(&CreditConfig::default()),
            Some(ledger.clone()),
            Arc::new(InMemoryDeadLetters::new(10)),
        );

        let audit = Arc::new(CollectingSink::default());
        let state = AppState::new(config, authenticator, router, credits, audit.clone()).unwrap();
        Harness {
            state,
            ledger,
            audit,
        }
    }

    impl Harness {
        async fn connect(
            &self,
            token: &str,
        ) -> litellm_ws_gateway::Result<(
            Arc<litellm_ws_gateway::server::Connection>,
            Arc<RecordingTransport>,
        )> {
            let user = self.state.authenticator.authenticate(token).await?;
            let transport = Arc::new(RecordingTransport::default());
            let connection = self.state.connections.create(transport.clone(), user);
            Ok((connection, transport))
        }

        async fn send(&self, connection: &Arc<litellm_ws_gateway::server::Connection>, frame: &str) {
            if let Some(task) = self.state.sessions.handle_text(connection, frame).await {
                task.await.unwrap();
            }
        }
    }

    fn terminals<'a>(messages: &'a [ServerMessage], id: &str) -> Vec<&'a ServerMessage> {
        messages
            .iter()
            .filter(|m| m.id() == id && m.is_terminal())
            .collect()
    }

    // ==================== Pipeline Tests ====================

    #[tokio::test]
    async fn test_streamed_request_end_to_end() {
        let h = harness(ScriptedProvider::replying("openai", "Hello from the gateway"), 100.0);
        let (connection, transport) = h.connect(&token("dev-1", "developer")).await.unwrap();

        h.send(&connection, &chat_frame("s1", "gpt-4", true)).await;

        let messages = transport.messages();
        let content: String = messages
            .iter()
            .filter_map(|m| match m {
                ServerMessage::Chunk { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(content, "Hello from the gateway");

        let done = terminals(&messages, "s1");
        assert_eq!(done.len(), 1);
        match done[0] {
            ServerMessage::Done {
                provider, usage, ..
            } => {
                assert_eq!(provider, "main");
                assert_eq!(usage.map(|u| u.total_tokens), Some(14));
            }
            other => panic!("unexpected terminal {:?}", other),
        }
        assert!(matches!(messages.last(), Some(ServerMessage::Done { .. })));

        // 14 tokens of gpt-4 at 30 credits per 1k
        let debits = h.ledger.debits();
        assert_eq!(debits.len(), 1);
        assert_eq!(debits[0].user_id, "dev-1");
        assert!((debits[0].amount - 0.42).abs() < 1e-9);
        assert!((h.ledger.balance_of("dev-1") - 99.58).abs() < 1e-9);

        let records = h.audit.records.lock();
        assert_eq!(records.len(), 1);
        assert!(records[0].success);
        assert_eq!(records[0].provider.as_deref(), Some("main"));
        assert_eq!(records[0].connection_id, connection.id());
        assert!(!connection.is_pending("s1"));
    }

    #[tokio::test]
    async fn test_failover_is_transparent_to_client() {
        let h = harness(ScriptedProvider::failing("openai"), 100.0);
        let (connection, transport) = h.connect(&token("dev-1", "developer")).await.unwrap();

        h.send(&connection, &chat_frame("f1", "gpt-4", false)).await;

        let messages = transport.messages();
        assert_eq!(messages.len(), 1);
        match &messages[0] {
            ServerMessage::Response {
                provider, content, ..
            } => {
                assert_eq!(provider, "backup");
                assert_eq!(content, "backup says hi");
            }
            other => panic!("unexpected message {:?}", other),
        }
        assert_eq!(h.ledger.debits().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_requests_each_get_one_terminal() {
        let h = harness(ScriptedProvider::replying("openai", "one two three"), 100.0);
        let (connection, transport) = h.connect(&token("dev-1", "developer")).await.unwrap();

        let mut tasks = Vec::new();
        for i in 0..5 {
            let frame = chat_frame(&format!("c{}", i), "gpt-4", i % 2 == 0);
            tasks.extend(h.state.sessions.handle_text(&connection, &frame).await);
        }
        for task in tasks {
            task.await.unwrap();
        }

        let messages = transport.messages();
        for i in 0..5 {
            let id = format!("c{}", i);
            assert_eq!(terminals(&messages, &id).len(), 1, "request {}", id);
            let last = messages.iter().rposition(|m| m.id() == id).unwrap();
            assert!(messages[last].is_terminal(), "terminal is last for {}", id);
        }
        assert_eq!(h.ledger.debits().len(), 5);
        assert_eq!(connection.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_denied_request_never_reaches_provider() {
        let h = harness(ScriptedProvider::replying("openai", "secret"), 100.0);
        let (connection, transport) = h.connect(&token("trial-1", "trial")).await.unwrap();

        h.send(&connection, &chat_frame("d1", "gpt-4", false)).await;

        let messages = transport.messages();
        assert_eq!(messages.len(), 1);
        match &messages[0] {
            ServerMessage::Error { id, error, .. } => {
                assert_eq!(id, "d1");
                assert_eq!(error.code, "authorization_denied");
            }
            other => panic!("unexpected message {:?}", other),
        }
        assert!(h.ledger.debits().is_empty());
        assert!(h.state.router.get_status().iter().all(|s| s.request_count == 0));
    }

    #[tokio::test]
    async fn test_insufficient_credits() {
        let h = harness(ScriptedProvider::replying("openai", "expensive"), 0.0);
        let (connection, transport) = h.connect(&token("dev-1", "developer")).await.unwrap();

        h.send(&connection, &chat_frame("p1", "gpt-4", false)).await;

        match &transport.messages()[0] {
            ServerMessage::Error { error, .. } => assert_eq!(error.code, "insufficient_credits"),
            other => panic!("unexpected message {:?}", other),
        }
        assert!(h.ledger.debits().is_empty());
        assert!(!h.audit.records.lock()[0].success);
        assert_eq!(h.state.usage.snapshot("dev-1").requests, 0);
    }

    #[tokio::test]
    async fn test_ping_and_garbage() {
        let h = harness(ScriptedProvider::replying("openai", "x"), 100.0);
        let (connection, transport) = h.connect(&token("dev-1", "developer")).await.unwrap();

        h.send(&connection, r#"{"type":"ping","id":"hb"}"#).await;
        h.send(&connection, "{{{{").await;

        let messages = transport.messages();
        assert!(matches!(&messages[0], ServerMessage::Pong { id, .. } if id == "hb"));
        assert!(
            matches!(&messages[1], ServerMessage::Error { error, .. } if error.code == "invalid_request")
        );
        assert_eq!(h.state.connections.len(), 1);
    }

    // ==================== Connection Tests ====================

    #[tokio::test]
    async fn test_revoked_and_forged_tokens_rejected() {
        let h = harness(ScriptedProvider::replying("openai", "x"), 100.0);

        let err = h
            .connect(&token_with_id("dev-1", "developer", "stolen"))
            .await
            .unwrap_err();
        assert_eq!(err.client_code(), "unauthorized");
        assert!(h.connect("not-a-jwt").await.is_err());
        assert!(h.state.connections.is_empty());
    }

    #[tokio::test]
    async fn test_broadcast_and_disconnect() {
        let h = harness(ScriptedProvider::replying("openai", "x"), 100.0);
        let (first, first_transport) = h.connect(&token("dev-1", "developer")).await.unwrap();
        let (_second, second_transport) = h.connect(&token("dev-1", "developer")).await.unwrap();
        assert_eq!(h.state.connections.connections_for_user("dev-1").len(), 2);

        let delivered = h
            .state
            .connections
            .broadcast("dev-1", &ServerMessage::pong("notice"))
            .await;
        assert_eq!(delivered, 2);
        assert_eq!(first_transport.messages().len(), 1);
        assert_eq!(second_transport.messages().len(), 1);

        assert!(h.state.connections.remove(first.id()));
        assert!(!h.state.connections.remove(first.id()));
        assert!(first.is_closed());
        assert_eq!(h.state.connections.connections_for_user("dev-1").len(), 1);
    }

    // ==================== HTTP Tests ====================

    #[actix_web::test]
    async fn test_websocket_upgrade_accepted() {
        let h = harness(ScriptedProvider::replying("openai", "x"), 100.0);
        let app = test::init_service(HttpServer::create_app(web::Data::new(h.state.clone()))).await;

        let bearer = token("dev-1", "developer");
        let req = test::TestRequest::get()
            .uri("/ws")
            .insert_header(("connection", "upgrade"))
            .insert_header(("upgrade", "websocket"))
            .insert_header(("sec-websocket-version", "13"))
            .insert_header(("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ=="))
            .insert_header(("sec-websocket-protocol", format!("bearer.{}, llm.v1", bearer)))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SWITCHING_PROTOCOLS);
        assert_eq!(
            resp.headers()
                .get("sec-websocket-protocol")
                .and_then(|v| v.to_str().ok()),
            Some("llm.v1")
        );
    }

    #[actix_web::test]
    async fn test_health_is_public() {
        let h = harness(ScriptedProvider::replying("openai", "x"), 100.0);
        let app = test::init_service(HttpServer::create_app(web::Data::new(h.state.clone()))).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert!(resp.status().is_success());
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["status"], "healthy");
    }
}
