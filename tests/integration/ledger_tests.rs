//! HTTP ledger client tests

#[cfg(test)]
mod tests {
    use litellm_ws_gateway::config::LedgerConfig;
    use litellm_ws_gateway::core::credits::{HttpLedgerClient, LedgerClient};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, token: Option<&str>) -> HttpLedgerClient {
        HttpLedgerClient::new(&LedgerConfig {
            base_url: format!("{}/", server.uri()),
            timeout_secs: 2,
            service_token: token.map(str::to_string),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_balance_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/balances/user%40example.com"))
            .and(header("authorization", "Bearer svc-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"balance": 12.5})))
            .expect(1)
            .mount(&server)
            .await;

        let balance = client(&server, Some("svc-token"))
            .balance("user@example.com")
            .await
            .unwrap();
        assert_eq!(balance, 12.5);
    }

    #[tokio::test]
    async fn test_debit_posts_amount() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/debits"))
            .and(body_partial_json(json!({"user_id": "u1", "amount": 0.42})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"new_balance": 9.58})))
            .expect(1)
            .mount(&server)
            .await;

        let balance = client(&server, None)
            .debit("u1", 0.42, "req r1 gpt-4")
            .await
            .unwrap();
        assert_eq!(balance, 9.58);
    }

    #[tokio::test]
    async fn test_ledger_errors_surface() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client(&server, None).balance("u1").await.unwrap_err();
        assert_eq!(err.client_code(), "billing_unavailable");
        assert!(err.to_string().contains("503"));
    }
}
