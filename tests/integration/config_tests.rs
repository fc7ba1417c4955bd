//! Configuration loading tests

#[cfg(test)]
mod tests {
    use litellm_ws_gateway::config::Config;
    use litellm_ws_gateway::server::AppState;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SECRET_LINE: &str = "jwt_secret: \"config_test_secret_0123456789abcdef\"";

    fn write(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_full_file() {
        let file = write(&format!(
            r#"
server:
  port: 9100
  heartbeat_interval_secs: 15
auth:
  {SECRET_LINE}
providers:
  - name: oa
    provider_type: openai
    api_key: sk-inline
    base_url: http://localhost:1/v1
  - name: claude
    provider_type: anthropic
    api_key: sk-ant-inline
router:
  primary: oa
  fallback: claude
credits:
  ledger:
    base_url: http://localhost:2
logging:
  level: debug
"#
        ));

        let config = Config::from_file(file.path()).await.unwrap();
        assert_eq!(config.server().port, 9100);
        assert_eq!(config.server().heartbeat_interval_secs, 15);
        assert_eq!(config.providers().len(), 2);
        assert_eq!(config.router().primary.as_deref(), Some("oa"));
        assert_eq!(config.roles().default_role, "trial");
        assert_eq!(config.logging().level, "debug");

        let state = AppState::from_config(config).unwrap();
        assert_eq!(state.router.provider_names(), &["oa".to_string(), "claude".to_string()]);
        assert_eq!(state.router.fallback_name(), Some("claude"));
    }

    #[tokio::test]
    async fn test_env_placeholder_resolved() {
        // SAFETY: the variable name is unique to this test
        unsafe { std::env::set_var("WS_GATEWAY_CONFIG_TEST_KEY", "sk-from-env") };
        let config = Config::from_yaml_str(&format!(
            r#"
auth:
  {SECRET_LINE}
providers:
  - name: oa
    provider_type: openai
    api_key: "${{WS_GATEWAY_CONFIG_TEST_KEY}}"
"#
        ))
        .unwrap();
        assert_eq!(config.providers()[0].api_key, "sk-from-env");

        let missing = Config::from_yaml_str(&format!(
            r#"
auth:
  {SECRET_LINE}
providers:
  - name: oa
    provider_type: openai
    api_key: "${{WS_GATEWAY_CONFIG_TEST_UNSET}}"
"#
        ));
        assert!(missing.is_err());
    }

    #[tokio::test]
    async fn test_invalid_files_rejected() {
        assert!(Config::from_file("/nonexistent/gateway.yaml").await.is_err());

        let file = write("server: [not, a, map]");
        assert!(Config::from_file(file.path()).await.is_err());

        // Router names an unknown provider
        let err = Config::from_yaml_str(&format!(
            "auth:\n  {SECRET_LINE}\nrouter:\n  primary: ghost\n"
        ))
        .and_then(AppState::from_config);
        assert!(err.is_err());
    }

    #[test]
    fn test_example_config_parses() {
        let example = include_str!("../../config/gateway.yaml.example");
        let value: serde_yaml::Value = serde_yaml::from_str(example).unwrap();
        assert_eq!(value["router"]["primary"].as_str(), Some("openai"));
        assert_eq!(value["providers"].as_sequence().map(Vec::len), Some(3));
    }
}
