//! # Configuration Tests
//!
//! Checks each layer of `get_config`: built-in defaults, a YAML file with
//! `${VAR}` substitution, plain environment variables and `FINBOT_` overrides.
//!
//! Environment variables are process-global, so every test runs `#[serial]`.

use finbot::ResponseStrategy;
use finbot_server::config::{get_config, ConfigError, PoolSettings};
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::tempdir;

const VARS: &[&str] = &[
    "PORT",
    "DB_URL",
    "AI_API_URL",
    "AI_API_KEY",
    "AI_MODEL",
    "AI_TIMEOUT_SECS",
    "RESPONSE_STRATEGY",
    "FINBOT_PORT",
    "FINBOT_POOL__MAX_CONNECTIONS",
    "FINBOT_POOL__ACQUIRE_TIMEOUT_SECS",
    "FINBOT_CORS_ORIGINS",
    "FINBOT_MAX_SESSIONS",
    "TEST_FINBOT_KEY",
];

/// Clears every variable `get_config` reads, so each test starts clean.
fn clear_env_vars() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_without_file_or_env() {
    clear_env_vars();

    let config = get_config(None).expect("defaults should load");

    assert_eq!(config.port, 5000);
    assert_eq!(config.db_url, "db/finbot.db");
    assert_eq!(
        config.ai_api_url,
        "https://api.groq.com/openai/v1/chat/completions"
    );
    assert_eq!(config.ai_model, "llama3-8b-8192");
    assert_eq!(config.ai_api_key, None);
    assert_eq!(config.ai_timeout_secs, 30);
    assert_eq!(config.response_strategy, ResponseStrategy::Natural);
    assert_eq!(config.pool, PoolSettings::default());
    assert_eq!(config.pool.max_connections, 10);
    assert_eq!(config.max_sessions, 1000);
    assert!(config
        .cors_origins
        .contains(&"http://localhost:*".to_string()));
}

#[test]
#[serial]
fn test_yaml_file_with_env_substitution() {
    clear_env_vars();
    env::set_var("TEST_FINBOT_KEY", "secret-from-env");

    // 1. Arrange: A config file that references an environment variable.
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yml");
    fs::write(
        &path,
        r#"
port: 8081
db_url: "/tmp/bank.db"
ai_api_key: "${TEST_FINBOT_KEY}"
ai_model: "mixtral"
response_strategy: "literal"
pool:
  max_connections: 4
cors_origins:
  - "https://bank.example"
"#,
    )
    .unwrap();

    // 2. Act
    let config = get_config(Some(path.to_str().unwrap())).unwrap();

    // 3. Assert: File values win over defaults, unset pool fields keep theirs.
    assert_eq!(config.port, 8081);
    assert_eq!(config.db_url, "/tmp/bank.db");
    assert_eq!(config.ai_api_key.as_deref(), Some("secret-from-env"));
    assert_eq!(config.ai_model, "mixtral");
    assert_eq!(config.response_strategy, ResponseStrategy::Literal);
    assert_eq!(config.pool.max_connections, 4);
    assert_eq!(config.pool.min_connections, 1);
    assert_eq!(config.cors_origins, vec!["https://bank.example".to_string()]);

    clear_env_vars();
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env_vars();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yml");
    fs::write(&path, "port: 8081\nai_model: \"from-file\"\n").unwrap();

    env::set_var("PORT", "9999");
    env::set_var("AI_MODEL", "from-env");
    env::set_var("FINBOT_POOL__MAX_CONNECTIONS", "3");
    env::set_var("FINBOT_POOL__ACQUIRE_TIMEOUT_SECS", "2");
    env::set_var("FINBOT_MAX_SESSIONS", "50");
    env::set_var(
        "FINBOT_CORS_ORIGINS",
        "http://localhost:*,https://bank.example",
    );

    let config = get_config(Some(path.to_str().unwrap())).unwrap();

    assert_eq!(config.port, 9999);
    assert_eq!(config.ai_model, "from-env");
    assert_eq!(config.pool.max_connections, 3);
    assert_eq!(config.max_sessions, 50);
    assert_eq!(
        config.pool.to_pool_config().acquire_timeout,
        std::time::Duration::from_secs(2)
    );
    assert_eq!(
        config.cors_origins,
        vec![
            "http://localhost:*".to_string(),
            "https://bank.example".to_string()
        ]
    );

    clear_env_vars();
}

#[test]
#[serial]
fn test_blank_api_key_means_no_key() {
    clear_env_vars();
    env::set_var("AI_API_KEY", "   ");

    let config = get_config(None).unwrap();

    assert_eq!(config.ai_api_key, None);
    clear_env_vars();
}

#[test]
#[serial]
fn test_missing_explicit_file_is_an_error() {
    clear_env_vars();

    let result = get_config(Some("/definitely/not/here/config.yml"));

    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}
