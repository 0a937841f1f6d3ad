// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Configuration Integration Tests
//!
//! Loading configuration files from disk and running the portals with the
//! result.
//!
//! ## Test Categories
//!
//! - `test_load_*`: File loading in each format
//! - `test_env_*`: Placeholders and `REMIT_*` overrides
//! - `test_reject_*`: Validation failures

use std::fs;

use remit_config::{ConfigError, ConfigLoader, RemitConfig};
use remit_tests::common::temp_test_dir;
use remit_tests::prelude::*;

fn loader(vars: &[(&str, &str)]) -> ConfigLoader {
    ConfigLoader::builder()
        .env_vars(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())))
        .build()
}

fn load(file_name: &str, content: &str, vars: &[(&str, &str)]) -> Result<RemitConfig, ConfigError> {
    let dir = temp_test_dir("remit-config");
    let path = dir.path().join(file_name);
    fs::write(&path, content).expect("failed to write config file");
    loader(vars).load(&path)
}

// =============================================================================
// Loading
// =============================================================================

#[tokio::test]
async fn test_load_yaml_and_serve() {
    let config = load(
        "remit.yaml",
        &format!(
            r#"
payments:
  port: 6001
  allowed_origins:
    - "https://pay.example.com"
employee:
  port: 6002
security:
  jwt:
    secret: "{}"
  password:
    bcrypt_cost: 4
  login_rate_limit:
    max_attempts: 2
"#,
            TEST_JWT_SECRET
        ),
        &[],
    )
    .expect("yaml config should load");

    assert_eq!(config.payments_addr().port(), 6001);
    assert_eq!(config.employee_addr().port(), 6002);
    assert_eq!(config.security.login_rate_limit.max_attempts, 2);

    let portals = TestPortals::with_config(config);
    let health = portals.payments().get("/health").send().await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["portal"], "payments");

    let preflight = portals
        .payments()
        .request(Method::OPTIONS, "/api/auth/login")
        .header("origin", "https://pay.example.com")
        .header("access-control-request-method", "POST")
        .send()
        .await;
    assert_eq!(
        preflight.header("access-control-allow-origin"),
        Some("https://pay.example.com")
    );
}

#[tokio::test]
async fn test_load_toml() {
    let config = load(
        "remit.toml",
        &format!(
            r#"
[employee]
enabled = false

[security.jwt]
secret = "{}"
expiration_secs = 600

[[seed.employees]]
employee_id = "EMP12345"
full_name = "Lerato Dlamini"
password = "Review!2024"
"#,
            TEST_JWT_SECRET
        ),
        &[],
    )
    .expect("toml config should load");

    assert!(!config.employee.enabled);
    assert_eq!(config.security.jwt.expiration_secs, 600);
    assert_eq!(config.seed.employees.len(), 1);
    assert_eq!(
        config.seed.employees[0].password.as_ref().map(|p| p.expose()),
        Some("Review!2024")
    );
}

#[tokio::test]
async fn test_token_lifetime_follows_config() {
    let mut config = ConfigFixtures::default_config();
    config.security.jwt.expiration_secs = 300;
    let portals = TestPortals::with_config(config);
    let customer = CustomerFixtures::thandi();
    portals.register(&customer).await;

    let login = portals
        .payments()
        .post("/api/auth/login")
        .json(customer.login_body())
        .send()
        .await;

    assert_eq!(login.body["expiresIn"], 300);
}

// =============================================================================
// Environment
// =============================================================================

#[tokio::test]
async fn test_env_placeholder_supplies_secret() {
    let content = r#"
security:
  jwt:
    secret: "${PORTAL_JWT_SECRET}"
  password:
    bcrypt_cost: ${PORTAL_BCRYPT_COST:11}
"#;

    let config = load(
        "remit.yaml",
        content,
        &[("PORTAL_JWT_SECRET", TEST_JWT_SECRET)],
    )
    .expect("placeholder should resolve");

    assert_eq!(
        config.security.jwt.secret.as_ref().map(|s| s.expose()),
        Some(TEST_JWT_SECRET)
    );
    assert_eq!(config.security.password.bcrypt_cost, 11);
}

#[tokio::test]
async fn test_env_placeholder_must_be_set() {
    let err = load(
        "remit.yaml",
        "security:\n  jwt:\n    secret: \"${PORTAL_JWT_SECRET}\"\n",
        &[],
    )
    .unwrap_err();

    match err {
        ConfigError::EnvVarNotFound { name } => assert_eq!(name, "PORTAL_JWT_SECRET"),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_env_overrides_apply() {
    let config = load(
        "remit.yaml",
        &ConfigFixtures::minimal_yaml(),
        &[
            ("REMIT_PAYMENTS_PORT", "7001"),
            ("REMIT_EMPLOYEE_ORIGIN", "https://staff.example.com"),
            ("REMIT_CSRF_SECURE_COOKIE", "true"),
            ("REMIT_BCRYPT_COST", "13"),
        ],
    )
    .expect("overrides should apply");

    assert_eq!(config.payments_addr().port(), 7001);
    assert!(
        config
            .employee
            .allowed_origins
            .contains(&"https://staff.example.com".to_string())
    );
    assert!(config.security.csrf.secure_cookie);
    assert_eq!(config.security.password.bcrypt_cost, 13);
}

#[tokio::test]
async fn test_env_override_must_parse() {
    let err = load(
        "remit.yaml",
        &ConfigFixtures::minimal_yaml(),
        &[("REMIT_EMPLOYEE_PORT", "not-a-port")],
    )
    .unwrap_err();

    assert!(matches!(err, ConfigError::InvalidEnvVar { .. }), "{}", err);
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_reject_missing_secret() {
    let err = load("remit.yaml", "payments:\n  port: 6001\n", &[]).unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { .. }), "{}", err);
}

#[tokio::test]
async fn test_reject_short_secret() {
    let err = load(
        "remit.yaml",
        "security:\n  jwt:\n    secret: \"too-short\"\n",
        &[],
    )
    .unwrap_err();

    match err {
        ConfigError::Validation { field, .. } => assert_eq!(field, "security.jwt.secret"),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_reject_shared_port() {
    let err = load(
        "remit.yaml",
        &format!(
            "{}payments:\n  port: 6000\nemployee:\n  port: 6000\n",
            ConfigFixtures::minimal_yaml()
        ),
        &[],
    )
    .unwrap_err();

    match err {
        ConfigError::Validation { field, .. } => assert_eq!(field, "employee.port"),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_reject_out_of_range_cost() {
    let err = load(
        "remit.yaml",
        &ConfigFixtures::minimal_yaml(),
        &[("REMIT_BCRYPT_COST", "40")],
    )
    .unwrap_err();

    assert!(matches!(err, ConfigError::OutOfRange { .. }), "{}", err);
}

#[tokio::test]
async fn test_reject_duplicate_seed_employee() {
    let content = format!(
        r#"{}seed:
  employees:
    - employee_id: "EMP12345"
      full_name: "Lerato Dlamini"
      password: "Review!2024"
    - employee_id: "emp12345"
      full_name: "Lerato Again"
      password: "Review!2024"
"#,
        ConfigFixtures::minimal_yaml()
    );

    let err = load("remit.yaml", &content, &[]).unwrap_err();
    match err {
        ConfigError::Validation { field, .. } => {
            assert_eq!(field, "seed.employees[1].employee_id")
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_reject_unknown_keys_and_formats() {
    let unknown = load(
        "remit.toml",
        &format!("[security.jwt]\nsecret = \"{}\"\nsecrt = \"typo\"\n", TEST_JWT_SECRET),
        &[],
    )
    .unwrap_err();
    assert!(matches!(unknown, ConfigError::Parse { .. }), "{}", unknown);

    match unknown {
        ConfigError::Parse { line, .. } => assert_eq!(line, Some(3)),
        other => panic!("unexpected error: {}", other),
    }

    let format = load("remit.ini", "", &[]).unwrap_err();
    assert!(matches!(format, ConfigError::UnsupportedFormat { .. }), "{}", format);

    let missing = loader(&[]).load("/nonexistent/remit.yaml").unwrap_err();
    assert!(matches!(missing, ConfigError::FileNotFound { .. }), "{}", missing);
}

#[tokio::test]
async fn test_secret_is_masked() {
    let config = ConfigFixtures::default_config();

    let debug = format!("{:?}", config);
    let json = serde_json::to_string(&config).unwrap();

    assert!(!debug.contains(TEST_JWT_SECRET));
    assert!(!json.contains(TEST_JWT_SECRET));
}
