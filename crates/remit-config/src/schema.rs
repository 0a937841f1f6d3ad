// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema definitions for remit.
//!
//! # Schema Structure
//!
//! ```text
//! RemitConfig
//! ├── payments: PortalConfig
//! ├── employee: PortalConfig
//! ├── api: ApiConfig
//! ├── security: SecurityConfig
//! │   ├── jwt: JwtConfig
//! │   ├── password: PasswordConfig
//! │   ├── csrf: CsrfConfig
//! │   ├── login_rate_limit: LoginRateLimitConfig
//! │   └── audit: AuditConfig
//! └── seed: SeedConfig
//! ```

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

// =============================================================================
// Constants
// =============================================================================

/// Default payments portal port.
pub const DEFAULT_PAYMENTS_PORT: u16 = 5001;

/// Default employee portal port.
pub const DEFAULT_EMPLOYEE_PORT: u16 = 5002;

/// Default frontend origin allowed by CORS.
pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:3000";

/// Default JWT expiration in seconds (15 minutes).
pub const DEFAULT_JWT_EXPIRATION_SECS: u64 = 900;

/// Minimum JWT secret length in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Default bcrypt work factor.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Lowest accepted bcrypt work factor.
pub const MIN_BCRYPT_COST: u32 = 4;

/// Highest accepted bcrypt work factor.
pub const MAX_BCRYPT_COST: u32 = 31;

/// Default maximum request body size (10 KiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024;

/// Default login attempts per window.
pub const DEFAULT_LOGIN_MAX_ATTEMPTS: u32 = 5;

/// Default login rate limit window in seconds (10 minutes).
pub const DEFAULT_LOGIN_WINDOW_SECS: u64 = 600;

/// Default CSRF token lifetime in seconds.
pub const DEFAULT_CSRF_TOKEN_TTL_SECS: u64 = 7200;

/// Default cap on outstanding CSRF tokens per portal.
pub const DEFAULT_CSRF_MAX_TOKENS: usize = 10_000;

// =============================================================================
// Top-Level Configuration
// =============================================================================

/// The root configuration structure for remit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemitConfig {
    /// Customer payments portal.
    #[serde(default)]
    pub payments: PortalConfig,

    /// Employee review portal.
    #[serde(default)]
    pub employee: PortalConfig,

    /// Shared HTTP settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Security configuration.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Startup seed data.
    #[serde(default)]
    pub seed: SeedConfig,
}

impl RemitConfig {
    /// Validates the entire configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the configuration is valid
    /// * `Err(ConfigError)` for the first violation found
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.payments.enabled && !self.employee.enabled {
            return Err(ConfigError::validation(
                "payments.enabled",
                "at least one portal must be enabled",
            ));
        }

        self.payments.validate("payments")?;
        self.employee.validate("employee")?;

        if self.payments.enabled
            && self.employee.enabled
            && self.payments_addr().port() == self.employee_addr().port()
        {
            return Err(ConfigError::validation(
                "employee.port",
                "payments and employee portals cannot share a port",
            ));
        }

        self.api.validate()?;
        self.security.validate()?;
        self.seed.validate()?;

        Ok(())
    }

    /// Returns the payments portal listen address.
    pub fn payments_addr(&self) -> SocketAddr {
        self.payments.socket_addr(DEFAULT_PAYMENTS_PORT)
    }

    /// Returns the employee portal listen address.
    pub fn employee_addr(&self) -> SocketAddr {
        self.employee.socket_addr(DEFAULT_EMPLOYEE_PORT)
    }
}

impl Default for RemitConfig {
    fn default() -> Self {
        Self {
            payments: PortalConfig::default(),
            employee: PortalConfig::default(),
            api: ApiConfig::default(),
            security: SecurityConfig::default(),
            seed: SeedConfig::default(),
        }
    }
}

// =============================================================================
// Portal Configuration
// =============================================================================

/// Listener settings for one portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortalConfig {
    /// Whether the portal is served.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    /// Listen port. Falls back to the portal's well-known port.
    #[serde(default)]
    pub port: Option<u16>,

    /// Origins allowed by CORS (use "*" for all).
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
}

fn default_allowed_origins() -> Vec<String> {
    vec![DEFAULT_FRONTEND_ORIGIN.to_string()]
}

impl PortalConfig {
    /// Validates the portal configuration.
    pub fn validate(&self, section: &str) -> ConfigResult<()> {
        if self.port == Some(0) {
            return Err(ConfigError::validation(
                format!("{}.port", section),
                "cannot be zero",
            ));
        }
        if self.enabled && self.allowed_origins.iter().any(|o| o.trim().is_empty()) {
            return Err(ConfigError::validation(
                format!("{}.allowed_origins", section),
                "origins cannot be empty strings",
            ));
        }
        Ok(())
    }

    /// Returns the socket address, using `default_port` when none is set.
    pub fn socket_addr(&self, default_port: u16) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port.unwrap_or(default_port))
    }

    /// Returns `true` if any origin is accepted.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: default_bind_address(),
            port: None,
            allowed_origins: default_allowed_origins(),
        }
    }
}

// =============================================================================
// API Configuration
// =============================================================================

/// HTTP settings shared by both portals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}

impl ApiConfig {
    /// Validates the API configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "api.request_timeout_secs",
                "cannot be zero",
            ));
        }
        if self.max_body_size == 0 {
            return Err(ConfigError::validation("api.max_body_size", "cannot be zero"));
        }
        Ok(())
    }

    /// Returns the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            max_body_size: default_max_body_size(),
        }
    }
}

// =============================================================================
// Security Configuration
// =============================================================================

/// Security configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// JWT configuration.
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Password hashing configuration.
    #[serde(default)]
    pub password: PasswordConfig,

    /// CSRF protection configuration.
    #[serde(default)]
    pub csrf: CsrfConfig,

    /// Login throttling configuration.
    #[serde(default)]
    pub login_rate_limit: LoginRateLimitConfig,

    /// Audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,

    /// Take the client IP from `X-Forwarded-For` / `X-Real-IP`.
    ///
    /// Only enable behind a reverse proxy that overwrites these headers.
    #[serde(default)]
    pub trust_forwarded_headers: bool,
}

impl SecurityConfig {
    /// Validates the security configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.jwt.validate()?;
        self.password.validate()?;
        self.csrf.validate()?;
        self.login_rate_limit.validate()?;
        Ok(())
    }
}

/// JWT configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JwtConfig {
    /// HMAC signing secret.
    #[serde(default)]
    pub secret: Option<SecretValue>,

    /// Token issuer.
    #[serde(default = "default_jwt_issuer")]
    pub issuer: String,

    /// Token expiration in seconds.
    #[serde(default = "default_jwt_expiration")]
    pub expiration_secs: u64,

    /// Clock skew tolerated when checking `exp` and `nbf`.
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

fn default_jwt_issuer() -> String {
    "remit".to_string()
}

fn default_jwt_expiration() -> u64 {
    DEFAULT_JWT_EXPIRATION_SECS
}

fn default_jwt_leeway() -> u64 {
    5
}

impl JwtConfig {
    /// Validates the JWT configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let secret = self
            .secret
            .as_ref()
            .ok_or_else(|| ConfigError::missing_field("security.jwt.secret"))?;
        if secret.expose().len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::validation(
                "security.jwt.secret",
                format!("must be at least {} bytes", MIN_JWT_SECRET_LEN),
            ));
        }
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::validation("security.jwt.issuer", "cannot be empty"));
        }
        if self.expiration_secs == 0 {
            return Err(ConfigError::validation(
                "security.jwt.expiration_secs",
                "cannot be zero",
            ));
        }
        if self.leeway_secs >= self.expiration_secs {
            return Err(ConfigError::validation(
                "security.jwt.leeway_secs",
                "must be shorter than the token lifetime",
            ));
        }
        Ok(())
    }

    /// Returns the expiration as a Duration.
    pub fn expiration(&self) -> Duration {
        Duration::from_secs(self.expiration_secs)
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            issuer: default_jwt_issuer(),
            expiration_secs: DEFAULT_JWT_EXPIRATION_SECS,
            leeway_secs: default_jwt_leeway(),
        }
    }
}

/// Password hashing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordConfig {
    /// bcrypt work factor.
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_bcrypt_cost() -> u32 {
    DEFAULT_BCRYPT_COST
}

impl PasswordConfig {
    /// Validates the password configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            return Err(ConfigError::out_of_range(
                "security.password.bcrypt_cost",
                self.bcrypt_cost,
                MIN_BCRYPT_COST,
                MAX_BCRYPT_COST,
            ));
        }
        Ok(())
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }
}

/// Double-submit CSRF configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CsrfConfig {
    /// Whether state-changing requests must carry a token.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Name of the readable cookie holding the token.
    #[serde(default = "default_csrf_cookie")]
    pub cookie_name: String,

    /// Header the client echoes the token in.
    #[serde(default = "default_csrf_header")]
    pub header_name: String,

    /// Token lifetime in seconds.
    #[serde(default = "default_csrf_ttl")]
    pub token_ttl_secs: u64,

    /// Outstanding tokens kept before the oldest is evicted.
    #[serde(default = "default_csrf_max_tokens")]
    pub max_tokens: usize,

    /// Set the `Secure` attribute on the cookie.
    #[serde(default)]
    pub secure_cookie: bool,
}

fn default_csrf_cookie() -> String {
    "XSRF-TOKEN".to_string()
}

fn default_csrf_header() -> String {
    "X-CSRF-Token".to_string()
}

fn default_csrf_ttl() -> u64 {
    DEFAULT_CSRF_TOKEN_TTL_SECS
}

fn default_csrf_max_tokens() -> usize {
    DEFAULT_CSRF_MAX_TOKENS
}

impl CsrfConfig {
    /// Validates the CSRF configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.cookie_name.is_empty()
            || !self
                .cookie_name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(ConfigError::validation(
                "security.csrf.cookie_name",
                "must be a non-empty token of letters, digits, '-' or '_'",
            ));
        }
        if is_invalid_header_name(&self.header_name) {
            return Err(ConfigError::validation(
                "security.csrf.header_name",
                "must be a valid HTTP header name",
            ));
        }
        if self.token_ttl_secs == 0 {
            return Err(ConfigError::validation(
                "security.csrf.token_ttl_secs",
                "cannot be zero",
            ));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::validation(
                "security.csrf.max_tokens",
                "cannot be zero",
            ));
        }
        Ok(())
    }

    /// Returns the token lifetime as a Duration.
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cookie_name: default_csrf_cookie(),
            header_name: default_csrf_header(),
            token_ttl_secs: DEFAULT_CSRF_TOKEN_TTL_SECS,
            max_tokens: DEFAULT_CSRF_MAX_TOKENS,
            secure_cookie: false,
        }
    }
}

// RFC 7230 token characters.
fn is_invalid_header_name(name: &str) -> bool {
    name.is_empty()
        || !name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

/// Fixed-window login throttling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRateLimitConfig {
    /// Whether login throttling is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Attempts allowed per client IP per window.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Window length in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Paths the limit applies to.
    #[serde(default = "default_limited_paths")]
    pub paths: Vec<String>,
}

fn default_max_attempts() -> u32 {
    DEFAULT_LOGIN_MAX_ATTEMPTS
}

fn default_window_secs() -> u64 {
    DEFAULT_LOGIN_WINDOW_SECS
}

fn default_limited_paths() -> Vec<String> {
    vec!["/api/auth/login".to_string()]
}

impl LoginRateLimitConfig {
    /// Validates the rate limit configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::validation(
                "security.login_rate_limit.max_attempts",
                "cannot be zero when rate limiting is enabled",
            ));
        }
        if self.window_secs == 0 {
            return Err(ConfigError::validation(
                "security.login_rate_limit.window_secs",
                "cannot be zero when rate limiting is enabled",
            ));
        }
        if let Some(path) = self.paths.iter().find(|p| !p.starts_with('/')) {
            return Err(ConfigError::validation(
                "security.login_rate_limit.paths",
                format!("'{}' must start with '/'", path),
            ));
        }
        Ok(())
    }

    /// Returns the window as a Duration.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for LoginRateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: DEFAULT_LOGIN_MAX_ATTEMPTS,
            window_secs: DEFAULT_LOGIN_WINDOW_SECS,
            paths: default_limited_paths(),
        }
    }
}

/// Audit logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Whether audit events are emitted.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Include the JSON details payload in each event.
    #[serde(default)]
    pub include_details: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            include_details: false,
        }
    }
}

// =============================================================================
// Seed Configuration
// =============================================================================

/// Records created at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedConfig {
    /// Employee accounts.
    #[serde(default)]
    pub employees: Vec<SeedEmployee>,
}

impl SeedConfig {
    /// Validates the seed configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut ids = HashSet::new();
        for (index, employee) in self.employees.iter().enumerate() {
            employee.validate(index)?;
            if !ids.insert(employee.employee_id.trim().to_uppercase()) {
                return Err(ConfigError::validation(
                    format!("seed.employees[{}].employee_id", index),
                    format!("duplicate employee ID '{}'", employee.employee_id),
                ));
            }
        }
        Ok(())
    }
}

/// An employee account provisioned from configuration.
///
/// Exactly one of `password_hash` or `password` must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedEmployee {
    /// Employee ID such as `EMP12345`.
    pub employee_id: String,

    /// Display name.
    pub full_name: String,

    /// Precomputed bcrypt hash.
    #[serde(default)]
    pub password_hash: Option<String>,

    /// Plaintext password, hashed at startup.
    #[serde(default)]
    pub password: Option<SecretValue>,
}

impl SeedEmployee {
    fn validate(&self, index: usize) -> ConfigResult<()> {
        let field = |name: &str| format!("seed.employees[{}].{}", index, name);

        if self.employee_id.trim().is_empty() {
            return Err(ConfigError::missing_field(field("employee_id")));
        }
        if self.full_name.trim().is_empty() {
            return Err(ConfigError::missing_field(field("full_name")));
        }
        match (&self.password_hash, &self.password) {
            (Some(_), Some(_)) => Err(ConfigError::validation(
                field("password"),
                "set either password or password_hash, not both",
            )),
            (None, None) => Err(ConfigError::missing_field(field("password_hash"))),
            (Some(hash), None) if !hash.starts_with("$2") => Err(ConfigError::validation(
                field("password_hash"),
                "must be a bcrypt hash",
            )),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// Secret Value
// =============================================================================

/// A secret that never appears in logs or serialized output.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue(String);

impl SecretValue {
    /// Creates a new secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the plaintext value.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "***")
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretValue(***)")
    }
}

impl Serialize for SecretValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("***")
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn valid_config() -> RemitConfig {
        let mut config = RemitConfig::default();
        config.security.jwt.secret = Some(SecretValue::new(SECRET));
        config
    }

    #[test]
    fn test_remit_config_default() {
        let config = RemitConfig::default();
        assert!(config.payments.enabled);
        assert!(config.employee.enabled);
        assert_eq!(config.payments_addr().port(), 5001);
        assert_eq!(config.employee_addr().port(), 5002);
        assert_eq!(config.security.jwt.expiration_secs, 900);
        assert_eq!(config.security.password.bcrypt_cost, 12);
        assert_eq!(config.api.max_body_size, 10240);
    }

    #[test]
    fn test_secret_required() {
        let config = RemitConfig::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { .. }));

        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = valid_config();
        config.security.jwt.secret = Some(SecretValue::new("short"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_portal_rules() {
        let mut config = valid_config();
        config.payments.enabled = false;
        config.employee.enabled = false;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.employee.port = Some(5001);
        assert!(config.validate().is_err());

        config.payments.enabled = false;
        assert!(config.validate().is_ok());

        let mut config = valid_config();
        config.payments.port = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bcrypt_cost_range() {
        let mut config = valid_config();
        config.security.password.bcrypt_cost = 3;
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::OutOfRange { .. }
        ));
        config.security.password.bcrypt_cost = 31;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_csrf_names() {
        let mut csrf = CsrfConfig::default();
        assert!(csrf.validate().is_ok());

        csrf.header_name = "X CSRF".to_string();
        assert!(csrf.validate().is_err());

        csrf.header_name = "X-CSRF-Token".to_string();
        csrf.cookie_name = String::new();
        assert!(csrf.validate().is_err());
    }

    #[test]
    fn test_csrf_token_cap() {
        let mut csrf = CsrfConfig::default();
        assert_eq!(csrf.max_tokens, DEFAULT_CSRF_MAX_TOKENS);

        csrf.max_tokens = 0;
        match csrf.validate().unwrap_err() {
            ConfigError::Validation { field, .. } => assert_eq!(field, "security.csrf.max_tokens"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_rate_limit_validation() {
        let mut limit = LoginRateLimitConfig::default();
        assert!(limit.validate().is_ok());

        limit.max_attempts = 0;
        assert!(limit.validate().is_err());

        limit.enabled = false;
        assert!(limit.validate().is_ok());
    }

    #[test]
    fn test_seed_employee_password_source() {
        let mut employee = SeedEmployee {
            employee_id: "EMP12345".to_string(),
            full_name: "Jane Smith".to_string(),
            password_hash: None,
            password: None,
        };
        assert!(employee.validate(0).is_err());

        employee.password = Some(SecretValue::new("Passw0rd!"));
        assert!(employee.validate(0).is_ok());

        employee.password_hash = Some("$2b$12$abcdefghijklmnopqrstuv".to_string());
        assert!(employee.validate(0).is_err());

        employee.password = None;
        assert!(employee.validate(0).is_ok());

        employee.password_hash = Some("plaintext".to_string());
        assert!(employee.validate(0).is_err());
    }

    #[test]
    fn test_seed_duplicate_ids() {
        let employee = SeedEmployee {
            employee_id: "emp12345".to_string(),
            full_name: "Jane Smith".to_string(),
            password_hash: None,
            password: Some(SecretValue::new("Passw0rd!")),
        };
        let mut upper = employee.clone();
        upper.employee_id = "EMP12345".to_string();
        let seed = SeedConfig {
            employees: vec![employee, upper],
        };
        assert!(seed.validate().is_err());
    }

    #[test]
    fn test_secret_value_masked() {
        let secret = SecretValue::new("hunter2");
        assert_eq!(secret.expose(), "hunter2");
        assert_eq!(secret.to_string(), "***");
        assert!(!format!("{:?}", secret).contains("hunter2"));
        assert_eq!(serde_json::to_string(&secret).unwrap(), "\"***\"");
    }
}
