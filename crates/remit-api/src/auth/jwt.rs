// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT token management.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use remit_core::{Customer, Employee};

use super::claims::{Claims, PrincipalKind};
use crate::error::{ApiError, ApiResult};

/// Audience of tokens minted by the payments portal.
pub const PAYMENTS_AUDIENCE: &str = "payments-portal";

/// Audience of tokens minted by the employee portal.
pub const EMPLOYEE_AUDIENCE: &str = "employee-portal";

/// The only message clients see for a rejected token.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";

// =============================================================================
// JwtSettings
// =============================================================================

/// Resolved signing settings for one portal.
#[derive(Clone)]
pub struct JwtSettings {
    /// HMAC secret.
    pub secret: String,
    /// Token issuer.
    pub issuer: String,
    /// Token audience.
    pub audience: String,
    /// Principal kind this portal accepts.
    pub kind: PrincipalKind,
    /// Token lifetime in seconds.
    pub expiration_secs: u64,
    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"***")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("kind", &self.kind)
            .field("expiration_secs", &self.expiration_secs)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

impl JwtSettings {
    /// Builds settings from the configured JWT section.
    pub fn from_config(
        config: &remit_config::JwtConfig,
        audience: impl Into<String>,
        kind: PrincipalKind,
    ) -> ApiResult<Self> {
        let secret = config
            .secret
            .as_ref()
            .map(|s| s.expose().to_string())
            .ok_or_else(|| ApiError::internal("JWT secret is not configured"))?;

        Ok(Self {
            secret,
            issuer: config.issuer.clone(),
            audience: audience.into(),
            kind,
            expiration_secs: config.expiration_secs,
            leeway_secs: config.leeway_secs,
        })
    }

    /// Settings for the payments portal.
    pub fn payments(config: &remit_config::JwtConfig) -> ApiResult<Self> {
        Self::from_config(config, PAYMENTS_AUDIENCE, PrincipalKind::Customer)
    }

    /// Settings for the employee portal.
    pub fn employee(config: &remit_config::JwtConfig) -> ApiResult<Self> {
        Self::from_config(config, EMPLOYEE_AUDIENCE, PrincipalKind::Employee)
    }
}

// =============================================================================
// JwtManager
// =============================================================================

/// Creates and validates HS256 tokens for one portal.
///
/// A manager only accepts tokens carrying its own audience and principal
/// kind, so a customer token is useless against the employee portal.
#[derive(Clone)]
pub struct JwtManager {
    settings: Arc<JwtSettings>,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    /// Creates a new JWT manager.
    pub fn new(settings: JwtSettings) -> ApiResult<Self> {
        if settings.secret.is_empty() {
            return Err(ApiError::internal("JWT secret is not configured"));
        }

        let encoding_key = EncodingKey::from_secret(settings.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(settings.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&settings.issuer]);
        validation.set_audience(&[&settings.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.validate_nbf = true;
        validation.leeway = settings.leeway_secs;

        Ok(Self {
            settings: Arc::new(settings),
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
        })
    }

    /// Returns the token lifetime in seconds.
    pub fn expiration_secs(&self) -> u64 {
        self.settings.expiration_secs
    }

    /// Returns the audience this manager signs for.
    pub fn audience(&self) -> &str {
        &self.settings.audience
    }

    /// Returns the principal kind this manager accepts.
    pub fn kind(&self) -> PrincipalKind {
        self.settings.kind
    }

    /// Signs the given claims.
    pub fn create_token(&self, claims: &Claims) -> ApiResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| ApiError::internal(format!("Failed to create token: {}", e)))
    }

    /// Issues a token for a customer.
    pub fn issue_customer(&self, customer: &Customer) -> ApiResult<String> {
        let claims = Claims::for_customer(
            customer,
            &self.settings.issuer,
            &self.settings.audience,
            self.lifetime(),
        );
        self.create_token(&claims)
    }

    /// Issues a token for an employee.
    pub fn issue_employee(&self, employee: &Employee) -> ApiResult<String> {
        let claims = Claims::for_employee(
            employee,
            &self.settings.issuer,
            &self.settings.audience,
            self.lifetime(),
        );
        self.create_token(&claims)
    }

    /// Validates and decodes a token.
    ///
    /// Every failure maps to the same 401; the cause is only logged.
    pub fn validate_token(&self, token: &str) -> ApiResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, audience = %self.settings.audience, "Token validation failed");
            ApiError::unauthorized(INVALID_TOKEN_MESSAGE)
        })?;

        if data.claims.kind != self.settings.kind {
            tracing::debug!(
                expected = %self.settings.kind,
                actual = %data.claims.kind,
                "Token principal kind mismatch"
            );
            return Err(ApiError::unauthorized(INVALID_TOKEN_MESSAGE));
        }

        Ok(data.claims)
    }

    fn lifetime(&self) -> i64 {
        i64::try_from(self.settings.expiration_secs).unwrap_or(i64::MAX / 2)
    }
}

// =============================================================================
// Tests
// =============================================================================
