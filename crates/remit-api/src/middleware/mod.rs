// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware implementations for the portal servers.
//!
//! This module provides a layered middleware stack for security and observability:
//!
//! - [`SecurityHeadersLayer`]: Browser hardening headers
//! - [`AuditLayer`]: Audit entries for requests refused by the layers below
//! - [`LoginRateLimitLayer`]: Fixed-window login attempt limiting
//! - [`AuthLayer`]: JWT authentication
//! - [`CsrfLayer`]: Double-submit CSRF verification
//! - [`MakeCorrelationId`]: UUIDv7 correlation IDs

pub mod audit;
mod auth;
mod csrf;
mod rate_limit;
mod request_id;
mod security_headers;

pub use audit::{AuditLayer, AuditMiddleware};
pub use auth::{AuthLayer, AuthMiddleware};
pub use csrf::{CsrfLayer, CsrfMiddleware};
pub use rate_limit::{
    LoginRateLimitLayer, LoginRateLimitMiddleware, LoginRateLimiter, RateDecision,
    TOO_MANY_ATTEMPTS_MESSAGE,
};
pub use request_id::{CORRELATION_ID_HEADER, MakeCorrelationId, correlation_id};
pub use security_headers::{SecurityHeadersLayer, SecurityHeadersMiddleware};

/// Marker placed in response extensions when a security layer refuses a
/// request, so the audit layer can record it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityRejection {
    /// No bearer token on a protected route.
    MissingToken,
    /// Bearer token failed validation.
    InvalidToken,
    /// CSRF cookie or header missing, mismatched or unknown.
    Csrf,
    /// Login attempts exhausted.
    RateLimited {
        /// Seconds until the window resets.
        retry_after: u64,
    },
}

impl SecurityRejection {
    /// Returns a short reason for audit details.
    pub fn reason(&self) -> &'static str {
        match self {
            SecurityRejection::MissingToken => "missing token",
            SecurityRejection::InvalidToken => "invalid or expired token",
            SecurityRejection::Csrf => "invalid csrf token",
            SecurityRejection::RateLimited { .. } => "login rate limit exceeded",
        }
    }
}
