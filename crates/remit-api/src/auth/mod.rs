// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication module.
//!
//! This module provides:
//! - JWT claims, issuing and validation per portal
//! - The per-request authentication context
//! - Double-submit CSRF token issuing
//! - Client IP resolution

mod claims;
mod context;
pub mod csrf;
mod jwt;

pub use claims::{Claims, PrincipalKind};
pub use context::{AuthContext, CustomerPrincipal, EmployeePrincipal, Principal};
pub use csrf::CsrfTokenStore;
pub use jwt::{EMPLOYEE_AUDIENCE, INVALID_TOKEN_MESSAGE, JwtManager, JwtSettings, PAYMENTS_AUDIENCE};

use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::Request;

/// Resolves the client IP of a request.
///
/// `X-Forwarded-For` and `X-Real-IP` are consulted only when
/// `trust_forwarded` is set; otherwise the socket peer address is used.
///
/// Only the rightmost `X-Forwarded-For` entry is used. That is the address
/// the fronting proxy appended; entries to its left come from the client.
pub fn resolve_client_ip<B>(req: &Request<B>, trust_forwarded: bool) -> Option<IpAddr> {
    if trust_forwarded {
        let forwarded = req
            .headers()
            .get_all("x-forwarded-for")
            .iter()
            .next_back()
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());
        if forwarded.is_some() {
            return forwarded;
        }

        let real_ip = req
            .headers()
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());
        if real_ip.is_some() {
            return real_ip;
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip())
}
