// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Portal servers.

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method, StatusCode, header},
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::{
    AuditLayer, AuthLayer, CORRELATION_ID_HEADER, CsrfLayer, LoginRateLimitLayer,
    MakeCorrelationId, SecurityHeadersLayer,
};
use crate::state::AppState;

const CORS_MAX_AGE: Duration = Duration::from_secs(600);

// =============================================================================
// Portal
// =============================================================================

/// The two web applications served over the shared transaction store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Portal {
    /// Customer-facing payments portal.
    Payments,
    /// Staff-facing review portal.
    Employee,
}

impl Portal {
    /// Returns the portal name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Portal::Payments => "payments",
            Portal::Employee => "employee",
        }
    }
}

impl fmt::Display for Portal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// PortalServer
// =============================================================================

/// HTTP server for one portal.
pub struct PortalServer {
    state: AppState,
}

impl PortalServer {
    /// Creates a server for the portal the state was built for.
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Returns the portal served.
    pub fn portal(&self) -> Portal {
        self.state.portal
    }

    /// Returns the shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Returns the configured listen address.
    pub fn addr(&self) -> SocketAddr {
        match self.state.portal {
            Portal::Payments => self.state.config.payments_addr(),
            Portal::Employee => self.state.config.employee_addr(),
        }
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> ApiResult<Router> {
        let state = &self.state;
        let config = &state.config;
        let security = &config.security;
        let portal = state.portal;

        let cors = create_cors_layer(state)?;
        let audit = AuditLayer::new(state.audit_logger.clone(), portal.as_str())
            .with_enabled(security.audit.enabled)
            .with_trust_forwarded(security.trust_forwarded_headers);
        let rate_limit = LoginRateLimitLayer::new(
            state.login_limiter.clone(),
            security.trust_forwarded_headers,
        );
        let auth = AuthLayer::new(state.jwt_manager.clone())
            .with_trust_forwarded(security.trust_forwarded_headers);
        let csrf = CsrfLayer::new(state.csrf_tokens.clone(), &security.csrf);

        let middleware_stack = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(CORRELATION_ID_HEADER, MakeCorrelationId))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(CORRELATION_ID_HEADER))
            .layer(SecurityHeadersLayer::new())
            .layer(CompressionLayer::new())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                config.api.request_timeout(),
            ))
            .layer(cors)
            .layer(audit)
            .layer(rate_limit)
            .layer(auth)
            .layer(csrf)
            .layer(DefaultBodyLimit::max(config.api.max_body_size));

        let router = Router::new()
            .route("/health", get(handlers::health))
            .route("/ready", get(handlers::ready))
            .route("/api/auth/csrf-token", get(handlers::csrf_token))
            .route("/api/auth/me", get(handlers::me));

        let router = match portal {
            Portal::Payments => router
                .route("/api/auth/register", post(handlers::register))
                .route("/api/auth/login", post(handlers::customer_login))
                .route(
                    "/api/transactions",
                    get(handlers::list_own).post(handlers::create),
                )
                .route("/api/transactions/{id}", get(handlers::get_own)),
            Portal::Employee => router
                .route("/api/auth/login", post(handlers::employee_login))
                .route("/api/transactions", get(handlers::list_all))
                .route("/api/transactions/pending", get(handlers::list_pending))
                .route("/api/transactions/stats/summary", get(handlers::stats))
                .route("/api/transactions/{id}", get(handlers::get_one))
                .route("/api/transactions/{id}/accept", patch(handlers::accept))
                .route("/api/transactions/{id}/reject", patch(handlers::reject)),
        };

        Ok(router
            .layer(middleware_stack)
            .with_state(self.state.clone()))
    }

    /// Binds the configured address and serves until `shutdown_signal`
    /// resolves.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        self.serve(listener, shutdown_signal).await
    }

    /// Serves on an already bound listener until `shutdown_signal` resolves.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown_signal: impl Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let portal = self.state.portal;
        let router = self.router()?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| ApiError::internal(format!("Listener error: {}", e)))?;

        info!(portal = %portal, addr = %local_addr, "Starting portal server");

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!(portal = %portal, "Portal server shutdown complete");

        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates the CORS layer for the portal.
///
/// A `*` origin allows any origin without credentials.
fn create_cors_layer(state: &AppState) -> ApiResult<CorsLayer> {
    let portal_config = match state.portal {
        Portal::Payments => &state.config.payments,
        Portal::Employee => &state.config.employee,
    };
    let csrf_header =
        HeaderName::from_bytes(state.config.security.csrf.header_name.to_ascii_lowercase().as_bytes())
            .map_err(|e| ApiError::internal(format!("Invalid CSRF header name: {}", e)))?;

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, csrf_header])
        .max_age(CORS_MAX_AGE);

    if portal_config.allows_any_origin() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = portal_config
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| ApiError::internal(format!("Invalid CORS origin: {}", origin)))
        })
        .collect::<ApiResult<Vec<_>>>()?;

    Ok(layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use remit_config::{RemitConfig, SecretValue};
    use remit_core::PasswordHasher;
    use tower::ServiceExt;

    fn test_state(portal: Portal) -> AppState {
        let mut config = RemitConfig::default();
        config.security.jwt.secret = Some(SecretValue::new("test-secret-key-that-is-long-enough!!"));
        AppState::builder(portal)
            .config(Arc::new(config))
            .hasher(Arc::new(PasswordHasher::new(4).unwrap()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_portal_names() {
        assert_eq!(Portal::Payments.as_str(), "payments");
        assert_eq!(Portal::Employee.to_string(), "employee");
    }

    #[test]
    fn test_default_addresses() {
        let payments = PortalServer::new(test_state(Portal::Payments));
        let employee = PortalServer::new(test_state(Portal::Employee));
        assert_ne!(payments.addr().port(), employee.addr().port());
    }

    #[tokio::test]
    async fn test_health_route_and_headers() {
        let router = PortalServer::new(test_state(Portal::Employee))
            .router()
            .unwrap();

        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-correlation-id"));
        assert_eq!(response.headers()["x-frame-options"], "DENY");
    }

    #[tokio::test]
    async fn test_register_only_on_payments() {
        let router = PortalServer::new(test_state(Portal::Employee))
            .router()
            .unwrap();

        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/auth/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_wildcard_origin() {
        let mut state = test_state(Portal::Payments);
        let mut config = (*state.config).clone();
        config.payments.allowed_origins = vec!["*".to_string()];
        state.config = Arc::new(config);
        assert!(create_cors_layer(&state).is_ok());
    }
}
