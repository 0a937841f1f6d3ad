// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Audit logging middleware.
//!
//! Handlers audit their own business events. This layer covers requests that
//! never reach a handler because a security layer refused them.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{body::Body, http::Request, response::Response};
use remit_core::audit::{AuditAction, AuditLog, AuditLogger, AuditResource};
use tower::{Layer, Service};

use super::{SecurityRejection, correlation_id};
use crate::auth::{AuthContext, resolve_client_ip};

// =============================================================================
// AuditLayer
// =============================================================================

/// Layer for audit logging of refused requests.
#[derive(Clone)]
pub struct AuditLayer {
    logger: Arc<dyn AuditLogger>,
    portal: &'static str,
    enabled: bool,
    trust_forwarded: bool,
}

impl AuditLayer {
    /// Creates a new audit layer tagging entries with `portal`.
    pub fn new(logger: Arc<dyn AuditLogger>, portal: &'static str) -> Self {
        Self {
            logger,
            portal,
            enabled: true,
            trust_forwarded: false,
        }
    }

    /// Enables or disables the layer.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Honors `X-Forwarded-For` when resolving the client IP.
    pub fn with_trust_forwarded(mut self, trust: bool) -> Self {
        self.trust_forwarded = trust;
        self
    }
}

impl<S> Layer<S> for AuditLayer {
    type Service = AuditMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuditMiddleware {
            inner,
            logger: self.logger.clone(),
            portal: self.portal,
            enabled: self.enabled,
            trust_forwarded: self.trust_forwarded,
        }
    }
}

// =============================================================================
// AuditMiddleware
// =============================================================================

/// Middleware for audit logging of refused requests.
#[derive(Clone)]
pub struct AuditMiddleware<S> {
    inner: S,
    logger: Arc<dyn AuditLogger>,
    portal: &'static str,
    enabled: bool,
    trust_forwarded: bool,
}

/// Builds the audit entry for a refused request.
pub fn rejection_entry(
    rejection: SecurityRejection,
    path: &str,
    user_id: &str,
    client_ip: Option<std::net::IpAddr>,
) -> AuditLog {
    let resource = AuditResource::api(path);
    match rejection {
        SecurityRejection::MissingToken | SecurityRejection::InvalidToken => {
            AuditLog::access_denied(
                AuditAction::AccessDenied,
                resource,
                user_id,
                client_ip,
                rejection.reason(),
            )
        }
        SecurityRejection::Csrf => AuditLog::access_denied(
            AuditAction::CsrfRejected,
            resource,
            user_id,
            client_ip,
            rejection.reason(),
        ),
        SecurityRejection::RateLimited { retry_after } => {
            AuditLog::rate_limited(resource, client_ip, retry_after)
        }
    }
}

impl<S> Service<Request<Body>> for AuditMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let logger = self.logger.clone();
        let portal = self.portal;
        let enabled = self.enabled;
        let path = req.uri().path().to_string();
        let client_ip = resolve_client_ip(&req, self.trust_forwarded);
        let request_id = correlation_id(&req);

        let mut inner = self.inner.clone();

        Box::pin(async move {
            let response = inner.call(req).await?;

            if !enabled {
                return Ok(response);
            }

            if let Some(rejection) = response.extensions().get::<SecurityRejection>().copied() {
                let user_id = response
                    .extensions()
                    .get::<AuthContext>()
                    .map(|ctx| ctx.principal_id().to_string())
                    .unwrap_or_else(|| "anonymous".to_string());

                let mut entry =
                    rejection_entry(rejection, &path, &user_id, client_ip).with_tag(portal);
                if let Some(id) = request_id {
                    entry = entry.with_correlation_id(id);
                }

                if let Err(e) = logger.log(entry).await {
                    tracing::warn!(error = %e, "Failed to write audit log");
                }
            }

            Ok(response)
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use remit_core::audit::{ActionResult, InMemoryAuditLogger};
    use tower::ServiceExt;

    async fn refuse_csrf(_req: Request<Body>) -> Result<Response, std::convert::Infallible> {
        let mut response = Response::new(Body::empty());
        response.extensions_mut().insert(SecurityRejection::Csrf);
        Ok(response)
    }

    async fn plain(_req: Request<Body>) -> Result<Response, std::convert::Infallible> {
        Ok(Response::new(Body::empty()))
    }

    #[test]
    fn test_rejection_entry_actions() {
        let entry = rejection_entry(SecurityRejection::MissingToken, "/api/transactions", "anonymous", None);
        assert_eq!(entry.action, AuditAction::AccessDenied);
        assert!(matches!(entry.result, ActionResult::Denied));

        let entry = rejection_entry(SecurityRejection::Csrf, "/api/transactions", "1234567890", None);
        assert_eq!(entry.action, AuditAction::CsrfRejected);

        let entry = rejection_entry(
            SecurityRejection::RateLimited { retry_after: 30 },
            "/api/auth/login",
            "anonymous",
            None,
        );
        assert_eq!(entry.action, AuditAction::RateLimited);
    }

    #[tokio::test]
    async fn test_marked_response_audited() {
        let logger = InMemoryAuditLogger::new();
        let service = AuditLayer::new(Arc::new(logger.clone()), "payments")
            .layer(tower::service_fn(refuse_csrf));

        let req = Request::builder()
            .method("POST")
            .uri("/api/transactions")
            .header("x-correlation-id", "corr-1")
            .body(Body::empty())
            .unwrap();
        service.oneshot(req).await.unwrap();

        let entries = logger.entries_for_action(AuditAction::CsrfRejected);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].correlation_id.as_deref(), Some("corr-1"));
    }

    #[tokio::test]
    async fn test_unmarked_response_ignored() {
        let logger = InMemoryAuditLogger::new();
        let service = AuditLayer::new(Arc::new(logger.clone()), "payments")
            .layer(tower::service_fn(plain));

        service
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(logger.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_layer_skips() {
        let logger = InMemoryAuditLogger::new();
        let service = AuditLayer::new(Arc::new(logger.clone()), "payments")
            .with_enabled(false)
            .layer(tower::service_fn(refuse_csrf));

        service
            .oneshot(Request::builder().uri("/x").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(logger.is_empty());
    }
}
