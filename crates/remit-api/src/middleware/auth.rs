// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT authentication middleware.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{Request, header},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use super::{SecurityRejection, correlation_id};
use crate::auth::{AuthContext, JwtManager, resolve_client_ip};
use crate::error::ApiError;

/// Paths every portal serves without a token.
pub const DEFAULT_PUBLIC_PATHS: &[&str] = &[
    "/health",
    "/ready",
    "/api/auth/csrf-token",
    "/api/auth/login",
    "/api/auth/register",
];

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer for JWT authentication.
///
/// Extracts the bearer token from the Authorization header, validates it
/// against the portal's [`JwtManager`] and attaches an [`AuthContext`] to the
/// request. The context is also copied onto the response for the audit layer.
#[derive(Clone)]
pub struct AuthLayer {
    jwt_manager: Arc<JwtManager>,
    public_paths: Arc<HashSet<String>>,
    trust_forwarded: bool,
}

impl AuthLayer {
    /// Creates a new auth layer with the default public paths.
    pub fn new(jwt_manager: Arc<JwtManager>) -> Self {
        Self {
            jwt_manager,
            public_paths: Arc::new(DEFAULT_PUBLIC_PATHS.iter().map(|p| p.to_string()).collect()),
            trust_forwarded: false,
        }
    }

    /// Honors `X-Forwarded-For` when resolving the client IP.
    pub fn with_trust_forwarded(mut self, trust: bool) -> Self {
        self.trust_forwarded = trust;
        self
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            jwt_manager: self.jwt_manager.clone(),
            public_paths: self.public_paths.clone(),
            trust_forwarded: self.trust_forwarded,
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware for JWT authentication.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    jwt_manager: Arc<JwtManager>,
    public_paths: Arc<HashSet<String>>,
    trust_forwarded: bool,
}

impl<S> AuthMiddleware<S> {
    fn is_public_path(&self, path: &str) -> bool {
        self.public_paths.contains(path)
    }
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
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

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let jwt_manager = self.jwt_manager.clone();
        let is_public = self.is_public_path(req.uri().path());
        let trust_forwarded = self.trust_forwarded;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let client_ip = resolve_client_ip(&req, trust_forwarded);
            let request_id = correlation_id(&req);

            let base = |ctx: AuthContext| {
                let ctx = ctx.with_client_ip(client_ip);
                match &request_id {
                    Some(id) => ctx.with_request_id(id.clone()),
                    None => ctx,
                }
            };

            if is_public {
                req.extensions_mut().insert(base(AuthContext::anonymous()));
                return inner.call(req).await;
            }

            let Some(token) = extract_bearer_token(&req) else {
                tracing::debug!(path = %req.uri().path(), "No authorization token provided");
                return Ok(rejection(
                    ApiError::unauthorized("Missing token"),
                    SecurityRejection::MissingToken,
                ));
            };

            let ctx = match jwt_manager
                .validate_token(&token)
                .and_then(|claims| AuthContext::from_claims(&claims))
            {
                Ok(ctx) => base(ctx),
                Err(e) => return Ok(rejection(e, SecurityRejection::InvalidToken)),
            };

            req.extensions_mut().insert(ctx.clone());
            let mut response = inner.call(req).await?;
            response.extensions_mut().insert(ctx);
            Ok(response)
        })
    }
}

fn rejection(error: ApiError, marker: SecurityRejection) -> Response {
    let mut response = error.into_response();
    response.extensions_mut().insert(marker);
    response
}

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token<B>(req: &Request<B>) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtSettings, PAYMENTS_AUDIENCE, PrincipalKind};
    use axum::http::{HeaderValue, StatusCode};
    use remit_core::Customer;
    use tower::ServiceExt;

    fn manager() -> Arc<JwtManager> {
        Arc::new(
            JwtManager::new(JwtSettings {
                secret: "test-secret-key-that-is-at-least-32-bytes".into(),
                issuer: "remit".into(),
                audience: PAYMENTS_AUDIENCE.into(),
                kind: PrincipalKind::Customer,
                expiration_secs: 900,
                leeway_secs: 0,
            })
            .unwrap(),
        )
    }

    async fn echo(req: Request<Body>) -> Result<Response, std::convert::Infallible> {
        let anonymous = req
            .extensions()
            .get::<AuthContext>()
            .map(|ctx| ctx.is_anonymous())
            .unwrap_or(true);
        Ok(Response::new(Body::from(if anonymous { "anon" } else { "user" })))
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut req = Request::builder().uri("/test").body(Body::empty()).unwrap();
        assert!(extract_bearer_token(&req).is_none());

        req.headers_mut()
            .insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&req).is_none());

        req.headers_mut()
            .insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(extract_bearer_token(&req).is_none());

        req.headers_mut().insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer mytoken123"),
        );
        assert_eq!(extract_bearer_token(&req), Some("mytoken123".to_string()));
    }

    #[tokio::test]
    async fn test_public_path_passes() {
        let service = AuthLayer::new(manager()).layer(tower::service_fn(echo));
        let response = service
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_and_invalid_token() {
        let service = AuthLayer::new(manager()).layer(tower::service_fn(echo));

        let response = service
            .clone()
            .oneshot(Request::builder().uri("/api/transactions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.extensions().get::<SecurityRejection>(),
            Some(&SecurityRejection::MissingToken)
        );

        let response = service
            .oneshot(
                Request::builder()
                    .uri("/api/transactions")
                    .header(header::AUTHORIZATION, "Bearer garbage")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.extensions().get::<SecurityRejection>(),
            Some(&SecurityRejection::InvalidToken)
        );
    }

    #[tokio::test]
    async fn test_valid_token_attaches_context() {
        let manager = manager();
        let customer = Customer::new("Jane Doe", "9001015009087", "1234567890", "$2b$12$hash");
        let token = manager.issue_customer(&customer).unwrap();

        let service = AuthLayer::new(manager).layer(tower::service_fn(echo));
        let response = service
            .oneshot(
                Request::builder()
                    .uri("/api/transactions")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let ctx = response.extensions().get::<AuthContext>().unwrap();
        assert_eq!(ctx.principal_id(), "1234567890");
    }
}
