// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Double-submit CSRF verification middleware.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{HeaderName, Method, Request},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use remit_config::CsrfConfig;
use tower::{Layer, Service};

use super::SecurityRejection;
use crate::auth::CsrfTokenStore;
use crate::auth::csrf::tokens_match;
use crate::error::ApiError;

/// Message returned for any CSRF failure.
pub const INVALID_CSRF_MESSAGE: &str = "Invalid CSRF token";

/// Paths that establish a session and are exempt from CSRF checks.
pub const DEFAULT_EXEMPT_PATHS: &[&str] = &["/api/auth/login", "/api/auth/register"];

// =============================================================================
// CsrfLayer
// =============================================================================

/// Layer verifying the CSRF cookie and header on state-changing requests.
#[derive(Clone)]
pub struct CsrfLayer {
    store: Arc<CsrfTokenStore>,
    settings: Arc<CsrfSettings>,
}

#[derive(Debug)]
struct CsrfSettings {
    enabled: bool,
    cookie_name: String,
    header_name: HeaderName,
    exempt_paths: HashSet<String>,
}

impl CsrfLayer {
    /// Creates a new layer.
    ///
    /// Falls back to `x-csrf-token` if the configured header name does not
    /// parse.
    pub fn new(store: Arc<CsrfTokenStore>, config: &CsrfConfig) -> Self {
        let header_name = HeaderName::from_bytes(config.header_name.to_ascii_lowercase().as_bytes())
            .unwrap_or_else(|_| HeaderName::from_static("x-csrf-token"));

        Self {
            store,
            settings: Arc::new(CsrfSettings {
                enabled: config.enabled,
                cookie_name: config.cookie_name.clone(),
                header_name,
                exempt_paths: DEFAULT_EXEMPT_PATHS.iter().map(|p| p.to_string()).collect(),
            }),
        }
    }
}

impl<S> Layer<S> for CsrfLayer {
    type Service = CsrfMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CsrfMiddleware {
            inner,
            store: self.store.clone(),
            settings: self.settings.clone(),
        }
    }
}

// =============================================================================
// CsrfMiddleware
// =============================================================================

/// Middleware verifying CSRF tokens.
#[derive(Clone)]
pub struct CsrfMiddleware<S> {
    inner: S,
    store: Arc<CsrfTokenStore>,
    settings: Arc<CsrfSettings>,
}

impl<S> CsrfMiddleware<S> {
    fn requires_check(&self, method: &Method, path: &str) -> bool {
        self.settings.enabled
            && matches!(
                *method,
                Method::POST | Method::PUT | Method::PATCH | Method::DELETE
            )
            && !self.settings.exempt_paths.contains(path)
    }

    fn verify<B>(&self, req: &Request<B>) -> bool {
        let jar = CookieJar::from_headers(req.headers());
        let Some(cookie) = jar.get(&self.settings.cookie_name) else {
            return false;
        };
        let Some(header) = req
            .headers()
            .get(&self.settings.header_name)
            .and_then(|v| v.to_str().ok())
        else {
            return false;
        };

        tokens_match(cookie.value(), header) && self.store.is_valid(cookie.value())
    }
}

impl<S> Service<Request<Body>> for CsrfMiddleware<S>
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
        let rejected =
            self.requires_check(req.method(), req.uri().path()) && !self.verify(&req);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if rejected {
                tracing::warn!(
                    method = %req.method(),
                    path = %req.uri().path(),
                    "CSRF verification failed"
                );
                let mut response = ApiError::forbidden(INVALID_CSRF_MESSAGE).into_response();
                response.extensions_mut().insert(SecurityRejection::Csrf);
                return Ok(response);
            }

            inner.call(req).await
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use std::time::Duration;
    use tower::ServiceExt;

    async fn ok(_req: Request<Body>) -> Result<Response, std::convert::Infallible> {
        Ok(Response::new(Body::empty()))
    }

    fn setup() -> (Arc<CsrfTokenStore>, CsrfLayer) {
        let store = Arc::new(CsrfTokenStore::new(Duration::from_secs(60), 100));
        let layer = CsrfLayer::new(store.clone(), &CsrfConfig::default());
        (store, layer)
    }

    fn post(cookie: Option<&str>, header: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/api/transactions");
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", format!("XSRF-TOKEN={}", cookie));
        }
        if let Some(header) = header {
            builder = builder.header("x-csrf-token", header);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_matching_issued_token_passes() {
        let (store, layer) = setup();
        let token = store.issue();
        let service = layer.layer(tower::service_fn(ok));

        let response = service.oneshot(post(Some(&token), Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_or_mismatched_rejected() {
        let (store, layer) = setup();
        let token = store.issue();
        let service = layer.layer(tower::service_fn(ok));

        for req in [
            post(None, None),
            post(Some(&token), None),
            post(None, Some(&token)),
            post(Some(&token), Some("something-else")),
        ] {
            let response = service.clone().oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
            assert_eq!(
                response.extensions().get::<SecurityRejection>(),
                Some(&SecurityRejection::Csrf)
            );
        }
    }

    #[tokio::test]
    async fn test_unissued_pair_rejected() {
        let (_store, layer) = setup();
        let service = layer.layer(tower::service_fn(ok));

        let response = service
            .oneshot(post(Some("self-made"), Some("self-made")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_safe_and_exempt_requests_skip() {
        let (_store, layer) = setup();
        let service = layer.layer(tower::service_fn(ok));

        let get = Request::builder().uri("/api/transactions").body(Body::empty()).unwrap();
        assert_eq!(service.clone().oneshot(get).await.unwrap().status(), StatusCode::OK);

        let login = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .body(Body::empty())
            .unwrap();
        assert_eq!(service.oneshot(login).await.unwrap().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_disabled() {
        let store = Arc::new(CsrfTokenStore::new(Duration::from_secs(60), 100));
        let config = CsrfConfig {
            enabled: false,
            ..Default::default()
        };
        let service = CsrfLayer::new(store, &config).layer(tower::service_fn(ok));

        let response = service.oneshot(post(None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
