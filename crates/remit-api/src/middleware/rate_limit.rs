// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Login rate limiting middleware.
//!
//! A fixed window per client IP caps attempts against the configured login
//! paths. Every attempt counts, successful or not.

use std::collections::HashSet;
use std::future::Future;
use std::net::IpAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Request},
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use remit_config::LoginRateLimitConfig;
use tower::{Layer, Service};

use super::SecurityRejection;
use crate::auth::resolve_client_ip;
use crate::error::ApiError;

/// Message returned once the attempts are exhausted.
pub const TOO_MANY_ATTEMPTS_MESSAGE: &str = "Too many login attempts, please try again later.";

/// Windows kept before stale ones are swept.
const CLEANUP_THRESHOLD: usize = 10_000;

// =============================================================================
// Window
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

// =============================================================================
// LoginRateLimiter
// =============================================================================

/// Outcome of one counted attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    /// Whether the attempt may proceed.
    pub allowed: bool,
    /// Attempts per window.
    pub limit: u32,
    /// Attempts left in this window.
    pub remaining: u32,
    /// Seconds until the window resets.
    pub reset_secs: u64,
}

/// Shared state for the login rate limiter.
#[derive(Debug)]
pub struct LoginRateLimiter {
    enabled: bool,
    max_attempts: u32,
    window: Duration,
    paths: HashSet<String>,
    windows: DashMap<Option<IpAddr>, Window>,
}

impl LoginRateLimiter {
    /// Creates a limiter from configuration.
    pub fn new(config: &LoginRateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            max_attempts: config.max_attempts,
            window: config.window(),
            paths: config.paths.iter().cloned().collect(),
            windows: DashMap::new(),
        }
    }

    /// Returns `true` if requests to `path` are limited.
    pub fn applies_to(&self, path: &str) -> bool {
        self.enabled && self.paths.contains(path)
    }

    /// Counts an attempt from `client_ip`.
    pub fn check(&self, client_ip: Option<IpAddr>) -> RateDecision {
        self.check_at(client_ip, Instant::now())
    }

    fn check_at(&self, client_ip: Option<IpAddr>, now: Instant) -> RateDecision {
        if self.windows.len() > CLEANUP_THRESHOLD {
            self.cleanup(now);
        }

        let mut entry = self.windows.entry(client_ip).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }
        entry.count = entry.count.saturating_add(1);

        let elapsed = now.duration_since(entry.started);
        let reset = self.window.saturating_sub(elapsed);

        RateDecision {
            allowed: entry.count <= self.max_attempts,
            limit: self.max_attempts,
            remaining: self.max_attempts.saturating_sub(entry.count),
            reset_secs: ceil_secs(reset),
        }
    }

    /// Drops windows that have already ended.
    fn cleanup(&self, now: Instant) {
        let window = self.window;
        self.windows
            .retain(|_, w| now.duration_since(w.started) < window);
    }

    /// Number of tracked clients.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

fn ceil_secs(d: Duration) -> u64 {
    let secs = d.as_secs();
    if d.subsec_nanos() > 0 { secs + 1 } else { secs.max(1) }
}

fn apply_headers(headers: &mut HeaderMap, decision: &RateDecision) {
    let pairs = [
        ("ratelimit-limit", decision.limit as u64),
        ("ratelimit-remaining", decision.remaining as u64),
        ("ratelimit-reset", decision.reset_secs),
    ];
    for (name, value) in pairs {
        if let Ok(value) = HeaderValue::from_str(&value.to_string()) {
            headers.insert(name, value);
        }
    }
}

// =============================================================================
// LoginRateLimitLayer
// =============================================================================

/// Layer for login rate limiting.
#[derive(Clone)]
pub struct LoginRateLimitLayer {
    limiter: Arc<LoginRateLimiter>,
    trust_forwarded: bool,
}

impl LoginRateLimitLayer {
    /// Creates a new layer.
    pub fn new(limiter: Arc<LoginRateLimiter>, trust_forwarded: bool) -> Self {
        Self {
            limiter,
            trust_forwarded,
        }
    }

    /// Returns the shared limiter.
    pub fn limiter(&self) -> Arc<LoginRateLimiter> {
        self.limiter.clone()
    }
}

impl<S> Layer<S> for LoginRateLimitLayer {
    type Service = LoginRateLimitMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoginRateLimitMiddleware {
            inner,
            limiter: self.limiter.clone(),
            trust_forwarded: self.trust_forwarded,
        }
    }
}

// =============================================================================
// LoginRateLimitMiddleware
// =============================================================================

/// Middleware for login rate limiting.
#[derive(Clone)]
pub struct LoginRateLimitMiddleware<S> {
    inner: S,
    limiter: Arc<LoginRateLimiter>,
    trust_forwarded: bool,
}

impl<S> Service<Request<Body>> for LoginRateLimitMiddleware<S>
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
        let limiter = self.limiter.clone();
        let trust_forwarded = self.trust_forwarded;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if !limiter.applies_to(req.uri().path()) {
                return inner.call(req).await;
            }

            let client_ip = resolve_client_ip(&req, trust_forwarded);
            let decision = limiter.check(client_ip);

            if !decision.allowed {
                tracing::warn!(
                    client_ip = ?client_ip,
                    path = %req.uri().path(),
                    retry_after = decision.reset_secs,
                    "Login rate limit exceeded"
                );
                let mut response = ApiError::rate_limit_exceeded(
                    TOO_MANY_ATTEMPTS_MESSAGE,
                    Some(decision.reset_secs),
                )
                .into_response();
                apply_headers(response.headers_mut(), &decision);
                response.extensions_mut().insert(SecurityRejection::RateLimited {
                    retry_after: decision.reset_secs,
                });
                return Ok(response);
            }

            let mut response = inner.call(req).await?;
            apply_headers(response.headers_mut(), &decision);
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
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn config(max_attempts: u32, window_secs: u64) -> LoginRateLimitConfig {
        LoginRateLimitConfig {
            max_attempts,
            window_secs,
            ..Default::default()
        }
    }

    #[test]
    fn test_fixed_window() {
        let limiter = LoginRateLimiter::new(&config(3, 60));
        let ip = Some("192.0.2.1".parse().unwrap());
        let start = Instant::now();

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check_at(ip, start);
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let decision = limiter.check_at(ip, start + Duration::from_secs(10));
        assert!(!decision.allowed);
        assert_eq!(decision.reset_secs, 50);

        // A new window starts once the old one has elapsed.
        let decision = limiter.check_at(ip, start + Duration::from_secs(61));
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 2);
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = LoginRateLimiter::new(&config(1, 60));
        let a = Some("192.0.2.1".parse().unwrap());
        let b = Some("192.0.2.2".parse().unwrap());

        assert!(limiter.check(a).allowed);
        assert!(!limiter.check(a).allowed);
        assert!(limiter.check(b).allowed);
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn test_applies_only_to_configured_paths() {
        let limiter = LoginRateLimiter::new(&config(5, 600));
        assert!(limiter.applies_to("/api/auth/login"));
        assert!(!limiter.applies_to("/api/auth/register"));

        let disabled = LoginRateLimiter::new(&LoginRateLimitConfig {
            enabled: false,
            ..Default::default()
        });
        assert!(!disabled.applies_to("/api/auth/login"));
    }

    #[tokio::test]
    async fn test_middleware_blocks_after_limit() {
        let limiter = Arc::new(LoginRateLimiter::new(&config(1, 600)));
        let service = LoginRateLimitLayer::new(limiter, false).layer(tower::service_fn(
            |_req: Request<Body>| async {
                Ok::<_, std::convert::Infallible>(Response::new(Body::empty()))
            },
        ));

        let request = || {
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .body(Body::empty())
                .unwrap()
        };

        let first = service.clone().oneshot(request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.headers()["ratelimit-limit"], "1");
        assert_eq!(first.headers()["ratelimit-remaining"], "0");

        let second = service.clone().oneshot(request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(second.headers().contains_key("retry-after"));
        assert!(matches!(
            second.extensions().get::<SecurityRejection>(),
            Some(SecurityRejection::RateLimited { .. })
        ));
    }

    #[tokio::test]
    async fn test_spoofed_forwarded_prefix_still_throttled() {
        let limiter = Arc::new(LoginRateLimiter::new(&config(2, 600)));
        let service = LoginRateLimitLayer::new(limiter.clone(), true).layer(tower::service_fn(
            |_req: Request<Body>| async {
                Ok::<_, std::convert::Infallible>(Response::new(Body::empty()))
            },
        ));

        let mut blocked = 0;
        for i in 0..10 {
            let request = Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("x-forwarded-for", format!("10.9.8.{}, 198.51.100.20", i))
                .body(Body::empty())
                .unwrap();
            let response = service.clone().oneshot(request).await.unwrap();
            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                blocked += 1;
            }
        }

        assert_eq!(blocked, 8);
        assert_eq!(limiter.tracked_clients(), 1);
    }
}
