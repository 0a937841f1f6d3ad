// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Double-submit CSRF tokens.
//!
//! A token is issued by `GET /api/auth/csrf-token`, delivered in a cookie that
//! client script can read, and echoed back in a header on every state-changing
//! request. The store remembers what this portal issued so a forged pair of
//! matching values is still refused.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use dashmap::DashMap;
use parking_lot::Mutex;
use rand::RngCore;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;

/// Number of random bytes in a token.
pub const TOKEN_BYTES: usize = 32;

/// Issued CSRF tokens with their expiry.
///
/// Every token shares one lifetime, so issue order is also expiry order.
/// Once `max_tokens` are tracked the oldest token is evicted on each issue.
#[derive(Debug)]
pub struct CsrfTokenStore {
    tokens: DashMap<String, Instant>,
    order: Mutex<VecDeque<String>>,
    ttl: Duration,
    max_tokens: usize,
}

impl CsrfTokenStore {
    /// Creates a store whose tokens live for `ttl`, tracking at most
    /// `max_tokens` at a time.
    pub fn new(ttl: Duration, max_tokens: usize) -> Self {
        Self {
            tokens: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            ttl,
            max_tokens: max_tokens.max(1),
        }
    }

    /// Returns the token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a fresh token.
    pub fn issue(&self) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);
        let now = Instant::now();

        let mut order = self.order.lock();
        self.drop_expired(&mut order, now);
        let mut evicted = 0usize;
        while order.len() >= self.max_tokens {
            if let Some(oldest) = order.pop_front() {
                self.tokens.remove(&oldest);
                evicted += 1;
            }
        }
        if evicted > 0 {
            tracing::debug!(evicted, max_tokens = self.max_tokens, "CSRF token store full");
        }

        self.tokens.insert(token.clone(), now + self.ttl);
        order.push_back(token.clone());
        token
    }

    /// Returns `true` if the token was issued here and has not expired.
    pub fn is_valid(&self, token: &str) -> bool {
        match self.tokens.get(token) {
            Some(expires_at) => Instant::now() < *expires_at,
            None => false,
        }
    }

    /// Drops expired tokens.
    pub fn purge_expired(&self) {
        let mut order = self.order.lock();
        self.drop_expired(&mut order, Instant::now());
    }

    fn drop_expired(&self, order: &mut VecDeque<String>, now: Instant) {
        while let Some(oldest) = order.front() {
            let expired = self
                .tokens
                .get(oldest)
                .map(|expires_at| *expires_at <= now)
                .unwrap_or(true);
            if !expired {
                break;
            }
            if let Some(oldest) = order.pop_front() {
                self.tokens.remove(&oldest);
            }
        }
    }

    /// Number of tracked tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if no tokens are tracked.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Compares a cookie value and a header value in constant time.
pub fn tokens_match(cookie: &str, header: &str) -> bool {
    cookie.len() == header.len() && bool::from(cookie.as_bytes().ct_eq(header.as_bytes()))
}

/// Formats the `Set-Cookie` value for a token.
///
/// The cookie is deliberately readable by script.
pub fn cookie_header(name: &str, token: &str, ttl: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; SameSite=Strict; Max-Age={}",
        name,
        token,
        ttl.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
