// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use remit_config::RemitConfig;
use remit_core::audit::{AuditLog, AuditLogger, NoOpAuditLogger};
use remit_core::{InMemoryStore, PasswordHasher, Store};

use crate::auth::{AuthContext, CsrfTokenStore, JwtManager, JwtSettings};
use crate::error::{ApiError, ApiResult};
use crate::middleware::LoginRateLimiter;
use crate::server::Portal;

// =============================================================================
// AppState
// =============================================================================

/// Application state for one portal.
///
/// Both portals can share the same store and audit logger; the JWT manager,
/// CSRF token store and login limiter are per portal.
#[derive(Clone)]
pub struct AppState {
    /// Which portal this state serves.
    pub portal: Portal,
    /// Full configuration.
    pub config: Arc<RemitConfig>,
    /// Persistence backend.
    pub store: Arc<dyn Store>,
    /// Audit logger.
    pub audit_logger: Arc<dyn AuditLogger>,
    /// Password hasher.
    pub hasher: Arc<PasswordHasher>,
    /// JWT manager for this portal's audience.
    pub jwt_manager: Arc<JwtManager>,
    /// Issued CSRF tokens.
    pub csrf_tokens: Arc<CsrfTokenStore>,
    /// Login attempt limiter.
    pub login_limiter: Arc<LoginRateLimiter>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder(portal: Portal) -> AppStateBuilder {
        AppStateBuilder::new(portal)
    }

    /// Returns the JWT manager.
    pub fn jwt(&self) -> &JwtManager {
        &self.jwt_manager
    }

    /// Returns the store.
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Returns the audit logger.
    pub fn audit(&self) -> &Arc<dyn AuditLogger> {
        &self.audit_logger
    }

    /// Writes an audit entry tagged with the portal and correlation ID.
    ///
    /// Audit failures are logged and never fail the request.
    pub async fn record(&self, entry: AuditLog, ctx: &AuthContext) {
        if !self.config.security.audit.enabled {
            return;
        }
        let entry = entry
            .with_tag(self.portal.as_str())
            .with_correlation_id(ctx.request_id.clone());
        if let Err(e) = self.audit_logger.log(entry).await {
            tracing::warn!(error = %e, error_type = e.error_type(), "Failed to write audit log");
        }
    }

    /// Runs a password check off the async runtime.
    pub async fn verify_password(&self, password: String, hash: Option<String>) -> ApiResult<bool> {
        let hasher = self.hasher.clone();
        let matched = tokio::task::spawn_blocking(move || match hash {
            Some(hash) => hasher.verify(&password, &hash),
            None => hasher.verify_dummy(&password),
        })
        .await?;
        Ok(matched)
    }

    /// Hashes a password off the async runtime.
    pub async fn hash_password(&self, password: String) -> ApiResult<String> {
        let hasher = self.hasher.clone();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;
        Ok(hash)
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
pub struct AppStateBuilder {
    portal: Portal,
    config: Option<Arc<RemitConfig>>,
    store: Option<Arc<dyn Store>>,
    audit_logger: Option<Arc<dyn AuditLogger>>,
    hasher: Option<Arc<PasswordHasher>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new(portal: Portal) -> Self {
        Self {
            portal,
            config: None,
            store: None,
            audit_logger: None,
            hasher: None,
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: Arc<RemitConfig>) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the store.
    pub fn store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the audit logger.
    pub fn audit_logger(mut self, logger: Arc<dyn AuditLogger>) -> Self {
        self.audit_logger = Some(logger);
        self
    }

    /// Sets the password hasher. Defaults to the configured bcrypt cost.
    pub fn hasher(mut self, hasher: Arc<PasswordHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Builds the AppState.
    ///
    /// Fails when no configuration is set or the JWT secret is missing.
    pub fn build(self) -> ApiResult<AppState> {
        let config = self
            .config
            .ok_or_else(|| ApiError::internal("configuration is required"))?;

        let settings = match self.portal {
            Portal::Payments => JwtSettings::payments(&config.security.jwt)?,
            Portal::Employee => JwtSettings::employee(&config.security.jwt)?,
        };
        let jwt_manager = Arc::new(JwtManager::new(settings)?);

        let hasher = match self.hasher {
            Some(hasher) => hasher,
            None => Arc::new(PasswordHasher::new(config.security.password.bcrypt_cost)?),
        };

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryStore::new()));
        let audit_logger = self
            .audit_logger
            .unwrap_or_else(|| Arc::new(NoOpAuditLogger));

        let csrf_tokens = Arc::new(CsrfTokenStore::new(
            config.security.csrf.token_ttl(),
            config.security.csrf.max_tokens,
        ));
        let login_limiter = Arc::new(LoginRateLimiter::new(&config.security.login_rate_limit));

        Ok(AppState {
            portal: self.portal,
            config,
            store,
            audit_logger,
            hasher,
            jwt_manager,
            csrf_tokens,
            login_limiter,
        })
    }
}
