// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Portal runtime orchestration.
//!
//! - Configuration loading and validation
//! - Shared store and audit logger setup
//! - Employee seeding
//! - Portal servers with security middleware
//! - Graceful shutdown coordination

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{info, warn};

use remit_api::{AppState, Portal, PortalServer};
use remit_config::{RemitConfig, SeedEmployee, load_config};
use remit_core::validation::{EmployeeInput, validate_employee};
use remit_core::{
    AuditLog, AuditLogger, Employee, InMemoryStore, NoOpAuditLogger, PasswordHasher, Store,
    StoreError, TracingAuditLogger,
};

use crate::cli::PortalSelection;
use crate::error::{BinError, BinResult};
use crate::shutdown::{ShutdownCoordinator, ShutdownGuard};

// =============================================================================
// RemitRuntime
// =============================================================================

/// Runs the selected portals over one shared store until shutdown.
pub struct RemitRuntime {
    config: Arc<RemitConfig>,
    portals: PortalSelection,
    shutdown: ShutdownCoordinator,
}

impl RemitRuntime {
    /// Creates a new runtime.
    pub fn new(config: RemitConfig) -> Self {
        Self {
            config: Arc::new(config),
            portals: PortalSelection::All,
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Restricts which portals are started.
    pub fn with_portals(mut self, portals: PortalSelection) -> Self {
        self.portals = portals;
        self
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Returns the portals that will be started.
    pub fn active_portals(&self) -> Vec<Portal> {
        let mut portals = Vec::with_capacity(2);
        if self.config.payments.enabled && self.portals.includes_payments() {
            portals.push(Portal::Payments);
        }
        if self.config.employee.enabled && self.portals.includes_employee() {
            portals.push(Portal::Employee);
        }
        portals
    }

    /// Runs the portals until shutdown is signaled.
    pub async fn run(self) -> BinResult<()> {
        info!(version = remit_core::VERSION, "Starting remit");

        let portals = self.active_portals();
        if portals.is_empty() {
            return Err(BinError::config(
                "No portal to start: check the enabled flags and --portal",
            ));
        }

        let components = self.initialize_components().await?;
        components
            .log(AuditLog::system_start(remit_core::VERSION).with_details(serde_json::json!({
                "portals": portals.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
            })))
            .await;

        let mut servers = JoinSet::new();
        for portal in portals {
            let state = AppState::builder(portal)
                .config(self.config.clone())
                .store(components.store.clone())
                .audit_logger(components.audit_logger.clone())
                .hasher(components.hasher.clone())
                .build()?;
            let server = PortalServer::new(state);
            let signal = self.shutdown.shutdown_signal();
            let guard = ShutdownGuard::new(self.shutdown.clone(), portal.as_str());

            servers.spawn(async move {
                let result = server.run_with_shutdown(signal.wait()).await;
                if result.is_ok() {
                    guard.disarm();
                }
                (portal, result)
            });
        }

        let shutdown = self.shutdown.clone();
        let waiter = tokio::spawn(async move { shutdown.wait_for_shutdown().await });

        let mut first_error = None;
        while let Some(joined) = servers.join_next().await {
            match joined {
                Ok((portal, Ok(()))) => info!(portal = %portal, "Portal stopped"),
                Ok((portal, Err(e))) => {
                    warn!(portal = %portal, error = %e, "Portal failed");
                    first_error.get_or_insert(
                        BinError::from(e).with_context(format!("{} portal", portal)),
                    );
                }
                Err(e) => {
                    first_error.get_or_insert(BinError::runtime(format!("portal task: {}", e)));
                }
            }
        }
        waiter.abort();

        components
            .log(AuditLog::system_shutdown(Some(match &first_error {
                Some(e) => e.to_string(),
                None => "signal".to_string(),
            })))
            .await;
        if let Err(e) = components.audit_logger.flush().await {
            warn!(error = %e, error_type = e.error_type(), "Failed to flush audit log");
        }

        info!("remit shutdown complete");

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn initialize_components(&self) -> BinResult<Components> {
        let audit_logger = self.create_audit_logger();
        let hasher = Arc::new(PasswordHasher::new(self.config.security.password.bcrypt_cost)?);
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());

        let components = Components {
            store,
            audit_logger,
            hasher,
        };
        components.seed_employees(&self.config.seed.employees).await?;

        Ok(components)
    }

    fn create_audit_logger(&self) -> Arc<dyn AuditLogger> {
        let audit = &self.config.security.audit;
        if audit.enabled {
            info!(include_details = audit.include_details, "Audit logging enabled (target: audit)");
            let logger = TracingAuditLogger::new();
            if audit.include_details {
                Arc::new(logger.with_details())
            } else {
                Arc::new(logger)
            }
        } else {
            info!("Audit logging disabled");
            Arc::new(NoOpAuditLogger)
        }
    }
}

// =============================================================================
// Components
// =============================================================================

/// Shared components handed to every portal.
pub(crate) struct Components {
    pub(crate) store: Arc<dyn Store>,
    pub(crate) audit_logger: Arc<dyn AuditLogger>,
    pub(crate) hasher: Arc<PasswordHasher>,
}

impl Components {
    async fn log(&self, entry: AuditLog) {
        if let Err(e) = self.audit_logger.log(entry).await {
            warn!(error = %e, error_type = e.error_type(), "Failed to write audit log");
        }
    }

    /// Inserts the configured employees.
    ///
    /// Plain-text passwords are checked against the employee policy and
    /// hashed; configured hashes are stored as given. Duplicate IDs are
    /// skipped with a warning.
    pub(crate) async fn seed_employees(&self, seeds: &[SeedEmployee]) -> BinResult<usize> {
        let mut inserted = 0;

        for seed in seeds {
            let plaintext = seed.password.as_ref().map(|p| p.expose());
            let errors = validate_employee(&EmployeeInput {
                employee_id: &seed.employee_id,
                full_name: &seed.full_name,
                password: plaintext.unwrap_or_default(),
            });
            // A precomputed hash has no plaintext to check.
            let first = errors
                .iter()
                .find(|e| plaintext.is_some() || e.field != "password");
            if let Some(first) = first {
                return Err(BinError::config(format!(
                    "seed employee {}: {}",
                    seed.employee_id, first.message
                )));
            }

            let hash = match (&seed.password_hash, plaintext) {
                (Some(hash), _) => hash.clone(),
                (None, Some(password)) => {
                    let hasher = self.hasher.clone();
                    let password = password.to_string();
                    tokio::task::spawn_blocking(move || hasher.hash(&password))
                        .await
                        .map_err(|e| BinError::runtime(format!("hashing task: {}", e)))??
                }
                (None, None) => {
                    return Err(BinError::config(format!(
                        "seed employee {} has no password",
                        seed.employee_id
                    )));
                }
            };

            let employee = Employee::new(&seed.employee_id, seed.full_name.clone(), hash);
            let employee_id = employee.employee_id.clone();
            match self.store.insert_employee(employee).await {
                Ok(()) => {
                    inserted += 1;
                    info!(employee_id = %employee_id, "Seeded employee");
                    self.log(AuditLog::employee_seeded(&employee_id)).await;
                }
                Err(StoreError::Duplicate { .. }) => {
                    warn!(employee_id = %employee_id, "Employee already exists, skipping");
                }
                Err(e) => {
                    return Err(BinError::init(format!(
                        "failed to seed employee {}: {}",
                        employee_id, e
                    )));
                }
            }
        }

        Ok(inserted)
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the runtime.
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<RemitConfig>,
    portals: PortalSelection,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self {
            config_path: None,
            config: None,
            portals: PortalSelection::All,
        }
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: RemitConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Restricts which portals are started.
    pub fn portals(mut self, portals: PortalSelection) -> Self {
        self.portals = portals;
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<RemitRuntime> {
        let config = match self.config {
            Some(cfg) => cfg,
            None => {
                let path = self
                    .config_path
                    .ok_or_else(|| BinError::config("No configuration provided"))?;

                load_config(&path).map_err(|e| {
                    BinError::config(format!("Failed to load config from {}: {}", path.display(), e))
                })?
            }
        };

        Ok(RemitRuntime::new(config).with_portals(self.portals))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use remit_config::SecretValue;
    use remit_core::InMemoryAuditLogger;

    fn components(audit: InMemoryAuditLogger) -> Components {
        Components {
            store: Arc::new(InMemoryStore::new()),
            audit_logger: Arc::new(audit),
            hasher: Arc::new(PasswordHasher::new(4).unwrap()),
        }
    }

    fn seed(id: &str, password: Option<&str>, hash: Option<&str>) -> SeedEmployee {
        SeedEmployee {
            employee_id: id.to_string(),
            full_name: "Thandi Nkosi".to_string(),
            password_hash: hash.map(str::to_string),
            password: password.map(SecretValue::new),
        }
    }

    #[test]
    fn test_runtime_builder_requires_config() {
        assert!(RuntimeBuilder::new().build().is_err());
    }

    #[test]
    fn test_active_portals() {
        let mut config = RemitConfig::default();
        config.employee.enabled = false;

        let runtime = RuntimeBuilder::new().config(config.clone()).build().unwrap();
        assert_eq!(runtime.active_portals(), vec![Portal::Payments]);

        let runtime = RuntimeBuilder::new()
            .config(config)
            .portals(PortalSelection::Employee)
            .build()
            .unwrap();
        assert!(runtime.active_portals().is_empty());
    }

    #[tokio::test]
    async fn test_seed_hashes_plain_passwords() {
        let audit = InMemoryAuditLogger::new();
        let components = components(audit.clone());

        let inserted = components
            .seed_employees(&[seed("emp12345", Some("Review!2024"), None)])
            .await
            .unwrap();
        assert_eq!(inserted, 1);

        let employee = components.store.find_employee("EMP12345").await.unwrap().unwrap();
        assert!(employee.password_hash.starts_with("$2"));
        assert!(components.hasher.verify("Review!2024", &employee.password_hash));
        assert_eq!(audit.len(), 1);
    }

    #[tokio::test]
    async fn test_seed_skips_duplicates() {
        let components = components(InMemoryAuditLogger::new());
        let hash = components.hasher.hash("Review!2024").unwrap();

        let inserted = components
            .seed_employees(&[
                seed("EMP12345", None, Some(&hash)),
                seed("emp12345", None, Some(&hash)),
            ])
            .await
            .unwrap();
        assert_eq!(inserted, 1);
    }

    #[tokio::test]
    async fn test_seed_rejects_weak_password() {
        let components = components(InMemoryAuditLogger::new());
        let err = components
            .seed_employees(&[seed("EMP12345", Some("weak"), None)])
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert_eq!(components.store.employee_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_seed_checks_id_format_for_hashed_entries() {
        let components = components(InMemoryAuditLogger::new());
        let hash = components.hasher.hash("Review!2024").unwrap();

        let err = components
            .seed_employees(&[seed("ADMIN", None, Some(&hash))])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid employee ID"), "{}", err);
        assert_eq!(components.store.employee_count().await.unwrap(), 0);

        let inserted = components
            .seed_employees(&[seed("emp54321", None, Some(&hash))])
            .await
            .unwrap();
        assert_eq!(inserted, 1);
    }
}
