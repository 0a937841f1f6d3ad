// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Audit logging for security events.
//!
//! Every login, registration, payment submission and review, plus every
//! request refused by the security middleware, produces an [`AuditLog`].
//!
//! # Components
//!
//! - [`AuditLogger`]: Core trait for audit logger implementations
//! - [`AuditLog`]: Structured audit log entry
//! - [`TracingAuditLogger`]: Emits entries on the `audit` tracing target
//! - [`InMemoryAuditLogger`]: Queryable in-memory logger for tests
//! - [`NoOpAuditLogger`]: Discards everything
//!
//! # Example
//!
//! ```rust,ignore
//! use remit_core::audit::{AuditLog, AuditLogger, TracingAuditLogger};
//!
//! let logger = TracingAuditLogger::new();
//! logger.log(AuditLog::system_start(env!("CARGO_PKG_VERSION"))).await?;
//! ```

mod error;
mod memory_logger;
mod tracing_logger;
mod types;

pub use error::{AuditError, AuditResult};
pub use memory_logger::InMemoryAuditLogger;
pub use tracing_logger::{AUDIT_TARGET, TracingAuditLogger};
pub use types::{ActionResult, AuditAction, AuditFilter, AuditLog, AuditResource, AuditSeverity};

use async_trait::async_trait;

// =============================================================================
// Core Trait
// =============================================================================

/// Trait for audit logger implementations.
///
/// Async-first; loggers that cannot be queried return
/// [`AuditError::QueryNotSupported`] from [`query`](Self::query).
#[async_trait]
pub trait AuditLogger: Send + Sync {
    /// Logs an audit entry.
    async fn log(&self, entry: AuditLog) -> AuditResult<()>;

    /// Logs multiple audit entries in a batch.
    ///
    /// The default implementation calls `log` for each entry.
    async fn log_batch(&self, entries: Vec<AuditLog>) -> AuditResult<()> {
        for entry in entries {
            self.log(entry).await?;
        }
        Ok(())
    }

    /// Queries audit logs with the given filter.
    async fn query(&self, filter: AuditFilter) -> AuditResult<Vec<AuditLog>>;

    /// Flushes any buffered logs.
    ///
    /// Called before shutdown.
    async fn flush(&self) -> AuditResult<()>;

    /// Returns the logger name for identification.
    fn name(&self) -> &str {
        "audit_logger"
    }

    /// Returns `true` if this logger supports querying.
    fn supports_query(&self) -> bool {
        false
    }

    /// Returns `true` if this logger is healthy.
    async fn health_check(&self) -> bool {
        true
    }
}

// =============================================================================
// No-Op Logger
// =============================================================================

/// A no-op audit logger that discards all entries.
///
/// Used when auditing is disabled in configuration.
#[derive(Debug, Default, Clone)]
pub struct NoOpAuditLogger;

impl NoOpAuditLogger {
    /// Creates a new no-op logger.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditLogger for NoOpAuditLogger {
    async fn log(&self, _entry: AuditLog) -> AuditResult<()> {
        Ok(())
    }

    async fn query(&self, _filter: AuditFilter) -> AuditResult<Vec<AuditLog>> {
        Ok(Vec::new())
    }

    async fn flush(&self) -> AuditResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "noop"
    }
}

// =============================================================================
// Tests
// =============================================================================
