// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Audit logger that emits entries as `tracing` events on the `audit` target.
//!
//! Routing, formatting and retention are left to the subscriber, so the
//! binary decides whether audit lines go to stdout, JSON, or elsewhere.

use async_trait::async_trait;

use super::error::{AuditError, AuditResult};
use super::types::{AuditFilter, AuditLog, AuditSeverity};
use super::AuditLogger;

/// Tracing target used for audit events.
pub const AUDIT_TARGET: &str = "audit";

/// Writes each audit entry as a structured `tracing` event.
#[derive(Debug, Default, Clone)]
pub struct TracingAuditLogger {
    include_details: bool,
}

impl TracingAuditLogger {
    /// Creates a logger that omits the details payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Includes the JSON details payload in every event.
    pub fn with_details(mut self) -> Self {
        self.include_details = true;
        self
    }
}

macro_rules! emit {
    ($level:ident, $entry:expr, $details:expr) => {
        tracing::$level!(
            target: AUDIT_TARGET,
            audit_id = %$entry.id,
            action = $entry.action.as_str(),
            resource = %$entry.resource.full_path(),
            result = $entry.result.as_str(),
            user = $entry.user_id.as_deref().unwrap_or("-"),
            client_ip = ?$entry.client_ip,
            correlation_id = $entry.correlation_id.as_deref().unwrap_or("-"),
            tags = ?$entry.tags,
            details = $details,
            "audit"
        )
    };
}

#[async_trait]
impl AuditLogger for TracingAuditLogger {
    async fn log(&self, entry: AuditLog) -> AuditResult<()> {
        let details = if self.include_details && !entry.details.is_null() {
            serde_json::to_string(&entry.details)
                .map_err(|e| AuditError::serialization(e.to_string()))?
        } else {
            String::new()
        };
        let details = details.as_str();

        match entry.severity {
            AuditSeverity::Debug => emit!(debug, entry, details),
            AuditSeverity::Info | AuditSeverity::Notice => emit!(info, entry, details),
            AuditSeverity::Warning => emit!(warn, entry, details),
            AuditSeverity::Error | AuditSeverity::Critical => emit!(error, entry, details),
        }
        Ok(())
    }

    async fn query(&self, _filter: AuditFilter) -> AuditResult<Vec<AuditLog>> {
        Err(AuditError::query_not_supported(self.name()))
    }

    async fn flush(&self) -> AuditResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "tracing"
    }
}
