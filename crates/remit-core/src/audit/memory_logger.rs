// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory audit logger for testing and development.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::AuditResult;
use super::types::{AuditAction, AuditFilter, AuditLog};
use super::AuditLogger;

// =============================================================================
// In-Memory Audit Logger
// =============================================================================

/// In-memory audit logger.
///
/// Stores entries in a shared vector and supports querying. Clones share the
/// same storage, so a test can keep a handle while the router logs into it.
///
/// # Example
///
/// ```rust,ignore
/// use remit_core::audit::{AuditAction, AuditLogger, InMemoryAuditLogger};
///
/// let logger = InMemoryAuditLogger::new();
/// logger.log(AuditLog::registration("1234567890", None)).await?;
/// assert_eq!(logger.entries_for_action(AuditAction::Register).len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryAuditLogger {
    logs: Arc<RwLock<Vec<AuditLog>>>,
    /// Maximum number of entries to keep (0 = unlimited).
    max_entries: usize,
}

impl Default for InMemoryAuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAuditLogger {
    /// Creates a new in-memory logger with unlimited capacity.
    pub fn new() -> Self {
        Self {
            logs: Arc::new(RwLock::new(Vec::new())),
            max_entries: 0,
        }
    }

    /// Creates a logger that keeps at most `max_entries`, dropping the oldest.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            logs: Arc::new(RwLock::new(Vec::with_capacity(max_entries.min(10000)))),
            max_entries,
        }
    }

    /// Returns all logged entries.
    pub fn entries(&self) -> Vec<AuditLog> {
        self.logs.read().clone()
    }

    /// Returns entries matching a predicate.
    pub fn entries_where<F>(&self, predicate: F) -> Vec<AuditLog>
    where
        F: Fn(&AuditLog) -> bool,
    {
        self.logs.read().iter().filter(|l| predicate(l)).cloned().collect()
    }

    /// Returns entries for a specific action.
    pub fn entries_for_action(&self, action: AuditAction) -> Vec<AuditLog> {
        self.entries_where(|l| l.action == action)
    }

    /// Returns entries for a specific user.
    pub fn entries_for_user(&self, user_id: &str) -> Vec<AuditLog> {
        self.entries_where(|l| l.user_id.as_deref() == Some(user_id))
    }

    /// Checks if any entry matches the predicate.
    pub fn has_entry<F>(&self, predicate: F) -> bool
    where
        F: Fn(&AuditLog) -> bool,
    {
        self.logs.read().iter().any(predicate)
    }

    /// Clears all entries.
    pub fn clear(&self) {
        self.logs.write().clear();
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.logs.read().len()
    }

    /// Returns `true` if empty.
    pub fn is_empty(&self) -> bool {
        self.logs.read().is_empty()
    }

    fn push(&self, logs: &mut Vec<AuditLog>, entry: AuditLog) {
        if self.max_entries > 0 && logs.len() >= self.max_entries {
            logs.remove(0);
        }
        logs.push(entry);
    }
}

#[async_trait]
impl AuditLogger for InMemoryAuditLogger {
    async fn log(&self, entry: AuditLog) -> AuditResult<()> {
        let mut logs = self.logs.write();
        self.push(&mut logs, entry);
        Ok(())
    }

    async fn log_batch(&self, entries: Vec<AuditLog>) -> AuditResult<()> {
        let mut logs = self.logs.write();
        for entry in entries {
            self.push(&mut logs, entry);
        }
        Ok(())
    }

    async fn query(&self, filter: AuditFilter) -> AuditResult<Vec<AuditLog>> {
        let mut results: Vec<AuditLog> = self
            .logs
            .read()
            .iter()
            .filter(|log| filter.matches(log))
            .cloned()
            .collect();

        if filter.descending {
            results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        } else {
            results.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        }

        if let Some(limit) = filter.limit {
            results.truncate(limit);
        }

        Ok(results)
    }

    async fn flush(&self) -> AuditResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }

    fn supports_query(&self) -> bool {
        true
    }
}

// =============================================================================
// Tests
// =============================================================================
