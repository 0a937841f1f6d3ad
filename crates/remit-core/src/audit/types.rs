// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core audit log types.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Transaction, TransactionStatus};

// =============================================================================
// Audit Log Entry
// =============================================================================

/// A single audit log entry.
///
/// Captures who did what to which resource, from where, and how it ended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    /// Unique log entry ID.
    pub id: Uuid,

    /// When the event occurred.
    pub timestamp: DateTime<Utc>,

    /// Severity level of the event.
    pub severity: AuditSeverity,

    /// Acting principal: account number, employee ID, or `anonymous`.
    pub user_id: Option<String>,

    /// Client IP address.
    pub client_ip: Option<IpAddr>,

    /// The action that was performed.
    pub action: AuditAction,

    /// The resource that was affected.
    pub resource: AuditResource,

    /// Additional details about the action.
    pub details: serde_json::Value,

    /// The result of the action.
    pub result: ActionResult,

    /// Request correlation ID.
    pub correlation_id: Option<String>,

    /// Additional tags, such as the portal name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl AuditLog {
    /// Creates a new audit log entry.
    pub fn new(action: AuditAction, resource: AuditResource, result: ActionResult) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            severity: action.default_severity(),
            user_id: None,
            client_ip: None,
            action,
            resource,
            details: serde_json::Value::Null,
            result,
            correlation_id: None,
            tags: Vec::new(),
        }
    }

    /// Sets the user information.
    pub fn with_user(mut self, user_id: impl Into<String>, client_ip: Option<IpAddr>) -> Self {
        self.user_id = Some(user_id.into());
        self.client_ip = client_ip;
        self
    }

    /// Sets the details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Sets the correlation ID.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Sets the severity.
    pub fn with_severity(mut self, severity: AuditSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Adds a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    // =========================================================================
    // Factory methods for common actions
    // =========================================================================

    /// Creates an audit log for a successful login.
    pub fn login(principal: impl Into<String>, resource: AuditResource, client_ip: Option<IpAddr>) -> Self {
        Self::new(AuditAction::Login, resource, ActionResult::Success).with_user(principal, client_ip)
    }

    /// Creates an audit log for a failed login.
    ///
    /// `reason` stays in the audit trail only; clients always see the same
    /// generic message.
    pub fn login_failed(
        principal: impl Into<String>,
        resource: AuditResource,
        client_ip: Option<IpAddr>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(AuditAction::LoginFailed, resource, ActionResult::failure(reason))
            .with_user(principal, client_ip)
    }

    /// Creates an audit log for a customer registration.
    pub fn registration(account_number: impl Into<String>, client_ip: Option<IpAddr>) -> Self {
        let account_number = account_number.into();
        Self::new(
            AuditAction::Register,
            AuditResource::customer(&account_number),
            ActionResult::Success,
        )
        .with_user(account_number, client_ip)
    }

    /// Creates an audit log for a submitted payment.
    pub fn transaction_created(
        tx: &Transaction,
        account_number: impl Into<String>,
        client_ip: Option<IpAddr>,
    ) -> Self {
        Self::new(
            AuditAction::TransactionCreate,
            AuditResource::transaction(tx.id),
            ActionResult::Success,
        )
        .with_user(account_number, client_ip)
        .with_details(serde_json::json!({
            "amount": tx.amount.to_string(),
            "currency": tx.currency,
            "swift": tx.swift,
        }))
    }

    /// Creates an audit log for a completed review.
    pub fn transaction_reviewed(
        tx: &Transaction,
        employee_id: impl Into<String>,
        client_ip: Option<IpAddr>,
    ) -> Self {
        let action = match tx.status {
            TransactionStatus::Rejected => AuditAction::TransactionReject,
            _ => AuditAction::TransactionAccept,
        };
        Self::new(action, AuditResource::transaction(tx.id), ActionResult::Success)
            .with_user(employee_id, client_ip)
            .with_details(serde_json::json!({
                "status": tx.status,
                "reason": tx.rejection_reason,
            }))
    }

    /// Creates an audit log for a review attempted on a settled transaction.
    pub fn review_conflict(
        transaction_id: impl Into<String>,
        current: TransactionStatus,
        employee_id: impl Into<String>,
        client_ip: Option<IpAddr>,
    ) -> Self {
        Self::new(
            AuditAction::ReviewConflict,
            AuditResource::new("transaction", transaction_id),
            ActionResult::rejected(format!("already {}", current)),
        )
        .with_user(employee_id, client_ip)
    }

    /// Creates an audit log for a seeded employee account.
    pub fn employee_seeded(employee_id: impl Into<String>) -> Self {
        let employee_id = employee_id.into();
        Self::new(
            AuditAction::EmployeeSeed,
            AuditResource::employee(&employee_id),
            ActionResult::Success,
        )
        .with_user("system", None)
    }

    /// Creates an audit log for system start.
    pub fn system_start(version: impl Into<String>) -> Self {
        Self::new(
            AuditAction::SystemStart,
            AuditResource::system(),
            ActionResult::Success,
        )
        .with_details(serde_json::json!({
            "version": version.into(),
        }))
    }

    /// Creates an audit log for system shutdown.
    pub fn system_shutdown(reason: Option<String>) -> Self {
        let details = match reason {
            Some(r) => serde_json::json!({ "reason": r }),
            None => serde_json::Value::Null,
        };

        Self::new(
            AuditAction::SystemShutdown,
            AuditResource::system(),
            ActionResult::Success,
        )
        .with_details(details)
    }

    /// Creates an audit log for a request refused by the security pipeline.
    pub fn access_denied(
        action: AuditAction,
        resource: AuditResource,
        user_id: impl Into<String>,
        client_ip: Option<IpAddr>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(action, resource, ActionResult::Denied)
            .with_user(user_id, client_ip)
            .with_details(serde_json::json!({
                "reason": reason.into(),
            }))
            .with_severity(AuditSeverity::Warning)
    }

    /// Creates an audit log for a throttled request.
    pub fn rate_limited(
        resource: AuditResource,
        client_ip: Option<IpAddr>,
        retry_after_secs: u64,
    ) -> Self {
        Self::new(
            AuditAction::RateLimited,
            resource,
            ActionResult::rejected("rate limit exceeded"),
        )
        .with_user("anonymous", client_ip)
        .with_details(serde_json::json!({
            "retry_after_secs": retry_after_secs,
        }))
    }
}

// =============================================================================
// Audit Severity
// =============================================================================

/// Severity level for audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuditSeverity {
    /// Detailed information for debugging.
    Debug,
    /// Normal operations.
    #[default]
    Info,
    /// Normal but significant events.
    Notice,
    /// Potentially harmful situations.
    Warning,
    /// Error events.
    Error,
    /// Critical conditions.
    Critical,
}

impl AuditSeverity {
    /// Returns the severity level as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditSeverity::Debug => "debug",
            AuditSeverity::Info => "info",
            AuditSeverity::Notice => "notice",
            AuditSeverity::Warning => "warning",
            AuditSeverity::Error => "error",
            AuditSeverity::Critical => "critical",
        }
    }

    /// Returns the numeric level (higher = more severe).
    pub fn level(&self) -> u8 {
        match self {
            AuditSeverity::Debug => 0,
            AuditSeverity::Info => 1,
            AuditSeverity::Notice => 2,
            AuditSeverity::Warning => 3,
            AuditSeverity::Error => 4,
            AuditSeverity::Critical => 5,
        }
    }
}

impl std::fmt::Display for AuditSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Audit Action
// =============================================================================

/// Types of auditable actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    // =========================================================================
    // Authentication
    // =========================================================================
    /// Customer registration.
    Register,
    /// Successful login.
    Login,
    /// Failed login attempt.
    LoginFailed,

    // =========================================================================
    // Transactions
    // =========================================================================
    /// Customer submitted a payment.
    TransactionCreate,
    /// Employee accepted a payment.
    TransactionAccept,
    /// Employee rejected a payment.
    TransactionReject,
    /// Review attempted on a transaction that was already reviewed.
    ReviewConflict,

    // =========================================================================
    // Security
    // =========================================================================
    /// Missing or invalid bearer token.
    AccessDenied,
    /// Missing or mismatched anti-forgery token.
    CsrfRejected,
    /// Login throttled.
    RateLimited,
    /// Employee account provisioned from configuration.
    EmployeeSeed,

    // =========================================================================
    // System
    // =========================================================================
    /// System started.
    SystemStart,
    /// System shutdown.
    SystemShutdown,
}

impl AuditAction {
    /// Returns the action name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Register => "register",
            AuditAction::Login => "login",
            AuditAction::LoginFailed => "login_failed",
            AuditAction::TransactionCreate => "transaction_create",
            AuditAction::TransactionAccept => "transaction_accept",
            AuditAction::TransactionReject => "transaction_reject",
            AuditAction::ReviewConflict => "review_conflict",
            AuditAction::AccessDenied => "access_denied",
            AuditAction::CsrfRejected => "csrf_rejected",
            AuditAction::RateLimited => "rate_limited",
            AuditAction::EmployeeSeed => "employee_seed",
            AuditAction::SystemStart => "system_start",
            AuditAction::SystemShutdown => "system_shutdown",
        }
    }

    /// Returns `true` if this is a security-sensitive action.
    pub fn is_security_sensitive(&self) -> bool {
        matches!(
            self,
            AuditAction::Register
                | AuditAction::Login
                | AuditAction::LoginFailed
                | AuditAction::AccessDenied
                | AuditAction::CsrfRejected
                | AuditAction::RateLimited
                | AuditAction::EmployeeSeed
        )
    }

    /// Returns `true` if the action changed a transaction.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            AuditAction::TransactionCreate
                | AuditAction::TransactionAccept
                | AuditAction::TransactionReject
        )
    }

    /// Returns the default severity for this action.
    pub fn default_severity(&self) -> AuditSeverity {
        match self {
            AuditAction::Login | AuditAction::Register | AuditAction::TransactionCreate => {
                AuditSeverity::Info
            }
            AuditAction::LoginFailed
            | AuditAction::AccessDenied
            | AuditAction::CsrfRejected
            | AuditAction::RateLimited
            | AuditAction::ReviewConflict => AuditSeverity::Warning,
            AuditAction::TransactionAccept
            | AuditAction::TransactionReject
            | AuditAction::EmployeeSeed
            | AuditAction::SystemStart
            | AuditAction::SystemShutdown => AuditSeverity::Notice,
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Audit Resource
// =============================================================================

/// The resource that was affected by an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResource {
    /// Resource type.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: String,
}

impl AuditResource {
    /// Creates a new audit resource.
    pub fn new(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
        }
    }

    /// Creates a customer resource keyed by account number.
    pub fn customer(account_number: impl Into<String>) -> Self {
        Self::new("customer", account_number)
    }

    /// Creates an employee resource.
    pub fn employee(employee_id: impl Into<String>) -> Self {
        Self::new("employee", employee_id)
    }

    /// Creates a transaction resource.
    pub fn transaction(id: impl ToString) -> Self {
        Self::new("transaction", id.to_string())
    }

    /// Creates an API endpoint resource.
    pub fn api(endpoint: impl Into<String>) -> Self {
        Self::new("api", endpoint)
    }

    /// Creates a system resource.
    pub fn system() -> Self {
        Self::new("system", "remit")
    }

    /// Returns `type:id`.
    pub fn full_path(&self) -> String {
        format!("{}:{}", self.resource_type, self.resource_id)
    }
}

// =============================================================================
// Action Result
// =============================================================================

/// The result of an audited action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ActionResult {
    /// Action completed successfully.
    #[serde(rename = "success")]
    Success,
    /// Action failed.
    #[serde(rename = "failure")]
    Failure {
        /// Reason for failure.
        reason: String,
    },
    /// Action was denied (authentication or CSRF).
    #[serde(rename = "denied")]
    Denied,
    /// Action was rejected (rate limiting, invalid transition).
    #[serde(rename = "rejected")]
    Rejected {
        /// Reason for rejection.
        reason: String,
    },
}

impl ActionResult {
    /// Creates a failure result.
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    /// Creates a rejected result.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// Returns `true` if the action was successful.
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success)
    }

    /// Returns `true` if the action was denied.
    pub fn is_denied(&self) -> bool {
        matches!(self, ActionResult::Denied)
    }

    /// Returns `true` if the action failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, ActionResult::Failure { .. })
    }

    /// Short label for log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionResult::Success => "success",
            ActionResult::Failure { .. } => "failure",
            ActionResult::Denied => "denied",
            ActionResult::Rejected { .. } => "rejected",
        }
    }
}

// =============================================================================
// Audit Filter
// =============================================================================

/// Filter for querying audit logs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditFilter {
    /// Filter by user ID.
    pub user_id: Option<String>,
    /// Filter by action type.
    pub action: Option<AuditAction>,
    /// Filter by resource type.
    pub resource_type: Option<String>,
    /// Filter by resource ID.
    pub resource_id: Option<String>,
    /// Filter by minimum severity.
    pub min_severity: Option<AuditSeverity>,
    /// Start time (inclusive).
    pub from: Option<DateTime<Utc>>,
    /// End time (exclusive).
    pub to: Option<DateTime<Utc>>,
    /// Filter by correlation ID.
    pub correlation_id: Option<String>,
    /// Filter by tag.
    pub tag: Option<String>,
    /// Maximum number of results.
    pub limit: Option<usize>,
    /// Sort order (true = descending by timestamp).
    #[serde(default)]
    pub descending: bool,
}

impl AuditFilter {
    /// Creates a new empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by user ID.
    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Filters by action.
    pub fn action(mut self, action: AuditAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Filters by resource.
    pub fn resource(mut self, resource: &AuditResource) -> Self {
        self.resource_type = Some(resource.resource_type.clone());
        self.resource_id = Some(resource.resource_id.clone());
        self
    }

    /// Filters by minimum severity.
    pub fn min_severity(mut self, severity: AuditSeverity) -> Self {
        self.min_severity = Some(severity);
        self
    }

    /// Filters by time range.
    pub fn time_range(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    /// Filters by correlation ID.
    pub fn correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Filters by tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Sets the limit.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets descending order.
    pub fn descending(mut self) -> Self {
        self.descending = true;
        self
    }

    /// Checks if a log entry matches this filter.
    pub fn matches(&self, log: &AuditLog) -> bool {
        if let Some(ref user_id) = self.user_id {
            if log.user_id.as_ref() != Some(user_id) {
                return false;
            }
        }

        if let Some(action) = self.action {
            if log.action != action {
                return false;
            }
        }

        if let Some(ref resource_type) = self.resource_type {
            if &log.resource.resource_type != resource_type {
                return false;
            }
        }

        if let Some(ref resource_id) = self.resource_id {
            if &log.resource.resource_id != resource_id {
                return false;
            }
        }

        if let Some(min_severity) = self.min_severity {
            if log.severity.level() < min_severity.level() {
                return false;
            }
        }

        if let Some(from) = self.from {
            if log.timestamp < from {
                return false;
            }
        }

        if let Some(to) = self.to {
            if log.timestamp >= to {
                return false;
            }
        }

        if let Some(ref correlation_id) = self.correlation_id {
            if log.correlation_id.as_ref() != Some(correlation_id) {
                return false;
            }
        }

        if let Some(ref tag) = self.tag {
            if !log.tags.contains(tag) {
                return false;
            }
        }

        true
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CustomerId;
    use rust_decimal_macros::dec;

    #[test]
    fn test_audit_log_creation() {
        let log = AuditLog::new(
            AuditAction::TransactionCreate,
            AuditResource::transaction("tx-1"),
            ActionResult::Success,
        );

        assert!(log.result.is_success());
        assert_eq!(log.severity, AuditSeverity::Info);
        assert_eq!(log.resource.full_path(), "transaction:tx-1");
    }

    #[test]
    fn test_login_failed_keeps_reason_internal() {
        let log = AuditLog::login_failed(
            "1234567890",
            AuditResource::customer("1234567890"),
            None,
            "unknown account",
        );
        assert_eq!(log.action, AuditAction::LoginFailed);
        assert_eq!(log.severity, AuditSeverity::Warning);
        assert!(log.result.is_failure());
    }

    #[test]
    fn test_reviewed_picks_action_from_status() {
        let mut tx = Transaction::new(CustomerId::new(), dec!(10), "USD", "DEUTDEFF");
        tx.reject("EMP00001", "Sanctioned beneficiary", Utc::now())
            .unwrap();

        let log = AuditLog::transaction_reviewed(&tx, "EMP00001", None);
        assert_eq!(log.action, AuditAction::TransactionReject);
        assert_eq!(log.details["status"], "rejected");
        assert_eq!(log.severity, AuditSeverity::Notice);
    }

    #[test]
    fn test_audit_filter() {
        let log = AuditLog::new(
            AuditAction::TransactionAccept,
            AuditResource::transaction("tx-9"),
            ActionResult::Success,
        )
        .with_user("EMP00001", None)
        .with_tag("employee");

        let filter = AuditFilter::new()
            .user("EMP00001")
            .action(AuditAction::TransactionAccept)
            .tag("employee");
        assert!(filter.matches(&log));

        assert!(!AuditFilter::new().user("EMP00002").matches(&log));
        assert!(!AuditFilter::new().tag("payments").matches(&log));
    }

    #[test]
    fn test_action_properties() {
        assert!(AuditAction::LoginFailed.is_security_sensitive());
        assert!(AuditAction::TransactionReject.is_write());
        assert!(!AuditAction::Login.is_write());
        assert_eq!(AuditAction::CsrfRejected.as_str(), "csrf_rejected");
    }

    #[test]
    fn test_result_serialization() {
        let json = serde_json::to_value(ActionResult::rejected("too many")).unwrap();
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["reason"], "too many");
    }
}
