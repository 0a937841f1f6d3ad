// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core data types for remit.
//!
//! Customers, employees and the transaction state machine shared by both
//! portals.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::TransitionError;

// =============================================================================
// Identifiers
// =============================================================================

/// A unique identifier for a customer.
///
/// # Examples
///
/// ```
/// use remit_core::types::CustomerId;
///
/// let id = CustomerId::new();
/// assert_eq!(id.to_string().len(), 36);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(Uuid);

/// A unique identifier for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

macro_rules! uuid_id {
    ($name:ident) => {
        impl $name {
            /// Creates a new time-ordered identifier.
            #[inline]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wraps an existing UUID.
            #[inline]
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Returns the inner UUID.
            #[inline]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id!(CustomerId);
uuid_id!(TransactionId);

// =============================================================================
// TransactionStatus
// =============================================================================

/// Review state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Awaiting employee review.
    #[default]
    Pending,
    /// Approved by an employee.
    Accepted,
    /// Declined by an employee.
    Rejected,
}

impl TransactionStatus {
    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Accepted => "accepted",
            TransactionStatus::Rejected => "rejected",
        }
    }

    /// Returns `true` once the status can no longer change.
    #[inline]
    pub fn is_final(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(TransactionStatus::Pending),
            "accepted" => Ok(TransactionStatus::Accepted),
            "rejected" => Ok(TransactionStatus::Rejected),
            other => Err(format!("unknown transaction status '{}'", other)),
        }
    }
}

// =============================================================================
// ReviewDecision
// =============================================================================

/// An employee's verdict on a pending transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    /// Approve the payment.
    Accept {
        /// Employee ID of the reviewer.
        reviewer: String,
    },
    /// Decline the payment.
    Reject {
        /// Employee ID of the reviewer.
        reviewer: String,
        /// Validated, trimmed reason.
        reason: String,
    },
}

impl ReviewDecision {
    /// Returns the reviewer's employee ID.
    pub fn reviewer(&self) -> &str {
        match self {
            ReviewDecision::Accept { reviewer } | ReviewDecision::Reject { reviewer, .. } => {
                reviewer
            }
        }
    }

    /// Returns the status this decision moves a transaction to.
    pub fn target_status(&self) -> TransactionStatus {
        match self {
            ReviewDecision::Accept { .. } => TransactionStatus::Accepted,
            ReviewDecision::Reject { .. } => TransactionStatus::Rejected,
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// An international payment submitted by a customer.
///
/// Status moves from `pending` to `accepted` or `rejected` exactly once.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use remit_core::types::{CustomerId, Transaction, TransactionStatus};
/// use rust_decimal::Decimal;
///
/// let mut tx = Transaction::new(CustomerId::new(), Decimal::new(25000, 2), "USD", "DEUTDEFF");
/// tx.accept("EMP12345", Utc::now()).unwrap();
/// assert_eq!(tx.status, TransactionStatus::Accepted);
/// assert!(tx.accept("EMP12345", Utc::now()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Transaction ID.
    pub id: TransactionId,
    /// Owning customer.
    pub user_id: CustomerId,
    /// Payment amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Beneficiary bank SWIFT/BIC code.
    pub swift: String,
    /// Review state.
    pub status: TransactionStatus,
    /// Employee ID of the reviewer.
    pub reviewed_by: Option<String>,
    /// When the review happened.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reason given on rejection.
    pub rejection_reason: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Creates a new pending transaction.
    pub fn new(
        user_id: CustomerId,
        amount: Decimal,
        currency: impl Into<String>,
        swift: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            user_id,
            amount,
            currency: currency.into(),
            swift: swift.into(),
            status: TransactionStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` if the transaction awaits review.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    /// Marks the transaction accepted.
    pub fn accept(
        &mut self,
        reviewer: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        self.ensure_pending()?;
        self.status = TransactionStatus::Accepted;
        self.mark_reviewed(reviewer.into(), at);
        Ok(())
    }

    /// Marks the transaction rejected with the given reason.
    pub fn reject(
        &mut self,
        reviewer: impl Into<String>,
        reason: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        self.ensure_pending()?;
        self.status = TransactionStatus::Rejected;
        self.rejection_reason = Some(reason.into());
        self.mark_reviewed(reviewer.into(), at);
        Ok(())
    }

    /// Applies a review decision.
    pub fn apply(&mut self, decision: ReviewDecision, at: DateTime<Utc>) -> Result<(), TransitionError> {
        match decision {
            ReviewDecision::Accept { reviewer } => self.accept(reviewer, at),
            ReviewDecision::Reject { reviewer, reason } => self.reject(reviewer, reason, at),
        }
    }

    fn ensure_pending(&self) -> Result<(), TransitionError> {
        if self.is_pending() {
            Ok(())
        } else {
            Err(TransitionError::AlreadyReviewed {
                status: self.status,
            })
        }
    }

    fn mark_reviewed(&mut self, reviewer: String, at: DateTime<Utc>) {
        self.reviewed_by = Some(reviewer);
        self.reviewed_at = Some(at);
        self.updated_at = at;
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A registered payments-portal customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer ID.
    pub id: CustomerId,
    /// Full name.
    pub full_name: String,
    /// 13-digit national ID number.
    pub id_number: String,
    /// Bank account number.
    pub account_number: String,
    /// bcrypt hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Creates a new customer record from validated input.
    pub fn new(
        full_name: impl Into<String>,
        id_number: impl Into<String>,
        account_number: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: CustomerId::new(),
            full_name: full_name.into(),
            id_number: id_number.into(),
            account_number: account_number.into(),
            password_hash: password_hash.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the summary embedded in employee-facing views.
    pub fn summary(&self) -> CustomerSummary {
        CustomerSummary {
            full_name: self.full_name.clone(),
            account_number: self.account_number.clone(),
            id_number: self.id_number.clone(),
        }
    }
}

/// Customer details shown next to a transaction in the employee portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    /// Full name.
    pub full_name: String,
    /// Account number.
    pub account_number: String,
    /// ID number.
    pub id_number: String,
}

impl CustomerSummary {
    /// Placeholder for transactions whose owner no longer resolves.
    pub fn unknown() -> Self {
        Self {
            full_name: "Unknown Customer".to_string(),
            account_number: "N/A".to_string(),
            id_number: "N/A".to_string(),
        }
    }
}

// =============================================================================
// Employee
// =============================================================================

/// A bank employee allowed to review transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Internal ID.
    pub id: Uuid,
    /// Employee number such as `EMP12345`, upper-cased.
    pub employee_id: String,
    /// Full name.
    pub full_name: String,
    /// bcrypt hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    /// Creates a new employee record. The employee ID is normalized.
    pub fn new(
        employee_id: &str,
        full_name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            employee_id: crate::validation::normalize_employee_id(employee_id),
            full_name: full_name.into(),
            password_hash: password_hash.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// StatusCounts
// =============================================================================

/// Transaction totals by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// All transactions.
    pub total: u64,
    /// Awaiting review.
    pub pending: u64,
    /// Accepted.
    pub accepted: u64,
    /// Rejected.
    pub rejected: u64,
}

impl StatusCounts {
    /// Adds one transaction with the given status.
    pub fn record(&mut self, status: TransactionStatus) {
        self.total += 1;
        match status {
            TransactionStatus::Pending => self.pending += 1,
            TransactionStatus::Accepted => self.accepted += 1,
            TransactionStatus::Rejected => self.rejected += 1,
        }
    }

    /// Percentage of all transactions that were accepted, to 2 decimals.
    ///
    /// Pending transactions count toward the total. Returns 0 when there
    /// are no transactions.
    pub fn acceptance_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let rate = self.accepted as f64 / self.total as f64 * 100.0;
        (rate * 100.0).round() / 100.0
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pending() -> Transaction {
        Transaction::new(CustomerId::new(), dec!(150.00), "EUR", "DEUTDEFF500")
    }

    #[test]
    fn test_new_transaction_is_pending() {
        let tx = pending();
        assert!(tx.is_pending());
        assert!(tx.reviewed_by.is_none());
        assert_eq!(tx.created_at, tx.updated_at);
    }

    #[test]
    fn test_accept_sets_review_fields() {
        let mut tx = pending();
        let at = Utc::now();
        tx.accept("EMP00001", at).unwrap();

        assert_eq!(tx.status, TransactionStatus::Accepted);
        assert_eq!(tx.reviewed_by.as_deref(), Some("EMP00001"));
        assert_eq!(tx.reviewed_at, Some(at));
        assert!(tx.rejection_reason.is_none());
    }

    #[test]
    fn test_reject_records_reason() {
        let mut tx = pending();
        tx.reject("EMP00001", "Beneficiary bank flagged", Utc::now())
            .unwrap();

        assert_eq!(tx.status, TransactionStatus::Rejected);
        assert_eq!(tx.rejection_reason.as_deref(), Some("Beneficiary bank flagged"));
    }

    #[test]
    fn test_second_review_fails_and_leaves_state() {
        let mut tx = pending();
        tx.reject("EMP00001", "Beneficiary bank flagged", Utc::now())
            .unwrap();
        let before = tx.clone();

        let err = tx.accept("EMP00002", Utc::now()).unwrap_err();
        assert_eq!(
            err,
            TransitionError::AlreadyReviewed {
                status: TransactionStatus::Rejected
            }
        );
        assert_eq!(tx, before);
    }

    #[test]
    fn test_apply_dispatches() {
        let mut tx = pending();
        let decision = ReviewDecision::Accept {
            reviewer: "EMP00003".into(),
        };
        assert_eq!(decision.target_status(), TransactionStatus::Accepted);
        tx.apply(decision, Utc::now()).unwrap();
        assert_eq!(tx.status, TransactionStatus::Accepted);
    }

    #[test]
    fn test_transaction_wire_format() {
        let tx = pending();
        let json = serde_json::to_value(&tx).unwrap();

        assert_eq!(json["status"], "pending");
        assert_eq!(json["amount"], 150.0);
        assert!(json.get("userId").is_some());
        assert!(json.get("rejectionReason").is_some());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            "Accepted".parse::<TransactionStatus>().unwrap(),
            TransactionStatus::Accepted
        );
        assert!("done".parse::<TransactionStatus>().is_err());
        assert!(TransactionStatus::Rejected.is_final());
    }

    #[test]
    fn test_acceptance_rate() {
        let mut counts = StatusCounts::default();
        assert_eq!(counts.acceptance_rate(), 0.0);

        counts.record(TransactionStatus::Accepted);
        counts.record(TransactionStatus::Accepted);
        counts.record(TransactionStatus::Rejected);
        counts.record(TransactionStatus::Pending);

        assert_eq!(counts.total, 4);
        assert_eq!(counts.acceptance_rate(), 50.0);
    }

    #[test]
    fn test_acceptance_rate_counts_pending() {
        let mut counts = StatusCounts::default();
        counts.record(TransactionStatus::Accepted);
        for _ in 0..3 {
            counts.record(TransactionStatus::Pending);
        }
        assert_eq!(counts.acceptance_rate(), 25.0);

        counts.record(TransactionStatus::Pending);
        counts.record(TransactionStatus::Pending);
        assert_eq!(counts.acceptance_rate(), 16.67);
    }

    #[test]
    fn test_customer_summary_hides_hash() {
        let customer = Customer::new("Jane Doe", "9001015009087", "1234567890", "$2b$hash");
        let json = serde_json::to_value(&customer).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(customer.summary().account_number, "1234567890");
        assert_eq!(CustomerSummary::unknown().full_name, "Unknown Customer");
    }

    #[test]
    fn test_employee_id_normalized() {
        let employee = Employee::new(" emp12345 ", "Sam Reviewer", "$2b$hash");
        assert_eq!(employee.employee_id, "EMP12345");
    }
}
