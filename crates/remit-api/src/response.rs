// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use remit_core::{CustomerSummary, StatusCounts, Transaction};
use serde::{Deserialize, Serialize};

// =============================================================================
// Generic
// =============================================================================

/// A response carrying only a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

impl MessageResponse {
    /// Creates a new message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Auth
// =============================================================================

/// Successful login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse<U> {
    /// Signed JWT.
    pub token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
    /// Public profile of the logged-in principal.
    pub user: U,
}

impl<U> TokenResponse<U> {
    /// Creates a bearer token response.
    pub fn bearer(token: String, expires_in: u64, user: U) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
            user,
        }
    }
}

/// Customer profile returned on login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    /// National ID number.
    pub id_number: String,
    /// Account number.
    pub account_number: String,
    /// Full name.
    pub full_name: String,
}

/// Employee profile returned on login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeProfile {
    /// Employee number.
    pub employee_id: String,
    /// Full name.
    pub full_name: String,
}

/// CSRF token issue response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfTokenResponse {
    /// Token to echo in the CSRF header.
    pub csrf_token: String,
}

// =============================================================================
// Transactions
// =============================================================================

/// A transaction as returned to clients.
///
/// Employee views carry the owner's summary; customer views do not.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    /// The transaction.
    #[serde(flatten)]
    pub transaction: Transaction,
    /// Owner summary (employee portal only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerSummary>,
}

impl TransactionView {
    /// A view without owner details.
    pub fn plain(transaction: Transaction) -> Self {
        Self {
            transaction,
            customer: None,
        }
    }

    /// A view with owner details.
    pub fn with_customer(transaction: Transaction, customer: CustomerSummary) -> Self {
        Self {
            transaction,
            customer: Some(customer),
        }
    }
}

/// A list of transactions.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionList {
    /// Number of transactions.
    pub count: usize,
    /// Transactions, newest first.
    pub transactions: Vec<TransactionView>,
}

impl From<Vec<TransactionView>> for TransactionList {
    fn from(transactions: Vec<TransactionView>) -> Self {
        Self {
            count: transactions.len(),
            transactions,
        }
    }
}

/// Result of an accept or reject.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewResponse {
    /// Human-readable message.
    pub message: String,
    /// The updated transaction.
    pub transaction: TransactionView,
}

/// Review statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// All transactions.
    pub total: u64,
    /// Awaiting review.
    pub pending: u64,
    /// Accepted.
    pub accepted: u64,
    /// Rejected.
    pub rejected: u64,
    /// Accepted share of reviewed transactions, in percent.
    pub acceptance_rate: f64,
}

impl From<StatusCounts> for StatsResponse {
    fn from(counts: StatusCounts) -> Self {
        Self {
            total: counts.total,
            pending: counts.pending,
            accepted: counts.accepted,
            rejected: counts.rejected,
            acceptance_rate: counts.acceptance_rate(),
        }
    }
}

// =============================================================================
// Health
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status.
    pub status: String,
    /// Portal name.
    pub portal: String,
    /// Version string.
    pub version: String,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy(portal: impl Into<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            portal: portal.into(),
            version: crate::VERSION.to_string(),
        }
    }
}

/// Readiness check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Whether all components are ready.
    pub ready: bool,
    /// Component statuses.
    pub components: Vec<ComponentStatus>,
}

/// Status of a single component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentStatus {
    /// Component name.
    pub name: String,
    /// Whether the component is healthy.
    pub healthy: bool,
    /// Optional status message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use remit_core::CustomerId;
    use rust_decimal::Decimal;

    #[test]
    fn test_transaction_view_flattens() {
        let tx = Transaction::new(CustomerId::new(), Decimal::new(150, 0), "USD", "DEUTDEFF");
        let view = TransactionView::with_customer(tx, CustomerSummary::unknown());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["currency"], "USD");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["customer"]["fullName"], "Unknown Customer");

        let plain = serde_json::to_value(TransactionView::plain(view.transaction)).unwrap();
        assert!(plain.get("customer").is_none());
    }

    #[test]
    fn test_stats_from_counts() {
        let counts = StatusCounts {
            total: 4,
            pending: 1,
            accepted: 2,
            rejected: 1,
        };
        let stats = StatsResponse::from(counts);
        assert_eq!(stats.acceptance_rate, 50.0);

        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("acceptanceRate").is_some());
    }
}
