// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Unified error hierarchy for remit.
//!
//! # Error Hierarchy
//!
//! ```text
//! CoreError (root)
//! ├── ValidationError  - Rejected user input (field + message)
//! ├── TransitionError  - Illegal transaction status change
//! ├── StoreError       - Persistence failures
//! └── Hashing          - Password hashing failures
//! ```
//!
//! # Examples
//!
//! ```
//! use remit_core::error::{StoreError, TransitionError};
//! use remit_core::types::TransactionStatus;
//!
//! let error: StoreError = TransitionError::AlreadyReviewed {
//!     status: TransactionStatus::Accepted,
//! }
//! .into();
//! assert_eq!(error.to_string(), "Transaction already reviewed (status: accepted)");
//! ```

use thiserror::Error;

use crate::types::TransactionStatus;

// =============================================================================
// CoreError - Root Error Type
// =============================================================================

/// The root error type for remit-core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Illegal status change.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Password hashing failure.
    #[error("Password hashing failed: {message}")]
    Hashing {
        /// Error message.
        message: String,
    },
}

impl CoreError {
    /// Creates a hashing error.
    pub fn hashing(message: impl Into<String>) -> Self {
        Self::Hashing {
            message: message.into(),
        }
    }

    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "validation",
            CoreError::Transition(_) => "transition",
            CoreError::Store(e) => e.error_type(),
            CoreError::Hashing { .. } => "hashing",
        }
    }
}

// =============================================================================
// ValidationError
// =============================================================================

/// A rejected input field.
///
/// `Display` shows only the message; the field name is carried separately so
/// API responses can report it as a detail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Field that failed.
    pub field: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

// =============================================================================
// TransitionError
// =============================================================================

/// Errors raised by the transaction state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The transaction left `pending` already.
    #[error("Transaction already reviewed (status: {status})")]
    AlreadyReviewed {
        /// Current status.
        status: TransactionStatus,
    },
}

// =============================================================================
// StoreError
// =============================================================================

/// Persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind.
        entity: &'static str,
        /// Lookup key.
        id: String,
    },

    /// A unique field already holds this value.
    #[error("Duplicate value for unique field '{field}'")]
    Duplicate {
        /// Field name.
        field: &'static str,
    },

    /// Review applied to a transaction that is no longer pending.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Backend not reachable.
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// Error message.
        message: String,
    },
}

impl StoreError {
    /// Creates a not-found error.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Creates a duplicate error.
    pub fn duplicate(field: &'static str) -> Self {
        Self::Duplicate { field }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Returns `true` if the backend may recover on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }

    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "not_found",
            StoreError::Duplicate { .. } => "duplicate",
            StoreError::Transition(_) => "transition",
            StoreError::Unavailable { .. } => "store_unavailable",
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// A Result type with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// A Result type with StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_message_reports_status() {
        let error = TransitionError::AlreadyReviewed {
            status: TransactionStatus::Rejected,
        };
        assert_eq!(
            error.to_string(),
            "Transaction already reviewed (status: rejected)"
        );
    }

    #[test]
    fn test_validation_display_is_message_only() {
        let error = ValidationError::new("swift", "Invalid SWIFT code");
        assert_eq!(error.to_string(), "Invalid SWIFT code");
        assert_eq!(error.field, "swift");
    }

    #[test]
    fn test_store_error_kinds() {
        assert!(StoreError::unavailable("down").is_retryable());
        assert!(!StoreError::duplicate("account_number").is_retryable());
        assert_eq!(StoreError::not_found("transaction", "x").error_type(), "not_found");
    }

    #[test]
    fn test_core_error_conversion() {
        let error: CoreError = StoreError::duplicate("id_number").into();
        assert_eq!(error.error_type(), "duplicate");

        let error: CoreError = ValidationError::new("amount", "Invalid amount").into();
        assert_eq!(error.error_type(), "validation");
    }
}
