// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # remit-core
//!
//! Domain model shared by the remit payments and employee portals.
//!
//! - **Types**: `Transaction` and its review state machine, `Customer`, `Employee`
//! - **Validation**: Whitelist rules for every user-supplied field
//! - **Currency**: ISO 4217 code table
//! - **Password**: bcrypt hashing with timing-safe unknown-user handling
//! - **Store**: Async persistence traits and an in-memory backend
//! - **Audit**: Security audit logging
//! - **Error**: Unified error hierarchy
//!
//! ## Example
//!
//! ```
//! use chrono::Utc;
//! use remit_core::types::{CustomerId, Transaction, TransactionStatus};
//! use remit_core::validation::validate_new_transaction;
//! use rust_decimal::Decimal;
//!
//! let amount = validate_new_transaction(Some(Decimal::new(1000, 0)), "ZAR", "SBZAZAJJ").unwrap();
//! let mut tx = Transaction::new(CustomerId::new(), amount, "ZAR", "SBZAZAJJ");
//!
//! tx.reject("EMP12345", "Beneficiary could not be verified", Utc::now()).unwrap();
//! assert_eq!(tx.status, TransactionStatus::Rejected);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Core Modules
// =============================================================================

pub mod error;
pub mod types;

// =============================================================================
// Rules
// =============================================================================

pub mod currency;
pub mod password;
pub mod validation;

// =============================================================================
// Infrastructure
// =============================================================================

pub mod audit;
pub mod store;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use error::*;
pub use types::*;

pub use password::PasswordHasher;
pub use store::{
    CustomerStore, EmployeeStore, InMemoryStore, Store, TransactionQuery, TransactionStore,
};

pub use audit::{
    ActionResult, AuditAction, AuditError, AuditFilter, AuditLog, AuditLogger, AuditResource,
    AuditSeverity, InMemoryAuditLogger, NoOpAuditLogger, TracingAuditLogger,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
