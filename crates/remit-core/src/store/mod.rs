// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Persistence traits.
//!
//! Both portals talk to storage only through these traits. A backend that
//! implements all three gets [`Store`] for free.
//!
//! # Example
//!
//! ```rust,ignore
//! use remit_core::store::{InMemoryStore, TransactionQuery, TransactionStore};
//!
//! let store = InMemoryStore::new();
//! store.insert_transaction(tx).await?;
//! let pending = store.list_transactions(TransactionQuery::pending()).await?;
//! ```

mod memory;

pub use memory::InMemoryStore;

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{
    Customer, CustomerId, Employee, ReviewDecision, StatusCounts, Transaction, TransactionId,
    TransactionStatus,
};

// =============================================================================
// TransactionQuery
// =============================================================================

/// Filter for listing transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionQuery {
    /// Only this customer's transactions.
    pub user_id: Option<CustomerId>,
    /// Only transactions in this status.
    pub status: Option<TransactionStatus>,
}

impl TransactionQuery {
    /// Matches every transaction.
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches pending transactions.
    pub fn pending() -> Self {
        Self {
            status: Some(TransactionStatus::Pending),
            ..Self::default()
        }
    }

    /// Matches one customer's transactions.
    pub fn for_customer(user_id: CustomerId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    /// Returns `true` if the transaction passes the filter.
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.user_id.is_none_or(|id| tx.user_id == id)
            && self.status.is_none_or(|status| tx.status == status)
    }
}

// =============================================================================
// Store traits
// =============================================================================

/// Customer accounts.
#[async_trait]
pub trait CustomerStore: Send + Sync + Debug {
    /// Inserts a customer.
    ///
    /// Fails with `StoreError::Duplicate` if the account number or ID number
    /// is already registered.
    async fn insert_customer(&self, customer: Customer) -> StoreResult<()>;

    /// Looks up a customer by account number.
    async fn find_customer_by_account(&self, account_number: &str)
        -> StoreResult<Option<Customer>>;

    /// Looks up a customer by ID.
    async fn get_customer(&self, id: CustomerId) -> StoreResult<Option<Customer>>;
}

/// Employee accounts.
#[async_trait]
pub trait EmployeeStore: Send + Sync + Debug {
    /// Inserts an employee. Fails with `StoreError::Duplicate` on a known employee ID.
    async fn insert_employee(&self, employee: Employee) -> StoreResult<()>;

    /// Looks up an employee by normalized employee ID.
    async fn find_employee(&self, employee_id: &str) -> StoreResult<Option<Employee>>;

    /// Number of provisioned employees.
    async fn employee_count(&self) -> StoreResult<usize>;
}

/// Payment transactions.
#[async_trait]
pub trait TransactionStore: Send + Sync + Debug {
    /// Inserts a new transaction.
    async fn insert_transaction(&self, tx: Transaction) -> StoreResult<()>;

    /// Fetches a transaction by ID.
    async fn get_transaction(&self, id: TransactionId) -> StoreResult<Option<Transaction>>;

    /// Lists matching transactions, newest first.
    async fn list_transactions(&self, query: TransactionQuery) -> StoreResult<Vec<Transaction>>;

    /// Applies a review decision atomically and returns the updated transaction.
    ///
    /// Two concurrent reviews of the same transaction cannot both succeed;
    /// the loser gets `StoreError::Transition`.
    async fn review_transaction(
        &self,
        id: TransactionId,
        decision: ReviewDecision,
    ) -> StoreResult<Transaction>;

    /// Counts transactions by status.
    async fn status_counts(&self) -> StoreResult<StatusCounts>;
}

/// Full storage backend used by the portals.
#[async_trait]
pub trait Store: CustomerStore + EmployeeStore + TransactionStore {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Returns `Ok` when the backend can serve requests.
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
