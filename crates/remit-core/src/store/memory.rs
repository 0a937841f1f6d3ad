// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory store.
//!
//! Thread-safe and shared by both portals in a single process. All state sits
//! behind one `parking_lot::RwLock`, so uniqueness checks and reviews are
//! atomic. Data is lost when the store is dropped.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::types::{
    Customer, CustomerId, Employee, ReviewDecision, StatusCounts, Transaction, TransactionId,
};

use super::{CustomerStore, EmployeeStore, Store, TransactionQuery, TransactionStore};

#[derive(Debug, Default)]
struct Inner {
    customers: HashMap<CustomerId, Customer>,
    by_account: HashMap<String, CustomerId>,
    by_id_number: HashMap<String, CustomerId>,
    employees: HashMap<String, Employee>,
    transactions: HashMap<TransactionId, Transaction>,
}

/// An in-memory [`Store`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored transactions.
    pub fn transaction_count(&self) -> usize {
        self.inner.read().transactions.len()
    }

    /// Number of registered customers.
    pub fn customer_count(&self) -> usize {
        self.inner.read().customers.len()
    }
}

#[async_trait]
impl CustomerStore for InMemoryStore {
    async fn insert_customer(&self, customer: Customer) -> StoreResult<()> {
        let mut inner = self.inner.write();

        if inner.by_account.contains_key(&customer.account_number) {
            return Err(StoreError::duplicate("accountNumber"));
        }
        if inner.by_id_number.contains_key(&customer.id_number) {
            return Err(StoreError::duplicate("idNumber"));
        }

        inner
            .by_account
            .insert(customer.account_number.clone(), customer.id);
        inner
            .by_id_number
            .insert(customer.id_number.clone(), customer.id);
        debug!(customer_id = %customer.id, "Customer stored");
        inner.customers.insert(customer.id, customer);
        Ok(())
    }

    async fn find_customer_by_account(
        &self,
        account_number: &str,
    ) -> StoreResult<Option<Customer>> {
        let inner = self.inner.read();
        Ok(inner
            .by_account
            .get(account_number)
            .and_then(|id| inner.customers.get(id))
            .cloned())
    }

    async fn get_customer(&self, id: CustomerId) -> StoreResult<Option<Customer>> {
        Ok(self.inner.read().customers.get(&id).cloned())
    }
}

#[async_trait]
impl EmployeeStore for InMemoryStore {
    async fn insert_employee(&self, employee: Employee) -> StoreResult<()> {
        let mut inner = self.inner.write();
        if inner.employees.contains_key(&employee.employee_id) {
            return Err(StoreError::duplicate("employeeId"));
        }
        inner
            .employees
            .insert(employee.employee_id.clone(), employee);
        Ok(())
    }

    async fn find_employee(&self, employee_id: &str) -> StoreResult<Option<Employee>> {
        Ok(self.inner.read().employees.get(employee_id).cloned())
    }

    async fn employee_count(&self) -> StoreResult<usize> {
        Ok(self.inner.read().employees.len())
    }
}

#[async_trait]
impl TransactionStore for InMemoryStore {
    async fn insert_transaction(&self, tx: Transaction) -> StoreResult<()> {
        let mut inner = self.inner.write();
        debug!(transaction_id = %tx.id, user_id = %tx.user_id, "Transaction stored");
        inner.transactions.insert(tx.id, tx);
        Ok(())
    }

    async fn get_transaction(&self, id: TransactionId) -> StoreResult<Option<Transaction>> {
        Ok(self.inner.read().transactions.get(&id).cloned())
    }

    async fn list_transactions(&self, query: TransactionQuery) -> StoreResult<Vec<Transaction>> {
        let mut list: Vec<Transaction> = self
            .inner
            .read()
            .transactions
            .values()
            .filter(|tx| query.matches(tx))
            .cloned()
            .collect();
        // UUIDv7 breaks ties between equal timestamps in creation order.
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(list)
    }

    async fn review_transaction(
        &self,
        id: TransactionId,
        decision: ReviewDecision,
    ) -> StoreResult<Transaction> {
        let mut inner = self.inner.write();
        let tx = inner
            .transactions
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Transaction", id))?;

        tx.apply(decision, Utc::now())?;
        Ok(tx.clone())
    }

    async fn status_counts(&self) -> StoreResult<StatusCounts> {
        let inner = self.inner.read();
        let mut counts = StatusCounts::default();
        for tx in inner.transactions.values() {
            counts.record(tx.status);
        }
        Ok(counts)
    }
}

#[async_trait]
impl Store for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransitionError;
    use crate::types::TransactionStatus;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn customer(account: &str, id_number: &str) -> Customer {
        Customer::new("Jane Doe", id_number, account, "$2b$04$hash")
    }

    #[tokio::test]
    async fn test_customer_uniqueness() {
        let store = InMemoryStore::new();
        store
            .insert_customer(customer("1234567890", "9001015009087"))
            .await
            .unwrap();

        let err = store
            .insert_customer(customer("1234567890", "9001015009088"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "accountNumber" }));

        let err = store
            .insert_customer(customer("1234567891", "9001015009087"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "idNumber" }));
        assert_eq!(store.customer_count(), 1);
    }

    #[tokio::test]
    async fn test_find_customer() {
        let store = InMemoryStore::new();
        let c = customer("55555", "9001015009087");
        let id = c.id;
        store.insert_customer(c).await.unwrap();

        let found = store.find_customer_by_account("55555").await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert!(store.get_customer(id).await.unwrap().is_some());
        assert!(store.find_customer_by_account("66666").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_employee_duplicate() {
        let store = InMemoryStore::new();
        store
            .insert_employee(Employee::new("EMP00001", "Sam Reviewer", "h"))
            .await
            .unwrap();
        let err = store
            .insert_employee(Employee::new("emp00001", "Other", "h"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
        assert_eq!(store.employee_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_filters_and_orders_newest_first() {
        let store = InMemoryStore::new();
        let alice = CustomerId::new();
        let bob = CustomerId::new();

        let first = Transaction::new(alice, dec!(10), "USD", "DEUTDEFF");
        let second = Transaction::new(bob, dec!(20), "EUR", "DEUTDEFF");
        let third = Transaction::new(alice, dec!(30), "GBP", "DEUTDEFF");
        let (first_id, third_id) = (first.id, third.id);
        for tx in [first, second, third] {
            store.insert_transaction(tx).await.unwrap();
        }

        let mine = store
            .list_transactions(TransactionQuery::for_customer(alice))
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, third_id);
        assert_eq!(mine[1].id, first_id);

        let all = store.list_transactions(TransactionQuery::all()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_review_once() {
        let store = InMemoryStore::new();
        let tx = Transaction::new(CustomerId::new(), dec!(10), "USD", "DEUTDEFF");
        let id = tx.id;
        store.insert_transaction(tx).await.unwrap();

        let reviewed = store
            .review_transaction(
                id,
                ReviewDecision::Accept {
                    reviewer: "EMP00001".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(reviewed.status, TransactionStatus::Accepted);

        let err = store
            .review_transaction(
                id,
                ReviewDecision::Reject {
                    reviewer: "EMP00002".into(),
                    reason: "Changed my mind entirely".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Transition(TransitionError::AlreadyReviewed {
                status: TransactionStatus::Accepted
            })
        ));

        let pending = store
            .list_transactions(TransactionQuery::pending())
            .await
            .unwrap();
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn test_review_missing() {
        let store = InMemoryStore::new();
        let err = store
            .review_transaction(
                TransactionId::new(),
                ReviewDecision::Accept {
                    reviewer: "EMP00001".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_reviews_single_winner() {
        let store = Arc::new(InMemoryStore::new());
        let tx = Transaction::new(CustomerId::new(), dec!(10), "USD", "DEUTDEFF");
        let id = tx.id;
        store.insert_transaction(tx).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .review_transaction(
                        id,
                        ReviewDecision::Accept {
                            reviewer: format!("EMP0000{}", i),
                        },
                    )
                    .await
                    .is_ok()
            }));
        }

        let mut wins = 0;
        for handle in handles {
            if handle.await.unwrap() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
    }

    #[tokio::test]
    async fn test_status_counts() {
        let store = InMemoryStore::new();
        let tx = Transaction::new(CustomerId::new(), dec!(10), "USD", "DEUTDEFF");
        let id = tx.id;
        store.insert_transaction(tx).await.unwrap();
        store
            .insert_transaction(Transaction::new(CustomerId::new(), dec!(5), "USD", "DEUTDEFF"))
            .await
            .unwrap();
        store
            .review_transaction(
                id,
                ReviewDecision::Reject {
                    reviewer: "EMP00001".into(),
                    reason: "Sanctioned beneficiary".into(),
                },
            )
            .await
            .unwrap();

        let counts = store.status_counts().await.unwrap();
        assert_eq!(counts.total, 2);
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.rejected, 1);
        assert_eq!(store.name(), "memory");
        assert!(store.health_check().await.is_ok());
    }
}
