// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Salted adaptive password hashing (bcrypt).
//!
//! Hashing is CPU-bound; async callers should run these methods on
//! `tokio::task::spawn_blocking`.

use once_cell::sync::OnceCell;

use crate::error::{CoreError, CoreResult};

/// Default bcrypt work factor.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Lowest cost bcrypt accepts.
pub const MIN_BCRYPT_COST: u32 = 4;

/// Highest cost bcrypt accepts.
pub const MAX_BCRYPT_COST: u32 = 31;

const DUMMY_PASSWORD: &str = "remit-dummy-password-for-timing";

/// bcrypt hasher with a fixed cost.
///
/// # Examples
///
/// ```
/// use remit_core::password::PasswordHasher;
///
/// let hasher = PasswordHasher::new(4).unwrap();
/// let hash = hasher.hash("Str0ng!pass").unwrap();
/// assert!(hasher.verify("Str0ng!pass", &hash));
/// assert!(!hasher.verify("wrong", &hash));
/// ```
#[derive(Debug)]
pub struct PasswordHasher {
    cost: u32,
    dummy_hash: OnceCell<String>,
}

impl PasswordHasher {
    /// Creates a hasher, rejecting costs outside bcrypt's range.
    pub fn new(cost: u32) -> CoreResult<Self> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
            return Err(CoreError::hashing(format!(
                "bcrypt cost must be between {} and {}, got {}",
                MIN_BCRYPT_COST, MAX_BCRYPT_COST, cost
            )));
        }
        Ok(Self {
            cost,
            dummy_hash: OnceCell::new(),
        })
    }

    /// Returns the configured cost.
    #[inline]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hashes a password with a fresh salt.
    pub fn hash(&self, password: &str) -> CoreResult<String> {
        bcrypt::hash(password, self.cost).map_err(|e| CoreError::hashing(e.to_string()))
    }

    /// Checks a password against a stored hash.
    ///
    /// Malformed hashes verify as `false`.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(password, hash) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is malformed");
                false
            }
        }
    }

    /// Spends the same work as [`verify`](Self::verify) and always returns `false`.
    ///
    /// Used when the account does not exist so response timing does not
    /// reveal whether it does.
    pub fn verify_dummy(&self, password: &str) -> bool {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| bcrypt::hash(DUMMY_PASSWORD, self.cost));
        match hash {
            Ok(hash) => {
                let _ = bcrypt::verify(password, hash);
            }
            Err(e) => tracing::warn!(error = %e, "Failed to build dummy hash"),
        }
        false
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: DEFAULT_BCRYPT_COST,
            dummy_hash: OnceCell::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new(4).unwrap();
        let hash = hasher.hash("Secur3!pass").unwrap();

        assert!(hash.starts_with("$2"));
        assert!(hasher.verify("Secur3!pass", &hash));
        assert!(!hasher.verify("Secur3!pasS", &hash));
    }

    #[test]
    fn test_salted() {
        let hasher = PasswordHasher::new(4).unwrap();
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn test_cost_bounds() {
        assert!(PasswordHasher::new(3).is_err());
        assert!(PasswordHasher::new(32).is_err());
        assert_eq!(PasswordHasher::default().cost(), 12);
    }

    #[test]
    fn test_malformed_hash_is_false() {
        let hasher = PasswordHasher::new(4).unwrap();
        assert!(!hasher.verify("anything", "not-a-hash"));
    }

    #[test]
    fn test_dummy_never_matches() {
        let hasher = PasswordHasher::new(4).unwrap();
        assert!(!hasher.verify_dummy(DUMMY_PASSWORD));
    }
}
