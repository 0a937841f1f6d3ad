// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Pre-built test data.
//!
//! Every fixture passes the whitelist validators unless its name says
//! otherwise.

use remit_config::{RemitConfig, SecretValue};
use serde_json::{Value, json};

/// JWT secret shared by the test portals.
pub const TEST_JWT_SECRET: &str = "integration-test-secret-that-is-long-enough";

/// bcrypt cost used in tests. The lowest the hasher accepts.
pub const TEST_BCRYPT_COST: u32 = 4;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration fixtures.
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// A valid configuration with both portals enabled.
    pub fn default_config() -> RemitConfig {
        let mut config = RemitConfig::default();
        config.security.jwt.secret = Some(SecretValue::new(TEST_JWT_SECRET));
        config.security.password.bcrypt_cost = TEST_BCRYPT_COST;
        config
    }

    /// A configuration with login throttling set to `max_attempts`.
    pub fn with_login_limit(max_attempts: u32) -> RemitConfig {
        let mut config = Self::default_config();
        config.security.login_rate_limit.max_attempts = max_attempts;
        config
    }

    /// A configuration with CSRF checks turned off.
    pub fn without_csrf() -> RemitConfig {
        let mut config = Self::default_config();
        config.security.csrf.enabled = false;
        config
    }

    /// Minimal YAML accepted by the loader.
    pub fn minimal_yaml() -> String {
        format!(
            r#"
security:
  jwt:
    secret: "{}"
"#,
            TEST_JWT_SECRET
        )
    }
}

// =============================================================================
// Customers
// =============================================================================

/// A customer's registration details.
#[derive(Debug, Clone)]
pub struct CustomerFixture {
    /// Full name.
    pub full_name: &'static str,
    /// 13-digit national ID.
    pub id_number: &'static str,
    /// Bank account number.
    pub account_number: &'static str,
    /// Password meeting the strength policy.
    pub password: &'static str,
}

impl CustomerFixture {
    /// Body for `POST /api/auth/register`.
    pub fn register_body(&self) -> Value {
        json!({
            "fullName": self.full_name,
            "idNumber": self.id_number,
            "accountNumber": self.account_number,
            "password": self.password,
        })
    }

    /// Body for `POST /api/auth/login` on the payments portal.
    pub fn login_body(&self) -> Value {
        json!({
            "accountNumber": self.account_number,
            "password": self.password,
        })
    }
}

/// Customer fixtures.
pub struct CustomerFixtures;

impl CustomerFixtures {
    /// First test customer.
    pub fn thandi() -> CustomerFixture {
        CustomerFixture {
            full_name: "Thandi O'Neil-Smith",
            id_number: "9001015009087",
            account_number: "1234567890",
            password: "Secur3!Pass",
        }
    }

    /// Second test customer.
    pub fn pieter() -> CustomerFixture {
        CustomerFixture {
            full_name: "Pieter van Wyk",
            id_number: "8505055800081",
            account_number: "9876543210",
            password: "Anoth3r#Pass",
        }
    }
}

// =============================================================================
// Employees
// =============================================================================

/// An employee's credentials.
#[derive(Debug, Clone)]
pub struct EmployeeFixture {
    /// Employee ID.
    pub employee_id: &'static str,
    /// Display name.
    pub full_name: &'static str,
    /// Plaintext password.
    pub password: &'static str,
}

impl EmployeeFixture {
    /// Body for `POST /api/auth/login` on the employee portal.
    pub fn login_body(&self) -> Value {
        json!({
            "employeeId": self.employee_id,
            "password": self.password,
        })
    }
}

/// Employee fixtures.
pub struct EmployeeFixtures;

impl EmployeeFixtures {
    /// The reviewer seeded by [`TestPortals`](crate::common::TestPortals).
    pub fn reviewer() -> EmployeeFixture {
        EmployeeFixture {
            employee_id: "EMP12345",
            full_name: "Lerato Dlamini",
            password: "Review!2024",
        }
    }
}

// =============================================================================
// Payments
// =============================================================================

/// Payment request fixtures.
pub struct PaymentFixtures;

impl PaymentFixtures {
    /// A valid international payment.
    pub fn valid() -> Value {
        json!({ "amount": 1500.50, "currency": "USD", "swift": "SBZAZAJJ" })
    }

    /// A payment for `amount` in ZAR.
    pub fn with_amount(amount: Value) -> Value {
        json!({ "amount": amount, "currency": "ZAR", "swift": "FIRNZAJJXXX" })
    }

    /// A payment with a lower-case SWIFT code.
    pub fn invalid_swift() -> Value {
        json!({ "amount": 100, "currency": "USD", "swift": "sbzazajj" })
    }

    /// A payment in a code that is not an ISO 4217 currency.
    pub fn unknown_currency() -> Value {
        json!({ "amount": 100, "currency": "ABC", "swift": "SBZAZAJJ" })
    }
}
