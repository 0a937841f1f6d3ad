// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT claims.

use chrono::Utc;
use remit_core::{Customer, Employee};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// PrincipalKind
// =============================================================================

/// Who a token was issued to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    /// A payments-portal customer.
    Customer,
    /// A bank employee.
    Employee,
}

impl PrincipalKind {
    /// Returns the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalKind::Customer => "customer",
            PrincipalKind::Employee => "employee",
        }
    }
}

impl std::fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Claims
// =============================================================================

/// JWT claims structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Subject: customer or employee record ID.
    pub sub: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Not before (Unix timestamp).
    pub nbf: i64,
    /// Issuer.
    pub iss: String,
    /// Audience: the portal the token is valid for.
    pub aud: String,
    /// Unique token ID.
    pub jti: String,
    /// Principal kind.
    pub kind: PrincipalKind,
    /// Customer account number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    /// Customer ID number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
    /// Employee number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl Claims {
    /// Creates bare claims valid from now for `expiration_secs`.
    pub fn new(
        sub: impl Into<String>,
        kind: PrincipalKind,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        expiration_secs: i64,
    ) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: sub.into(),
            exp: now + expiration_secs,
            iat: now,
            nbf: now,
            iss: issuer.into(),
            aud: audience.into(),
            jti: Uuid::now_v7().to_string(),
            kind,
            account_number: None,
            id_number: None,
            employee_id: None,
            full_name: None,
        }
    }

    /// Creates claims for a customer.
    pub fn for_customer(
        customer: &Customer,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        expiration_secs: i64,
    ) -> Self {
        let mut claims = Self::new(
            customer.id.to_string(),
            PrincipalKind::Customer,
            issuer,
            audience,
            expiration_secs,
        );
        claims.account_number = Some(customer.account_number.clone());
        claims.id_number = Some(customer.id_number.clone());
        claims.full_name = Some(customer.full_name.clone());
        claims
    }

    /// Creates claims for an employee.
    pub fn for_employee(
        employee: &Employee,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        expiration_secs: i64,
    ) -> Self {
        let mut claims = Self::new(
            employee.id.to_string(),
            PrincipalKind::Employee,
            issuer,
            audience,
            expiration_secs,
        );
        claims.employee_id = Some(employee.employee_id.clone());
        claims.full_name = Some(employee.full_name.clone());
        claims
    }

    /// Returns `true` if the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Returns the remaining validity in seconds.
    pub fn remaining_secs(&self) -> i64 {
        (self.exp - Utc::now().timestamp()).max(0)
    }
}
