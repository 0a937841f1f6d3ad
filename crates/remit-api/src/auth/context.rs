// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication context.

use std::net::IpAddr;

use remit_core::CustomerId;
use serde::Serialize;
use uuid::Uuid;

use super::claims::{Claims, PrincipalKind};
use crate::error::{ApiError, ApiResult};

// =============================================================================
// Principal
// =============================================================================

/// Identity of an authenticated customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPrincipal {
    /// Customer record ID.
    pub id: CustomerId,
    /// Account number.
    pub account_number: String,
    /// National ID number.
    pub id_number: String,
    /// Full name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Identity of an authenticated employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePrincipal {
    /// Employee number.
    pub employee_id: String,
    /// Full name.
    pub full_name: String,
}

/// The caller behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Principal {
    /// No credentials presented.
    Anonymous,
    /// A customer.
    Customer(CustomerPrincipal),
    /// An employee.
    Employee(EmployeePrincipal),
}

impl Principal {
    /// Builds a principal from validated claims.
    ///
    /// Fails when claims required for the kind are missing.
    pub fn from_claims(claims: &Claims) -> ApiResult<Self> {
        let incomplete = || ApiError::unauthorized(super::jwt::INVALID_TOKEN_MESSAGE);

        match claims.kind {
            PrincipalKind::Customer => {
                let id = claims
                    .sub
                    .parse::<Uuid>()
                    .map(CustomerId::from_uuid)
                    .map_err(|_| incomplete())?;
                Ok(Principal::Customer(CustomerPrincipal {
                    id,
                    account_number: claims.account_number.clone().ok_or_else(incomplete)?,
                    id_number: claims.id_number.clone().ok_or_else(incomplete)?,
                    full_name: claims.full_name.clone(),
                }))
            }
            PrincipalKind::Employee => Ok(Principal::Employee(EmployeePrincipal {
                employee_id: claims.employee_id.clone().ok_or_else(incomplete)?,
                full_name: claims.full_name.clone().unwrap_or_default(),
            })),
        }
    }

    /// Returns the identifier used in audit entries.
    pub fn audit_id(&self) -> &str {
        match self {
            Principal::Anonymous => "anonymous",
            Principal::Customer(c) => &c.account_number,
            Principal::Employee(e) => &e.employee_id,
        }
    }
}

// =============================================================================
// AuthContext
// =============================================================================

/// Authentication context for a request.
///
/// Attached to request extensions by the auth middleware and read by
/// handlers through the `Auth` extractor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    /// Caller identity.
    pub principal: Principal,
    /// Client IP address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<IpAddr>,
    /// Correlation ID of the request.
    pub request_id: String,
}

impl AuthContext {
    /// Creates an anonymous context.
    pub fn anonymous() -> Self {
        Self {
            principal: Principal::Anonymous,
            client_ip: None,
            request_id: Uuid::now_v7().to_string(),
        }
    }

    /// Creates a context from validated claims.
    pub fn from_claims(claims: &Claims) -> ApiResult<Self> {
        Ok(Self {
            principal: Principal::from_claims(claims)?,
            client_ip: None,
            request_id: Uuid::now_v7().to_string(),
        })
    }

    /// Sets the client IP address.
    pub fn with_client_ip(mut self, ip: Option<IpAddr>) -> Self {
        self.client_ip = ip;
        self
    }

    /// Sets the correlation ID.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    /// Returns the identifier used in audit entries.
    pub fn principal_id(&self) -> &str {
        self.principal.audit_id()
    }

    /// Returns `true` if this is an anonymous context.
    pub fn is_anonymous(&self) -> bool {
        matches!(self.principal, Principal::Anonymous)
    }

    /// Returns the customer identity or a 401.
    pub fn customer(&self) -> ApiResult<&CustomerPrincipal> {
        match &self.principal {
            Principal::Customer(c) => Ok(c),
            _ => Err(ApiError::unauthorized("Missing token")),
        }
    }

    /// Returns the employee identity or a 401.
    pub fn employee(&self) -> ApiResult<&EmployeePrincipal> {
        match &self.principal {
            Principal::Employee(e) => Ok(e),
            _ => Err(ApiError::unauthorized("Missing token")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remit_core::{Customer, Employee};

    #[test]
    fn test_customer_context() {
        let customer = Customer::new("Jane Doe", "9001015009087", "1234567890", "$2b$12$hash");
        let claims = Claims::for_customer(&customer, "remit", "payments-portal", 900);
        let ctx = AuthContext::from_claims(&claims).unwrap();

        let principal = ctx.customer().unwrap();
        assert_eq!(principal.id, customer.id);
        assert_eq!(ctx.principal_id(), "1234567890");
        assert!(ctx.employee().is_err());
    }

    #[test]
    fn test_employee_context() {
        let employee = Employee::new("EMP12345", "Sam Reviewer", "$2b$12$hash");
        let claims = Claims::for_employee(&employee, "remit", "employee-portal", 900);
        let ctx = AuthContext::from_claims(&claims).unwrap();

        assert_eq!(ctx.employee().unwrap().employee_id, "EMP12345");
        assert!(ctx.customer().is_err());
    }

    #[test]
    fn test_incomplete_claims_rejected() {
        let mut claims = Claims::new(
            Uuid::now_v7().to_string(),
            PrincipalKind::Customer,
            "remit",
            "payments-portal",
            900,
        );
        assert!(AuthContext::from_claims(&claims).is_err());

        claims.account_number = Some("1234567890".into());
        claims.id_number = Some("9001015009087".into());
        assert!(AuthContext::from_claims(&claims).is_ok());
    }

    #[test]
    fn test_anonymous() {
        let ctx = AuthContext::anonymous();
        assert!(ctx.is_anonymous());
        assert_eq!(ctx.principal_id(), "anonymous");
    }
}
