// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Whitelist input validation.
//!
//! Every user-supplied field is matched against an allow-list pattern before
//! it reaches the store. Functions return the first failure so API responses
//! carry a single, stable message.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::currency::is_iso_4217;
use crate::error::ValidationError;

// =============================================================================
// Patterns
// =============================================================================

const NAME_PATTERN: &str = r"^[a-zA-Z\s'-]{3,50}$";
const ID_NUMBER_PATTERN: &str = r"^\d{13}$";
const ACCOUNT_NUMBER_PATTERN: &str = r"^\d{5,15}$";
const EMPLOYEE_ID_PATTERN: &str = r"^EMP\d{5,10}$";
const CURRENCY_PATTERN: &str = r"^[A-Z]{3}$";
const SWIFT_PATTERN: &str = r"^[A-Z0-9]{8,11}$";

static NAME_RE: Lazy<Regex> = Lazy::new(|| compile(NAME_PATTERN));
static ID_NUMBER_RE: Lazy<Regex> = Lazy::new(|| compile(ID_NUMBER_PATTERN));
static ACCOUNT_NUMBER_RE: Lazy<Regex> = Lazy::new(|| compile(ACCOUNT_NUMBER_PATTERN));
static EMPLOYEE_ID_RE: Lazy<Regex> = Lazy::new(|| compile(EMPLOYEE_ID_PATTERN));
static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| compile(CURRENCY_PATTERN));
static SWIFT_RE: Lazy<Regex> = Lazy::new(|| compile(SWIFT_PATTERN));

/// Compiles one of the constant patterns above.
///
/// Only called with the literals in this module, each of which
/// `test_patterns_compile` compiles.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Failed to compile validation pattern")
}

/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Minimum rejection reason length after trimming.
pub const MIN_REJECTION_REASON_LEN: usize = 10;

/// Maximum rejection reason length.
pub const MAX_REJECTION_REASON_LEN: usize = 500;

/// Smallest amount a customer may send.
pub const MIN_AMOUNT: Decimal = Decimal::ONE;

// =============================================================================
// Field checks
// =============================================================================

/// Letters, spaces, apostrophes and hyphens, 3 to 50 characters.
pub fn is_valid_name(value: &str) -> bool {
    NAME_RE.is_match(value)
}

/// Exactly 13 digits.
pub fn is_valid_id_number(value: &str) -> bool {
    ID_NUMBER_RE.is_match(value)
}

/// 5 to 15 digits.
pub fn is_valid_account_number(value: &str) -> bool {
    ACCOUNT_NUMBER_RE.is_match(value)
}

/// At least 8 characters with an uppercase letter, a digit and a symbol.
pub fn is_strong_password(value: &str) -> bool {
    value.chars().count() >= MIN_PASSWORD_LEN
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().any(|c| !c.is_ascii_alphanumeric())
}

/// `EMP` followed by 5 to 10 digits. Expects a normalized value.
pub fn is_valid_employee_id(value: &str) -> bool {
    EMPLOYEE_ID_RE.is_match(value)
}

/// Trims and upper-cases an employee ID.
pub fn normalize_employee_id(value: &str) -> String {
    value.trim().to_ascii_uppercase()
}

/// Three upper-case letters naming an active ISO 4217 currency.
pub fn is_valid_currency(value: &str) -> bool {
    CURRENCY_RE.is_match(value) && is_iso_4217(value)
}

/// 8 to 11 upper-case alphanumerics.
pub fn is_valid_swift(value: &str) -> bool {
    SWIFT_RE.is_match(value)
}

// =============================================================================
// Registration
// =============================================================================

/// Fields submitted to the customer registration endpoint.
#[derive(Debug, Clone, Default)]
pub struct RegistrationInput<'a> {
    /// Full name.
    pub full_name: &'a str,
    /// National ID number.
    pub id_number: &'a str,
    /// Bank account number.
    pub account_number: &'a str,
    /// Plain-text password.
    pub password: &'a str,
}

/// Validates a registration, reporting the first failing field.
pub fn validate_registration(input: &RegistrationInput<'_>) -> Result<(), ValidationError> {
    if !is_valid_name(input.full_name) {
        return Err(ValidationError::new("fullName", "Invalid name"));
    }
    if !is_valid_id_number(input.id_number) {
        return Err(ValidationError::new("idNumber", "Invalid ID"));
    }
    if !is_valid_account_number(input.account_number) {
        return Err(ValidationError::new("accountNumber", "Invalid account"));
    }
    if !is_strong_password(input.password) {
        return Err(ValidationError::new("password", "Weak password"));
    }
    Ok(())
}

// =============================================================================
// Employees
// =============================================================================

/// Fields describing an employee account to provision.
#[derive(Debug, Clone, Default)]
pub struct EmployeeInput<'a> {
    /// Employee ID, normalized before checking.
    pub employee_id: &'a str,
    /// Full name.
    pub full_name: &'a str,
    /// Plain-text password.
    pub password: &'a str,
}

/// Validates an employee account, collecting every failure.
pub fn validate_employee(input: &EmployeeInput<'_>) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !is_valid_name(input.full_name) {
        errors.push(ValidationError::new(
            "fullName",
            "Invalid name format. Must be 3-50 characters (letters, spaces, apostrophes, hyphens only)",
        ));
    }
    if !is_valid_employee_id(&normalize_employee_id(input.employee_id)) {
        errors.push(ValidationError::new(
            "employeeId",
            "Invalid employee ID. Must start with 'EMP' followed by 5-10 digits",
        ));
    }
    if !is_strong_password(input.password) {
        errors.push(ValidationError::new(
            "password",
            "Weak password. Must be at least 8 characters with uppercase, number, and special character",
        ));
    }

    errors
}

// =============================================================================
// Transactions
// =============================================================================

/// Validates a new payment, reporting the first failing field.
///
/// A missing amount counts as invalid.
pub fn validate_new_transaction(
    amount: Option<Decimal>,
    currency: &str,
    swift: &str,
) -> Result<Decimal, ValidationError> {
    let amount = match amount {
        Some(amount) if amount >= MIN_AMOUNT => amount,
        _ => return Err(ValidationError::new("amount", "Invalid amount")),
    };
    if !is_valid_currency(currency) {
        return Err(ValidationError::new("currency", "Invalid currency"));
    }
    if !is_valid_swift(swift) {
        return Err(ValidationError::new("swift", "Invalid SWIFT code"));
    }
    Ok(amount)
}

/// Validates a rejection reason and returns it trimmed.
///
/// The lower bound applies to the trimmed text, the upper bound to the
/// submitted text.
pub fn validate_rejection_reason(reason: Option<&str>) -> Result<String, ValidationError> {
    let raw = reason.unwrap_or_default();
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::new("reason", "Rejection reason is required"));
    }
    if trimmed.chars().count() < MIN_REJECTION_REASON_LEN {
        return Err(ValidationError::new(
            "reason",
            "Rejection reason must be at least 10 characters",
        ));
    }
    if raw.chars().count() > MAX_REJECTION_REASON_LEN {
        return Err(ValidationError::new(
            "reason",
            "Rejection reason must be less than 500 characters",
        ));
    }
    Ok(trimmed.to_string())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_patterns_compile() {
        for pattern in [
            NAME_PATTERN,
            ID_NUMBER_PATTERN,
            ACCOUNT_NUMBER_PATTERN,
            EMPLOYEE_ID_PATTERN,
            CURRENCY_PATTERN,
            SWIFT_PATTERN,
        ] {
            assert!(Regex::new(pattern).is_ok(), "{}", pattern);
        }
    }

    fn registration<'a>() -> RegistrationInput<'a> {
        RegistrationInput {
            full_name: "Thandi O'Neil-Smith",
            id_number: "9001015009087",
            account_number: "1234567890",
            password: "Secur3!pass",
        }
    }

    #[test]
    fn test_registration_accepts_valid_input() {
        assert!(validate_registration(&registration()).is_ok());
    }

    #[test]
    fn test_registration_reports_first_failure() {
        let input = RegistrationInput {
            full_name: "J1",
            id_number: "123",
            ..registration()
        };
        assert_eq!(validate_registration(&input).unwrap_err().message, "Invalid name");

        let input = RegistrationInput {
            id_number: "12345",
            ..registration()
        };
        assert_eq!(validate_registration(&input).unwrap_err().message, "Invalid ID");

        let input = RegistrationInput {
            account_number: "12ab5",
            ..registration()
        };
        assert_eq!(validate_registration(&input).unwrap_err().message, "Invalid account");

        let input = RegistrationInput {
            password: "password",
            ..registration()
        };
        assert_eq!(validate_registration(&input).unwrap_err().message, "Weak password");
    }

    #[test]
    fn test_name_rejects_markup() {
        assert!(!is_valid_name("<script>alert(1)</script>"));
        assert!(!is_valid_name("Al"));
        assert!(is_valid_name("Ann-Marie"));
    }

    #[test]
    fn test_password_strength() {
        assert!(is_strong_password("Abcdef1!"));
        assert!(!is_strong_password("Abcde1!"));
        assert!(!is_strong_password("abcdef1!"));
        assert!(!is_strong_password("Abcdefg!"));
        assert!(!is_strong_password("Abcdefg1"));
    }

    #[test]
    fn test_employee_id() {
        assert!(is_valid_employee_id(&normalize_employee_id(" emp12345 ")));
        assert!(!is_valid_employee_id("EMP1234"));
        assert!(!is_valid_employee_id("EMP12345678901"));
        assert!(!is_valid_employee_id("ADM12345"));
    }

    #[test]
    fn test_validate_employee_collects_all() {
        let errors = validate_employee(&EmployeeInput {
            employee_id: "X1",
            full_name: "!",
            password: "weak",
        });
        assert_eq!(errors.len(), 3);

        let errors = validate_employee(&EmployeeInput {
            employee_id: "emp00042",
            full_name: "Sam Reviewer",
            password: "Rev1ew!now",
        });
        assert!(errors.is_empty());
    }

    #[test]
    fn test_new_transaction() {
        assert_eq!(
            validate_new_transaction(Some(dec!(100.50)), "USD", "DEUTDEFF").unwrap(),
            dec!(100.50)
        );
        assert_eq!(
            validate_new_transaction(None, "USD", "DEUTDEFF").unwrap_err().message,
            "Invalid amount"
        );
        assert_eq!(
            validate_new_transaction(Some(dec!(0.99)), "USD", "DEUTDEFF")
                .unwrap_err()
                .message,
            "Invalid amount"
        );
        assert_eq!(
            validate_new_transaction(Some(dec!(10)), "usd", "DEUTDEFF")
                .unwrap_err()
                .message,
            "Invalid currency"
        );
        assert_eq!(
            validate_new_transaction(Some(dec!(10)), "QQQ", "DEUTDEFF")
                .unwrap_err()
                .message,
            "Invalid currency"
        );
        assert_eq!(
            validate_new_transaction(Some(dec!(10)), "EUR", "DEUT-DEFF")
                .unwrap_err()
                .message,
            "Invalid SWIFT code"
        );
    }

    #[test]
    fn test_swift_bounds() {
        assert!(is_valid_swift("ABCDEF12"));
        assert!(is_valid_swift("ABCDEF12345"));
        assert!(!is_valid_swift("ABCDEF1"));
        assert!(!is_valid_swift("ABCDEF123456"));
        assert!(!is_valid_swift("abcdef12"));
    }

    #[test]
    fn test_rejection_reason() {
        assert_eq!(
            validate_rejection_reason(None).unwrap_err().message,
            "Rejection reason is required"
        );
        assert_eq!(
            validate_rejection_reason(Some("   ")).unwrap_err().message,
            "Rejection reason is required"
        );
        assert_eq!(
            validate_rejection_reason(Some("  too short ")).unwrap_err().message,
            "Rejection reason must be at least 10 characters"
        );
        let long = "x".repeat(501);
        assert_eq!(
            validate_rejection_reason(Some(&long)).unwrap_err().message,
            "Rejection reason must be less than 500 characters"
        );
        assert_eq!(
            validate_rejection_reason(Some("  Suspicious beneficiary  ")).unwrap(),
            "Suspicious beneficiary"
        );
        assert!(validate_rejection_reason(Some(&"y".repeat(500))).is_ok());
    }
}
