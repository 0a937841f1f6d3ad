// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Integration tests for the customer payments portal.
//!
//! Covers:
//! - Registration and duplicate accounts
//! - Customer login and credential failures
//! - Submitting and listing payments
//! - Payment field validation

use remit_core::AuditAction;
use remit_tests::prelude::*;

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_register_creates_customer() {
    init_test_logging();
    let portals = TestPortals::new();

    let response = portals.register(&CustomerFixtures::thandi()).await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["message"], "User registered successfully");
    assert_eq!(portals.audit().entries_for_action(AuditAction::Register).len(), 1);
}

#[tokio::test]
async fn test_register_duplicate_account_conflicts() {
    let portals = TestPortals::new();
    let customer = CustomerFixtures::thandi();

    assert_eq!(portals.register(&customer).await.status, StatusCode::CREATED);
    let second = portals.register(&customer).await;

    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.error_message(), "Account already exists");
}

#[tokio::test]
async fn test_register_rejects_invalid_fields() {
    let portals = TestPortals::new();
    let cases = [
        ("fullName", json!("R2-D2"), "Invalid name"),
        ("idNumber", json!("12345"), "Invalid ID"),
        ("accountNumber", json!("12ab"), "Invalid account"),
        ("password", json!("password"), "Weak password"),
    ];

    for (field, value, message) in cases {
        let mut body = CustomerFixtures::thandi().register_body();
        body[field] = value;

        let response = portals
            .payments()
            .post("/api/auth/register")
            .json(body)
            .send()
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", field);
        assert_eq!(response.error_message(), message, "{}", field);
        assert_eq!(response.error_code(), "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_register_rejects_malformed_json() {
    let portals = TestPortals::new();

    let response = portals
        .payments()
        .post("/api/auth/register")
        .header("content-type", "application/json")
        .send()
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_message(), "Invalid JSON");
}

#[tokio::test]
async fn test_register_rejects_oversized_body() {
    let portals = TestPortals::new();
    let mut body = CustomerFixtures::thandi().register_body();
    body["fullName"] = json!("a".repeat(portals.config().api.max_body_size + 1));

    let response = portals
        .payments()
        .post("/api/auth/register")
        .json(body)
        .send()
        .await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_returns_token_and_profile() {
    let portals = TestPortals::new();
    let customer = CustomerFixtures::thandi();
    portals.register(&customer).await;

    let response = portals
        .payments()
        .post("/api/auth/login")
        .json(customer.login_body())
        .send()
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["tokenType"], "Bearer");
    assert_eq!(response.body["expiresIn"], 900);
    assert_eq!(response.body["user"]["accountNumber"], customer.account_number);
    assert_eq!(response.body["user"]["fullName"], customer.full_name);
    assert!(response.body["user"].get("passwordHash").is_none());
    assert!(!response.token().is_empty());
}

#[tokio::test]
async fn test_login_failures_share_one_message() {
    let portals = TestPortals::new();
    let customer = CustomerFixtures::thandi();
    portals.register(&customer).await;

    let wrong_password = portals
        .payments()
        .post("/api/auth/login")
        .json(json!({ "accountNumber": customer.account_number, "password": "Wrong!Pass1" }))
        .send()
        .await;
    let unknown_account = portals
        .payments()
        .post("/api/auth/login")
        .json(json!({ "accountNumber": "5555555555", "password": customer.password }))
        .send()
        .await;
    let wrong_id = portals
        .payments()
        .post("/api/auth/login")
        .json(json!({
            "accountNumber": customer.account_number,
            "password": customer.password,
            "idNumber": "8001015009087",
        }))
        .send()
        .await;

    for response in [&wrong_password, &unknown_account, &wrong_id] {
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.error_message(), "Invalid credentials");
    }
    assert_eq!(portals.audit().entries_for_action(AuditAction::LoginFailed).len(), 3);
}

#[tokio::test]
async fn test_login_requires_fields() {
    let portals = TestPortals::new();

    let response = portals
        .payments()
        .post("/api/auth/login")
        .json(json!({ "password": "Secur3!Pass" }))
        .send()
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_message(), "Account number required");

    let response = portals
        .payments()
        .post("/api/auth/login")
        .json(json!({ "accountNumber": "1234567890" }))
        .send()
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_message(), "Password required");
}

#[tokio::test]
async fn test_me_reports_customer() {
    let portals = TestPortals::new();
    let customer = CustomerFixtures::thandi();
    let token = portals.register_and_login(&customer).await;

    let response = portals.payments().get("/api/auth/me").bearer(&token).send().await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["portal"], "payments");
    assert_eq!(response.body["user"]["accountNumber"], customer.account_number);
}

// =============================================================================
// Payments
// =============================================================================

#[tokio::test]
async fn test_submit_payment_starts_pending() {
    let portals = TestPortals::new();
    let token = portals.register_and_login(&CustomerFixtures::thandi()).await;

    let response = portals.submit_payment(&token, PaymentFixtures::valid()).await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["status"], "pending");
    assert_eq!(response.body["amount"], 1500.5);
    assert_eq!(response.body["currency"], "USD");
    assert_eq!(response.body["swift"], "SBZAZAJJ");
    assert!(response.body["reviewedBy"].is_null());
    assert_eq!(
        portals.audit().entries_for_action(AuditAction::TransactionCreate).len(),
        1
    );
}

#[tokio::test]
async fn test_customer_lists_only_own_payments() {
    let portals = TestPortals::new();
    let thandi = portals.register_and_login(&CustomerFixtures::thandi()).await;
    let pieter = portals.register_and_login(&CustomerFixtures::pieter()).await;

    portals.submit_payment(&thandi, PaymentFixtures::valid()).await;
    portals
        .submit_payment(&thandi, PaymentFixtures::with_amount(json!(250)))
        .await;
    let theirs = portals.submit_payment(&pieter, PaymentFixtures::valid()).await;

    let list = portals
        .payments()
        .get("/api/transactions")
        .bearer(&thandi)
        .send()
        .await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body["count"], 2);

    let foreign = portals
        .payments()
        .get(&format!("/api/transactions/{}", theirs.id()))
        .bearer(&thandi)
        .send()
        .await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);
    assert_eq!(foreign.error_message(), "Transaction not found");

    let own = portals
        .payments()
        .get(&format!("/api/transactions/{}", theirs.id()))
        .bearer(&pieter)
        .send()
        .await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body["id"], theirs.body["id"]);
}

#[tokio::test]
async fn test_payment_lists_newest_first() {
    let portals = TestPortals::new();
    let token = portals.register_and_login(&CustomerFixtures::thandi()).await;

    let first = portals
        .submit_payment(&token, PaymentFixtures::with_amount(json!(10)))
        .await;
    let second = portals
        .submit_payment(&token, PaymentFixtures::with_amount(json!(20)))
        .await;

    let list = portals
        .payments()
        .get("/api/transactions")
        .bearer(&token)
        .send()
        .await;
    let ids: Vec<_> = list.body["transactions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tx| tx["id"].clone())
        .collect();

    assert_eq!(ids, vec![second.body["id"].clone(), first.body["id"].clone()]);
}

#[tokio::test]
async fn test_payment_validation() {
    let portals = TestPortals::new();
    let token = portals.register_and_login(&CustomerFixtures::thandi()).await;

    let cases = [
        (PaymentFixtures::invalid_swift(), "Invalid SWIFT code"),
        (PaymentFixtures::unknown_currency(), "Invalid currency"),
        (PaymentFixtures::with_amount(json!(0.5)), "Invalid amount"),
        (PaymentFixtures::with_amount(json!(-20)), "Invalid amount"),
        (PaymentFixtures::with_amount(json!("lots")), "Invalid amount"),
        (PaymentFixtures::with_amount(json!(null)), "Invalid amount"),
    ];

    for (body, message) in cases {
        let response = portals.submit_payment(&token, body.clone()).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(response.error_message(), message, "{}", body);
    }

    let list = portals
        .payments()
        .get("/api/transactions")
        .bearer(&token)
        .send()
        .await;
    assert_eq!(list.body["count"], 0);
}

#[tokio::test]
async fn test_payment_accepts_numeric_string_amount() {
    let portals = TestPortals::new();
    let token = portals.register_and_login(&CustomerFixtures::thandi()).await;

    let response = portals
        .submit_payment(&token, PaymentFixtures::with_amount(json!("1.00")))
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["amount"], 1.0);
}

#[tokio::test]
async fn test_malformed_transaction_id() {
    let portals = TestPortals::new();
    let token = portals.register_and_login(&CustomerFixtures::thandi()).await;

    let response = portals
        .payments()
        .get("/api/transactions/not-a-uuid")
        .bearer(&token)
        .send()
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_message(), "Invalid transaction ID");
}
