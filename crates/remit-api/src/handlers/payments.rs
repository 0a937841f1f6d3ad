// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Customer transaction handlers (payments portal).

use std::str::FromStr;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use remit_core::audit::AuditLog;
use remit_core::validation::validate_new_transaction;
use remit_core::{Transaction, TransactionQuery};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, TransactionPath, ValidatedJson};
use crate::response::{TransactionList, TransactionView};
use crate::state::AppState;

/// New payment request body.
///
/// `amount` is kept loose so that numeric strings are accepted and any other
/// shape maps to `Invalid amount` instead of a decode error.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateTransactionRequest {
    /// Amount as a JSON number or numeric string.
    pub amount: Value,
    /// ISO 4217 currency code.
    pub currency: String,
    /// SWIFT/BIC of the beneficiary bank.
    pub swift: String,
}

/// Parses a JSON amount into a decimal.
pub fn parse_amount(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// GET /api/transactions
///
/// Lists the caller's own transactions, newest first.
pub async fn list_own(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> ApiResult<impl IntoResponse> {
    let customer = ctx.customer()?;
    let transactions = state
        .store()
        .list_transactions(TransactionQuery::for_customer(customer.id))
        .await?;

    let views: Vec<TransactionView> = transactions.into_iter().map(TransactionView::plain).collect();
    Ok(Json(TransactionList::from(views)))
}

/// POST /api/transactions
pub async fn create(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(request): ValidatedJson<CreateTransactionRequest>,
) -> ApiResult<impl IntoResponse> {
    let customer = ctx.customer()?;

    let amount = validate_new_transaction(
        parse_amount(&request.amount),
        &request.currency,
        &request.swift,
    )?;

    let tx = Transaction::new(customer.id, amount, request.currency, request.swift);
    state.store().insert_transaction(tx.clone()).await?;

    state
        .record(
            AuditLog::transaction_created(&tx, &customer.account_number, ctx.client_ip),
            &ctx,
        )
        .await;
    tracing::info!(
        transaction_id = %tx.id,
        account = %customer.account_number,
        amount = %tx.amount,
        currency = %tx.currency,
        "Transaction created"
    );

    Ok((StatusCode::CREATED, Json(TransactionView::plain(tx))))
}

/// GET /api/transactions/{id}
///
/// Another customer's transaction is reported as missing.
pub async fn get_own(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    TransactionPath(id): TransactionPath,
) -> ApiResult<impl IntoResponse> {
    let customer = ctx.customer()?;
    let tx = state
        .store()
        .get_transaction(id)
        .await?
        .filter(|tx| tx.user_id == customer.id)
        .ok_or_else(|| ApiError::not_found("Transaction"))?;

    Ok(Json(TransactionView::plain(tx)))
}
