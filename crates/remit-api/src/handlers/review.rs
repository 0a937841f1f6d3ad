// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Transaction review handlers (employee portal).

use std::collections::HashMap;

use axum::{Json, extract::State, response::IntoResponse};
use remit_core::audit::AuditLog;
use remit_core::validation::validate_rejection_reason;
use remit_core::{
    CustomerId, CustomerSummary, ReviewDecision, StoreError, Transaction, TransactionId,
    TransactionQuery, TransitionError,
};
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, TransactionPath, ValidatedJson};
use crate::response::{ReviewResponse, StatsResponse, TransactionList, TransactionView};
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// Attaches owner summaries, resolving each customer once.
async fn with_customers(
    state: &AppState,
    transactions: Vec<Transaction>,
) -> ApiResult<Vec<TransactionView>> {
    let mut cache: HashMap<CustomerId, CustomerSummary> = HashMap::new();
    let mut views = Vec::with_capacity(transactions.len());

    for tx in transactions {
        let summary = match cache.get(&tx.user_id) {
            Some(summary) => summary.clone(),
            None => {
                let summary = state
                    .store()
                    .get_customer(tx.user_id)
                    .await?
                    .map(|c| c.summary())
                    .unwrap_or_else(CustomerSummary::unknown);
                cache.insert(tx.user_id, summary.clone());
                summary
            }
        };
        views.push(TransactionView::with_customer(tx, summary));
    }

    Ok(views)
}

async fn view_of(state: &AppState, tx: Transaction) -> ApiResult<TransactionView> {
    let mut views = with_customers(state, vec![tx]).await?;
    views
        .pop()
        .ok_or_else(|| ApiError::internal("empty transaction view"))
}

// =============================================================================
// Listing
// =============================================================================

/// GET /api/transactions
pub async fn list_all(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> ApiResult<impl IntoResponse> {
    ctx.employee()?;
    let transactions = state.store().list_transactions(TransactionQuery::all()).await?;
    let views = with_customers(&state, transactions).await?;
    Ok(Json(TransactionList::from(views)))
}

/// GET /api/transactions/pending
pub async fn list_pending(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> ApiResult<impl IntoResponse> {
    ctx.employee()?;
    let transactions = state
        .store()
        .list_transactions(TransactionQuery::pending())
        .await?;
    let views = with_customers(&state, transactions).await?;
    Ok(Json(TransactionList::from(views)))
}

/// GET /api/transactions/{id}
pub async fn get_one(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    TransactionPath(id): TransactionPath,
) -> ApiResult<impl IntoResponse> {
    ctx.employee()?;
    let tx = state
        .store()
        .get_transaction(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Transaction"))?;
    Ok(Json(view_of(&state, tx).await?))
}

/// GET /api/transactions/stats/summary
pub async fn stats(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> ApiResult<impl IntoResponse> {
    ctx.employee()?;
    let counts = state.store().status_counts().await?;
    Ok(Json(StatsResponse::from(counts)))
}

// =============================================================================
// Review
// =============================================================================

/// Reject request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RejectRequest {
    /// Why the payment was declined.
    pub reason: Option<String>,
}

/// PATCH /api/transactions/{id}/accept
pub async fn accept(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    TransactionPath(id): TransactionPath,
) -> ApiResult<impl IntoResponse> {
    let reviewer = ctx.employee()?.employee_id.clone();
    let decision = ReviewDecision::Accept { reviewer };
    let tx = apply_review(&state, &ctx, id, decision).await?;

    Ok(Json(ReviewResponse {
        message: "Transaction accepted successfully".to_string(),
        transaction: view_of(&state, tx).await?,
    }))
}

/// PATCH /api/transactions/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    TransactionPath(id): TransactionPath,
    ValidatedJson(request): ValidatedJson<RejectRequest>,
) -> ApiResult<impl IntoResponse> {
    let reviewer = ctx.employee()?.employee_id.clone();
    let reason = validate_rejection_reason(request.reason.as_deref())?;
    let decision = ReviewDecision::Reject { reviewer, reason };
    let tx = apply_review(&state, &ctx, id, decision).await?;

    Ok(Json(ReviewResponse {
        message: "Transaction rejected successfully".to_string(),
        transaction: view_of(&state, tx).await?,
    }))
}

async fn apply_review(
    state: &AppState,
    ctx: &AuthContext,
    id: TransactionId,
    decision: ReviewDecision,
) -> ApiResult<Transaction> {
    let reviewer = decision.reviewer().to_string();
    let target = decision.target_status();

    match state.store().review_transaction(id, decision).await {
        Ok(tx) => {
            state
                .record(
                    AuditLog::transaction_reviewed(&tx, &reviewer, ctx.client_ip),
                    ctx,
                )
                .await;
            tracing::info!(
                transaction_id = %tx.id,
                employee_id = %reviewer,
                status = %tx.status,
                "Transaction reviewed"
            );
            Ok(tx)
        }
        Err(StoreError::Transition(TransitionError::AlreadyReviewed { status })) => {
            state
                .record(
                    AuditLog::review_conflict(id.to_string(), status, &reviewer, ctx.client_ip),
                    ctx,
                )
                .await;
            tracing::warn!(
                transaction_id = %id,
                employee_id = %reviewer,
                current = %status,
                attempted = %target,
                "Review of settled transaction"
            );
            Err(StoreError::from(TransitionError::AlreadyReviewed { status }).into())
        }
        Err(e) => Err(e.into()),
    }
}
