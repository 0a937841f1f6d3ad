// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use remit_core::audit::{AuditLog, AuditResource};
use remit_core::validation::{
    RegistrationInput, is_valid_employee_id, normalize_employee_id, validate_registration,
};
use remit_core::{Customer, StoreError};
use serde::Deserialize;
use serde_json::json;

use crate::auth::csrf::cookie_header;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, RequestContext, ValidatedJson};
use crate::response::{
    CsrfTokenResponse, CustomerProfile, EmployeeProfile, MessageResponse, TokenResponse,
};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

// =============================================================================
// CSRF Token
// =============================================================================

/// GET /api/auth/csrf-token
///
/// Issues a CSRF token in a script-readable cookie and in the body.
pub async fn csrf_token(State(state): State<AppState>) -> impl IntoResponse {
    let csrf = &state.config.security.csrf;
    let token = state.csrf_tokens.issue();
    let cookie = cookie_header(
        &csrf.cookie_name,
        &token,
        state.csrf_tokens.ttl(),
        csrf.secure_cookie,
    );

    (
        [(header::SET_COOKIE, cookie)],
        Json(CsrfTokenResponse { csrf_token: token }),
    )
}

// =============================================================================
// Me
// =============================================================================

/// GET /api/auth/me
///
/// Returns the identity carried by the caller's token.
pub async fn me(State(state): State<AppState>, Auth(ctx): Auth) -> impl IntoResponse {
    Json(json!({
        "portal": state.portal.as_str(),
        "user": ctx.principal,
    }))
}

// =============================================================================
// Register
// =============================================================================

/// Registration request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Full name.
    pub full_name: String,
    /// National ID number.
    pub id_number: String,
    /// Account number.
    pub account_number: String,
    /// Password.
    pub password: String,
}

/// POST /api/auth/register
///
/// Creates a customer account.
pub async fn register(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_registration(&RegistrationInput {
        full_name: &request.full_name,
        id_number: &request.id_number,
        account_number: &request.account_number,
        password: &request.password,
    })?;

    if state
        .store()
        .find_customer_by_account(&request.account_number)
        .await?
        .is_some()
    {
        tracing::info!(account = %request.account_number, "Registration for existing account");
        return Err(ApiError::conflict("Account already exists"));
    }

    let hash = state.hash_password(request.password).await?;
    let customer = Customer::new(
        request.full_name,
        request.id_number,
        request.account_number,
        hash,
    );
    let account_number = customer.account_number.clone();

    match state.store().insert_customer(customer).await {
        Ok(()) => {}
        Err(StoreError::Duplicate { .. }) => {
            return Err(ApiError::conflict("Account already exists"));
        }
        Err(e) => return Err(e.into()),
    }

    state
        .record(AuditLog::registration(&account_number, ctx.client_ip), &ctx)
        .await;
    tracing::info!(account = %account_number, "Customer registered");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

// =============================================================================
// Customer Login
// =============================================================================

/// Customer login request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerLoginRequest {
    /// Account number.
    pub account_number: String,
    /// Password.
    pub password: String,
    /// National ID number, checked when supplied.
    pub id_number: Option<String>,
}

/// POST /api/auth/login (payments portal)
///
/// Every failure path performs one bcrypt verification so response time does
/// not reveal whether the account exists.
pub async fn customer_login(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    ValidatedJson(request): ValidatedJson<CustomerLoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let account_number = request.account_number.trim().to_string();
    if account_number.is_empty() {
        return Err(ApiError::validation_field("accountNumber", "Account number required"));
    }
    if request.password.is_empty() {
        return Err(ApiError::validation_field("password", "Password required"));
    }

    let customer = state.store().find_customer_by_account(&account_number).await?;

    let id_matches = match (&customer, request.id_number.as_deref().map(str::trim)) {
        (Some(c), Some(id_number)) if !id_number.is_empty() => c.id_number == id_number,
        _ => true,
    };

    let hash = customer.as_ref().map(|c| c.password_hash.clone());
    let password_ok = state.verify_password(request.password, hash).await?;

    let failure = match (&customer, id_matches, password_ok) {
        (None, _, _) => Some("unknown account"),
        (Some(_), false, _) => Some("id number mismatch"),
        (Some(_), true, false) => Some("wrong password"),
        (Some(_), true, true) => None,
    };

    let resource = AuditResource::customer(&account_number);
    let customer = match (customer, failure) {
        (Some(customer), None) => customer,
        (_, reason) => {
            let reason = reason.unwrap_or("unknown account");
            tracing::info!(account = %account_number, reason, "Customer login failed");
            state
                .record(
                    AuditLog::login_failed(&account_number, resource, ctx.client_ip, reason),
                    &ctx,
                )
                .await;
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
    };

    let token = state.jwt().issue_customer(&customer)?;
    state
        .record(AuditLog::login(&account_number, resource, ctx.client_ip), &ctx)
        .await;
    tracing::info!(account = %account_number, "Customer logged in");

    Ok(Json(TokenResponse::bearer(
        token,
        state.jwt().expiration_secs(),
        CustomerProfile {
            id_number: customer.id_number,
            account_number: customer.account_number,
            full_name: customer.full_name,
        },
    )))
}

// =============================================================================
// Employee Login
// =============================================================================

/// Employee login request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmployeeLoginRequest {
    /// Employee number.
    pub employee_id: String,
    /// Password.
    pub password: String,
}

/// POST /api/auth/login (employee portal)
pub async fn employee_login(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    ValidatedJson(request): ValidatedJson<EmployeeLoginRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.employee_id.trim().is_empty() {
        return Err(ApiError::validation_field("employeeId", "Employee ID required"));
    }
    if request.password.is_empty() {
        return Err(ApiError::validation_field("password", "Password required"));
    }

    let employee_id = normalize_employee_id(&request.employee_id);
    if !is_valid_employee_id(&employee_id) {
        return Err(ApiError::validation_field(
            "employeeId",
            "Invalid employee ID format",
        ));
    }

    let employee = state.store().find_employee(&employee_id).await?;
    let hash = employee.as_ref().map(|e| e.password_hash.clone());
    let password_ok = state.verify_password(request.password, hash).await?;

    let resource = AuditResource::employee(&employee_id);
    let employee = match employee {
        Some(employee) if password_ok => employee,
        other => {
            let reason = if other.is_none() {
                "unknown employee"
            } else {
                "wrong password"
            };
            tracing::info!(employee_id = %employee_id, reason, "Employee login failed");
            state
                .record(
                    AuditLog::login_failed(&employee_id, resource, ctx.client_ip, reason),
                    &ctx,
                )
                .await;
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
    };

    let token = state.jwt().issue_employee(&employee)?;
    state
        .record(AuditLog::login(&employee_id, resource, ctx.client_ip), &ctx)
        .await;
    tracing::info!(employee_id = %employee_id, "Employee logged in");

    Ok(Json(TokenResponse::bearer(
        token,
        state.jwt().expiration_secs(),
        EmployeeProfile {
            employee_id: employee.employee_id,
            full_name: employee.full_name,
        },
    )))
}
