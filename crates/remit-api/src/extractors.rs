// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, rejection::JsonRejection},
    http::{StatusCode, request::Parts},
};
use remit_core::TransactionId;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::error::ApiError;

// =============================================================================
// Auth Extractor
// =============================================================================

/// Extractor for authenticated requests.
///
/// Extracts the `AuthContext` from the request extensions. Returns 401 if
/// the caller is anonymous.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Auth(ctx): Auth) -> impl IntoResponse {
///     format!("Hello, {}", ctx.principal_id())
/// }
/// ```
pub struct Auth(pub AuthContext);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .filter(|ctx| !ctx.is_anonymous())
            .map(Auth)
            .ok_or_else(|| ApiError::unauthorized("Missing token"))
    }
}

// =============================================================================
// Request Context Extractor
// =============================================================================

/// Extractor for the request context, anonymous or not.
pub struct RequestContext(pub AuthContext);

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .unwrap_or_else(AuthContext::anonymous);
        Ok(RequestContext(ctx))
    }
}

// =============================================================================
// Validated JSON Extractor
// =============================================================================

/// Extractor for JSON payloads.
///
/// Oversized bodies become 413; any other decode failure becomes a generic
/// 400 so parser internals are not echoed back.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(
        req: axum::http::Request<axum::body::Body>,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;

        Ok(ValidatedJson(value))
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::PayloadTooLarge;
    }
    tracing::debug!(error = %rejection.body_text(), "Rejected request body");
    ApiError::bad_request("Invalid JSON")
}

// =============================================================================
// Transaction ID Extractor
// =============================================================================

/// Extractor for the `{id}` path segment of transaction routes.
pub struct TransactionPath(pub TransactionId);

impl<S> FromRequestParts<S> for TransactionPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::bad_request("Invalid transaction ID"))?;

        parse_transaction_id(&raw).map(TransactionPath)
    }
}

/// Parses a transaction ID from its string form.
pub fn parse_transaction_id(raw: &str) -> Result<TransactionId, ApiError> {
    Uuid::parse_str(raw)
        .map(TransactionId::from_uuid)
        .map_err(|_| ApiError::bad_request("Invalid transaction ID"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transaction_id() {
        let id = TransactionId::new();
        assert_eq!(parse_transaction_id(&id.to_string()).unwrap(), id);

        let err = parse_transaction_id("not-a-uuid").unwrap_err();
        assert_eq!(err.user_message(), "Invalid transaction ID");
    }
}
