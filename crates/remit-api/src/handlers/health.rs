// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Health check handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::response::{ComponentStatus, HealthResponse, ReadinessResponse};
use crate::state::AppState;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Simple liveness check. Returns 200 OK if the service is running.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse::healthy(state.portal.as_str()))
}

// =============================================================================
// Readiness Check
// =============================================================================

/// GET /ready
///
/// Readiness check that verifies the store and audit logger.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let mut components = Vec::new();

    let store_status = state.store().health_check().await;
    components.push(ComponentStatus {
        name: format!("store:{}", state.store().name()),
        healthy: store_status.is_ok(),
        message: store_status.err().map(|e| e.to_string()),
    });

    let audit_healthy = state.audit().health_check().await;
    components.push(ComponentStatus {
        name: format!("audit:{}", state.audit().name()),
        healthy: audit_healthy,
        message: (!audit_healthy).then(|| "Audit logger unhealthy".to_string()),
    });

    let ready = components.iter().all(|c| c.healthy);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ReadinessResponse { ready, components }))
}
