// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`health`]: Liveness and readiness probes (both portals)
//! - [`auth`]: CSRF token, login, registration and identity
//! - [`payments`]: Customer transactions (payments portal)
//! - [`review`]: Transaction review (employee portal)

mod auth;
mod health;
mod payments;
mod review;

pub use auth::*;
pub use health::*;
pub use payments::*;
pub use review::*;
