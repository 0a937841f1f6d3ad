// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # remit-api
//!
//! HTTP servers for the remit payments and employee portals.
//!
//! Each portal is an axum router over the shared store, wrapped in a tower
//! middleware stack: correlation IDs, tracing, security headers, compression,
//! timeouts, CORS, audit of refused requests, login rate limiting, JWT
//! authentication and double-submit CSRF verification.
//!
//! ## Example
//!
//! ```rust,ignore
//! let state = AppState::builder(Portal::Payments)
//!     .config(config.clone())
//!     .store(store.clone())
//!     .build()?;
//! PortalServer::new(state).run_with_shutdown(shutdown).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use server::{Portal, PortalServer};
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
