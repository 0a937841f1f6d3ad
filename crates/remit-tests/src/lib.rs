// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # remit Integration Tests
//!
//! End-to-end tests that drive both portals over one shared store, the way
//! the binary wires them, without opening sockets.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p remit-tests
//! cargo test -p remit-tests --test integration_payments
//! cargo test -p remit-tests --test integration_employee
//! cargo test -p remit-tests --test integration_security
//! cargo test -p remit-tests --test integration_config
//! ```
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use remit_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let portals = TestPortals::new();
//!     let token = portals.register_and_login(&CustomerFixtures::thandi()).await;
//!     let response = portals
//!         .payments()
//!         .post("/api/transactions")
//!         .bearer(&token)
//!         .json(PaymentFixtures::valid())
//!         .send()
//!         .await;
//!     assert_eq!(response.status, StatusCode::BAD_REQUEST);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::init_test_logging;
    pub use axum::http::{Method, StatusCode};
    pub use serde_json::json;
}
