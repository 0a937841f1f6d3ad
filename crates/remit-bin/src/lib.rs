// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # remit-bin
//!
//! CLI binary for the remit portals.
//!
//! - CLI argument parsing with clap
//! - Runtime orchestration of both portal servers over one store
//! - Employee seeding from configuration
//! - Graceful shutdown handling
//! - Logging initialization
//!
//! ## Usage
//!
//! ```bash
//! # Start both portals (default command)
//! remit
//!
//! # Start only the employee portal with a custom config
//! remit -c /etc/remit/remit.yaml run --portal employee
//!
//! # Validate configuration
//! remit validate --strict
//!
//! # Hash a password for seed.employees[].password_hash
//! remit hash-password --stdin
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{RemitRuntime, RuntimeBuilder};
pub use shutdown::{ShutdownCoordinator, ShutdownGuard, ShutdownSignal};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
