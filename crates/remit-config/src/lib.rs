// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # remit-config
//!
//! Configuration management for the remit portals.
//!
//! ## Features
//!
//! - **Schema Definition**: Typed configuration with validation
//! - **Multi-Format Support**: YAML, TOML, and JSON configuration files
//! - **Environment Overrides**: `REMIT_*` variables override file values
//! - **Secret Masking**: Secrets never appear in logs or serialized output
//!
//! ## Quick Start
//!
//! ```no_run
//! use remit_config::loader::load_config;
//!
//! let config = load_config("remit.yaml").unwrap();
//!
//! println!("Payments portal: {}", config.payments_addr());
//! println!("Employee portal: {}", config.employee_addr());
//! ```
//!
//! ## Configuration Schema
//!
//! - `payments` / `employee` - Listener and CORS settings per portal
//! - `api` - Request timeout and body size limit
//! - `security` - JWT, bcrypt, CSRF, login rate limiting, and audit
//! - `seed` - Employee accounts created at startup
//!
//! ## Environment Variables
//!
//! ```text
//! REMIT_PAYMENTS_PORT=5001
//! REMIT_EMPLOYEE_ENABLED=false
//! REMIT_JWT_SECRET=...
//! ```
//!
//! Values in config files can reference environment variables:
//!
//! ```yaml
//! security:
//!   jwt:
//!     secret: "${JWT_SECRET}"
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod loader;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, ConfigResult};
pub use schema::{
    // Top-level config
    RemitConfig,
    PortalConfig,
    ApiConfig,
    // Security config
    SecurityConfig,
    JwtConfig,
    PasswordConfig,
    CsrfConfig,
    LoginRateLimitConfig,
    AuditConfig,
    // Seed data
    SeedConfig,
    SeedEmployee,
    // Secret value
    SecretValue,
};

pub use loader::{ConfigFormat, ConfigLoader, ConfigLoaderBuilder, load_config, load_config_str};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// =============================================================================
// Prelude
// =============================================================================

/// Convenience re-exports for common use cases.
pub mod prelude {
    pub use crate::error::{ConfigError, ConfigResult};
    pub use crate::loader::{ConfigLoader, load_config};
    pub use crate::schema::{RemitConfig, SecretValue};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name() {
        assert_eq!(NAME, "remit-config");
    }

    #[test]
    fn test_prelude_imports() {
        use prelude::*;
        let config = RemitConfig::default();
        assert!(config.validate().is_err());
    }
}
