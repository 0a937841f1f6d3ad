// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration error types for remit-config.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors.
///
/// Covers every failure during loading, parsing and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file.
    #[error("Failed to parse config file '{path}': {message}")]
    Parse {
        /// Path to the configuration file.
        path: PathBuf,
        /// Error message.
        message: String,
        /// Line number (if available).
        line: Option<usize>,
    },

    /// Configuration validation failed.
    #[error("Validation failed for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// Required field is missing.
    #[error("Missing required field: {field}")]
    MissingField {
        /// The missing field name.
        field: String,
    },

    /// File I/O error.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Environment variable not found.
    #[error("Environment variable not found: {name}")]
    EnvVarNotFound {
        /// The environment variable name.
        name: String,
    },

    /// Invalid environment variable value.
    #[error("Invalid environment variable value for '{name}': {message}")]
    InvalidEnvVar {
        /// The environment variable name.
        name: String,
        /// Error message.
        message: String,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Value out of range.
    #[error("Value out of range for '{field}': {value} (expected {min}..={max})")]
    OutOfRange {
        /// The field name.
        field: String,
        /// The actual value.
        value: String,
        /// Minimum value.
        min: String,
        /// Maximum value.
        max: String,
    },

    /// Unsupported configuration format.
    #[error("Unsupported configuration format: {format}")]
    UnsupportedFormat {
        /// The unsupported format.
        format: String,
    },

    /// Serialization error.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message.
        message: String,
        /// Line number (if the parser reports one).
        line: Option<usize>,
    },
}

impl ConfigError {
    /// Creates a parse error.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
            line: None,
        }
    }

    /// Creates a parse error with line number.
    pub fn parse_at_line(path: impl Into<PathBuf>, message: impl Into<String>, line: usize) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
            line: Some(line),
        }
    }

    /// Creates a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField { field: field.into() }
    }

    /// Creates an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an environment variable not found error.
    pub fn env_var_not_found(name: impl Into<String>) -> Self {
        Self::EnvVarNotFound { name: name.into() }
    }

    /// Creates an invalid environment variable error.
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates an out of range error.
    pub fn out_of_range<T: std::fmt::Display>(
        field: impl Into<String>,
        value: T,
        min: T,
        max: T,
    ) -> Self {
        Self::OutOfRange {
            field: field.into(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    /// Creates an unsupported format error.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
            line: None,
        }
    }

    /// Creates a serialization error at a known line.
    pub fn serialization_at_line(message: impl Into<String>, line: usize) -> Self {
        Self::Serialization {
            message: message.into(),
            line: Some(line),
        }
    }

    /// Returns a short message suitable for operators.
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::Parse { path, message, line } => match line {
                Some(line) => format!("Cannot parse {} (line {}): {}", path.display(), line, message),
                None => format!("Cannot parse {}: {}", path.display(), message),
            },
            ConfigError::Validation { field, message } => format!("{}: {}", field, message),
            ConfigError::MissingField { field } => format!("{} is required", field),
            ConfigError::Io { path, .. } => format!("Cannot read {}", path.display()),
            ConfigError::EnvVarNotFound { name } => format!("Environment variable {} is not set", name),
            ConfigError::InvalidEnvVar { name, message } => format!("{}: {}", name, message),
            ConfigError::FileNotFound { path } => format!("{} does not exist", path.display()),
            ConfigError::OutOfRange { field, value, min, max } => {
                format!("{} must be between {} and {}, got {}", field, min, max, value)
            }
            ConfigError::UnsupportedFormat { format } => {
                format!("Unsupported config format '{}' (use yaml, toml or json)", format)
            }
            ConfigError::Serialization { message, .. } => message.clone(),
        }
    }

    /// Returns `true` if this error is related to file I/O.
    pub fn is_io_error(&self) -> bool {
        matches!(self, ConfigError::Io { .. } | ConfigError::FileNotFound { .. })
    }

    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            ConfigError::Parse { .. } => "parse",
            ConfigError::Validation { .. } => "validation",
            ConfigError::MissingField { .. } => "missing_field",
            ConfigError::Io { .. } => "io",
            ConfigError::EnvVarNotFound { .. } => "env_var_not_found",
            ConfigError::InvalidEnvVar { .. } => "invalid_env_var",
            ConfigError::FileNotFound { .. } => "file_not_found",
            ConfigError::OutOfRange { .. } => "out_of_range",
            ConfigError::UnsupportedFormat { .. } => "unsupported_format",
            ConfigError::Serialization { .. } => "serialization",
        }
    }
}

/// A Result type with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_creation() {
        let error = ConfigError::validation("security.jwt.secret", "too short");
        assert!(matches!(error, ConfigError::Validation { .. }));
        assert_eq!(error.error_type(), "validation");
        assert_eq!(error.user_message(), "security.jwt.secret: too short");
    }

    #[test]
    fn test_out_of_range() {
        let error = ConfigError::out_of_range("security.password.bcrypt_cost", 40, 4, 31);
        assert!(error.to_string().contains("40"));
        assert!(error.user_message().contains("between 4 and 31"));
    }

    #[test]
    fn test_env_var_not_found() {
        let error = ConfigError::env_var_not_found("PORTAL_JWT_SECRET");
        assert_eq!(error.error_type(), "env_var_not_found");
        assert_eq!(
            error.user_message(),
            "Environment variable PORTAL_JWT_SECRET is not set"
        );
    }

    #[test]
    fn test_parse_error_reports_line() {
        let error = ConfigError::parse_at_line("remit.toml", "expected `=`", 7);
        assert_eq!(error.user_message(), "Cannot parse remit.toml (line 7): expected `=`");
        assert_eq!(
            ConfigError::parse("remit.toml", "bad").user_message(),
            "Cannot parse remit.toml: bad"
        );
    }

    #[test]
    fn test_io_classification() {
        assert!(ConfigError::file_not_found("/nope.yaml").is_io_error());
        assert!(!ConfigError::unsupported_format("ini").is_io_error());
    }
}
