// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Audit error types.

use thiserror::Error;

/// Errors that can occur during audit logging.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Query not supported by this logger.
    #[error("Query not supported by this logger: {logger_type}")]
    QueryNotSupported {
        /// The type of logger that doesn't support queries.
        logger_type: String,
    },

    /// Serialization error.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message.
        message: String,
    },
}

impl AuditError {
    /// Creates a query not supported error.
    pub fn query_not_supported(logger_type: impl Into<String>) -> Self {
        Self::QueryNotSupported {
            logger_type: logger_type.into(),
        }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Returns the error type for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            AuditError::QueryNotSupported { .. } => "query_not_supported",
            AuditError::Serialization { .. } => "serialization_error",
        }
    }
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = AuditError::query_not_supported("tracing");
        assert_eq!(err.error_type(), "query_not_supported");
        assert!(err.to_string().contains("tracing"));

        let err = AuditError::serialization("unexpected end of input");
        assert_eq!(err.error_type(), "serialization_error");
    }
}
