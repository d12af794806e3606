//! Error types shared by the domain and the repository ports.

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// A rejected input value, reported against the field it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: this field may not be blank")]
    Blank { field: &'static str },

    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ValidationError {
    pub fn blank(field: &'static str) -> Self {
        ValidationError::Blank { field }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Machine-readable error codes, as returned in API error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationFailed,
    ActiveEventConflict,
    Conflict,

    ApplicationNotFound,
    MaintenanceEventNotFound,

    DatabaseError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::ActiveEventConflict => "ACTIVE_EVENT_CONFLICT",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::ApplicationNotFound => "APPLICATION_NOT_FOUND",
            ErrorCode::MaintenanceEventNotFound => "MAINTENANCE_EVENT_NOT_FOUND",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a repository.
///
/// `details` carries structured context (constraint names, the application
/// involved) that callers use to build a more specific error.
#[derive(Debug, Clone, Error)]
#[error("[{code}] {message}")]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: BTreeMap<String, String>,
}

impl DomainError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    /// `DatabaseError` naming the operation that failed.
    pub fn database(operation: &str, err: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::DatabaseError,
            format!("Failed to {}: {}", operation, err),
        )
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.get(key).map(String::as_str)
    }
}
