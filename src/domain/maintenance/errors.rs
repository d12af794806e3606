//! Maintenance-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | ActiveConflict | 400 |
//! | DuplicateApplication | 400 |
//! | Validation | 400 |
//! | Infrastructure | 500 |

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Errors raised by the event store and the validation engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaintenanceError {
    /// Referenced application or event does not exist.
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    /// The write would leave more than one active event for the application.
    #[error("There is already an active maintenance event for {application}.")]
    ActiveConflict { application: String },

    /// `(slug, tier)` is already registered.
    #[error("Application with this slug and tier already exists: {slug} {tier}")]
    DuplicateApplication { slug: String, tier: String },

    /// Malformed input or a disallowed field update.
    #[error("{0}")]
    Validation(String),

    /// Persistence layer failure.
    #[error("Error: {0}")]
    Infrastructure(String),
}

impl MaintenanceError {
    pub fn application_not_found(id: impl ToString) -> Self {
        MaintenanceError::NotFound {
            resource: "Application",
            id: id.to_string(),
        }
    }

    pub fn event_not_found(id: impl ToString) -> Self {
        MaintenanceError::NotFound {
            resource: "MaintenanceEvent",
            id: id.to_string(),
        }
    }

    pub fn active_conflict(application: impl Into<String>) -> Self {
        MaintenanceError::ActiveConflict {
            application: application.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        MaintenanceError::Validation(message.into())
    }

    /// True for every kind the REST boundary reports as a 400.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MaintenanceError::ActiveConflict { .. }
                | MaintenanceError::DuplicateApplication { .. }
                | MaintenanceError::Validation(_)
        )
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            MaintenanceError::NotFound { resource: "Application", .. } => {
                ErrorCode::ApplicationNotFound
            }
            MaintenanceError::NotFound { .. } => ErrorCode::MaintenanceEventNotFound,
            MaintenanceError::ActiveConflict { .. } => ErrorCode::ActiveEventConflict,
            MaintenanceError::DuplicateApplication { .. } => ErrorCode::Conflict,
            MaintenanceError::Validation(_) => ErrorCode::ValidationFailed,
            MaintenanceError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<ValidationError> for MaintenanceError {
    fn from(err: ValidationError) -> Self {
        MaintenanceError::Validation(err.to_string())
    }
}

impl From<DomainError> for MaintenanceError {
    fn from(err: DomainError) -> Self {
        let detail = |key: &str| err.detail(key).unwrap_or_default().to_string();
        match err.code {
            ErrorCode::ApplicationNotFound => MaintenanceError::application_not_found(detail("id")),
            ErrorCode::MaintenanceEventNotFound => MaintenanceError::event_not_found(detail("id")),
            ErrorCode::ActiveEventConflict => {
                MaintenanceError::active_conflict(detail("application"))
            }
            ErrorCode::Conflict if err.detail("slug").is_some() => {
                MaintenanceError::DuplicateApplication {
                    slug: detail("slug"),
                    tier: detail("tier"),
                }
            }
            ErrorCode::Conflict | ErrorCode::ValidationFailed => {
                MaintenanceError::Validation(err.message)
            }
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                MaintenanceError::Infrastructure(err.message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_conflict_names_the_application() {
        let err = MaintenanceError::active_conflict("perma prod");
        assert_eq!(
            err.to_string(),
            "There is already an active maintenance event for perma prod."
        );
        assert!(err.is_validation());
        assert_eq!(err.code(), ErrorCode::ActiveEventConflict);
    }

    #[test]
    fn not_found_codes_distinguish_resources() {
        assert_eq!(
            MaintenanceError::application_not_found(3).code(),
            ErrorCode::ApplicationNotFound
        );
        assert_eq!(
            MaintenanceError::event_not_found(3).code(),
            ErrorCode::MaintenanceEventNotFound
        );
        assert!(!MaintenanceError::event_not_found(3).is_validation());
    }

    #[test]
    fn domain_conflict_with_slug_becomes_duplicate_application() {
        let err = DomainError::new(ErrorCode::Conflict, "duplicate key")
            .with_detail("slug", "perma")
            .with_detail("tier", "prod");
        assert_eq!(
            MaintenanceError::from(err),
            MaintenanceError::DuplicateApplication {
                slug: "perma".to_string(),
                tier: "prod".to_string(),
            }
        );
    }

    #[test]
    fn domain_database_error_becomes_infrastructure() {
        let err = DomainError::database("insert", "pool timed out");
        assert!(matches!(
            MaintenanceError::from(err),
            MaintenanceError::Infrastructure(_)
        ));
    }

    #[test]
    fn domain_active_conflict_keeps_application_name() {
        let err = DomainError::new(ErrorCode::ActiveEventConflict, "unique violation")
            .with_detail("application", "perma prod");
        assert_eq!(
            MaintenanceError::from(err),
            MaintenanceError::active_conflict("perma prod")
        );
    }
}
