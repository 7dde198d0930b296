//! Outcome taxonomy for every user-facing operation.

use crate::access::Denial;
use crate::db::DatabaseError;
use crate::validation::ValidationError;

/// Generic notice for failures the user cannot act on.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Input broke a field rule; nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Access denied: {}", .0.message())]
    Authorization(Denial),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// A store call failed. Earlier writes to the other store are kept.
    #[error("Persistence failure: {0}")]
    Persistence(#[from] DatabaseError),

    /// Work moved off the async runtime panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AppError {
    /// Text safe to show the user. Store failures are logged with detail
    /// and reported generically.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.reason().to_string(),
            Self::Authorization(denial) => denial.message().to_string(),
            Self::NotFound(entity) => format!("{entity} not found"),
            Self::Persistence(e) => {
                tracing::error!(error = %e, "Store operation failed");
                GENERIC_FAILURE.to_string()
            }
            Self::Task(e) => {
                tracing::error!(error = %e, "Background task failed");
                GENERIC_FAILURE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::Role;

    #[test]
    fn validation_reason_is_shown_verbatim() {
        let err = AppError::from(ValidationError("Invalid severity selection"));
        assert_eq!(err.user_message(), "Invalid severity selection");
    }

    #[test]
    fn persistence_detail_is_hidden() {
        let err = AppError::from(DatabaseError::ConstraintViolation("UNIQUE users.email".into()));
        assert_eq!(err.user_message(), GENERIC_FAILURE);
        assert!(err.to_string().contains("UNIQUE"));
    }

    #[test]
    fn not_found_and_denial_messages() {
        assert_eq!(AppError::NotFound("Patient").user_message(), "Patient not found");
        assert_eq!(
            AppError::Authorization(Denial::RoleRequired(Role::Admin)).user_message(),
            "Admin access required"
        );
    }
}
