//! Error taxonomy for Taskgate
//!
//! Every failure a handler can return is one of these typed outcomes; the
//! transport layer maps them to status codes. Unexpected store failures fold
//! into `Database`/`Internal` and surface as a generic 500 - details go to
//! the logs, never to the client.

use hyper::StatusCode;
use thiserror::Error;

/// Result type used throughout Taskgate
pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing required input, addressable to a single field
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Missing, malformed, expired or otherwise unverifiable credentials,
    /// including tokens whose subject no longer exists
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated but explicitly denied
    #[error("{0}")]
    Forbidden(String),

    /// No matching row, or the row belongs to another owner - the two are
    /// deliberately indistinguishable
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Uniqueness violation (duplicate email)
    #[error("{0}")]
    Conflict(String),

    /// Unexpected store failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Anything else that should never reach a client verbatim
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status code for this error category
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-checkable category code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Database(_) | ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Field path for validation errors
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ApiError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Message safe to return to the client. Store internals stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Database(_) | ApiError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let validation = ApiError::Validation {
            field: "title",
            message: "title is required".into(),
        };
        assert_eq!(validation.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(validation.field(), Some("title"));

        assert_eq!(
            ApiError::Unauthenticated("no token".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("not yours".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::NotFound("task").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Conflict("Email already registered".into()).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let err = ApiError::Internal("secret key misconfigured".into());
        assert_eq!(err.public_message(), "internal server error");
        assert_eq!(err.field(), None);
    }

    #[test]
    fn not_found_message_names_entity() {
        assert_eq!(ApiError::NotFound("sub-agent").to_string(), "sub-agent not found");
    }
}
