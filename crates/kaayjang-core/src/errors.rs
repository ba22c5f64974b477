//! Error types shared by the service layer and the HTTP layer.
//!
//! Services return [`ServiceError`], which carries no HTTP knowledge.
//! Handlers convert it into [`AppError`], which pairs a status code with a
//! message and renders the failure envelope `{"success": false, "error": ...}`.

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;
use validator::ValidationErrors;

/// Message returned to clients for every 5xx response.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors raised by entity repositories.
#[derive(Debug, ThisError)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness rule was violated or a row is still referenced.
    #[error("{0}")]
    Conflict(String),

    /// A foreign identifier does not resolve, or resolves to the wrong parent.
    #[error("{0}")]
    InvalidReference(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn invalid_reference(message: impl Into<String>) -> Self {
        Self::InvalidReference(message.into())
    }

    /// Classifies a write failure.
    ///
    /// Unique violations become `Conflict(on_unique)`, foreign-key violations
    /// become `InvalidReference(on_foreign_key)`. Anything else stays a
    /// database error.
    pub fn from_db(err: sqlx::Error, on_unique: &str, on_foreign_key: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::conflict(on_unique);
            }
            if db_err.is_foreign_key_violation() {
                return Self::invalid_reference(on_foreign_key);
            }
        }
        Self::Database(err)
    }

    /// Classifies a delete failure: a foreign-key violation means children
    /// still point at the row.
    pub fn from_delete(err: sqlx::Error, still_referenced: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err
            && db_err.is_foreign_key_violation()
        {
            return Self::conflict(still_referenced);
        }
        Self::Database(err)
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn too_many_requests<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::TOO_MANY_REQUESTS, err)
    }

    /// The message a client is allowed to see.
    pub fn public_message(&self) -> String {
        if self.status.is_server_error() {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.error.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = ?self.error, "Request failed");
        }

        let body = Json(json!({
            "success": false,
            "error": self.public_message(),
        }));

        (self.status, body).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => AppError::not_found(anyhow::anyhow!(msg)),
            ServiceError::Conflict(msg) | ServiceError::InvalidReference(msg) => {
                AppError::bad_request(anyhow::anyhow!(msg))
            }
            ServiceError::Database(e) => AppError::internal(e),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::internal(err)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::unprocessable(anyhow::anyhow!("{}", format_validation_errors(&errors)))
    }
}

/// Joins field errors into one human-readable line, preferring the custom
/// message attached to each validation rule.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err: AppError = ServiceError::not_found("Level not found").into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.public_message(), "Level not found");
    }

    #[test]
    fn test_conflict_and_invalid_reference_collapse_to_400() {
        let conflict: AppError = ServiceError::conflict("code \"6A\" already exists").into();
        let reference: AppError = ServiceError::invalid_reference("Level does not exist").into();

        assert_eq!(conflict.status, StatusCode::BAD_REQUEST);
        assert_eq!(conflict.public_message(), "code \"6A\" already exists");
        assert_eq!(reference.status, StatusCode::BAD_REQUEST);
        assert_eq!(reference.public_message(), "Level does not exist");
    }

    #[test]
    fn test_database_error_is_hidden() {
        let err: AppError = ServiceError::Database(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn test_from_db_keeps_non_constraint_errors() {
        let err = ServiceError::from_db(sqlx::Error::RowNotFound, "dup", "fk");
        assert!(matches!(err, ServiceError::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn test_into_response_keeps_status() {
        let response = AppError::unprocessable(anyhow::anyhow!("Invalid id")).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
