/// Error types for blog-service
///
/// This module defines all error types that can occur in the service.
/// Errors are converted to appropriate HTTP responses for clients; two
/// variants intentionally render as redirects rather than error statuses:
/// `AuthRequired` sends the client to the login page with a `next` parameter,
/// matching the platform's login flow.
use actix_web::{error::ResponseError, http::header, http::StatusCode, HttpResponse};
use std::collections::BTreeMap;
use std::fmt;

/// Result type for blog-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Field name -> list of human-readable validation messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Database operation failed
    Database(String),

    /// Cache operation failed
    Cache(String),

    /// Submitted form data failed validation
    Validation(FieldErrors),

    /// Resource not found
    NotFound(String),

    /// Authentication required; redirect to login preserving the destination
    AuthRequired { next: String },

    /// Forbidden access
    Forbidden(String),

    /// Bad request
    BadRequest(String),

    /// Internal server error
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::Cache(msg) => write!(f, "Cache error: {}", msg),
            AppError::Validation(fields) => {
                write!(f, "Validation failed for fields: ")?;
                let mut first = true;
                for field in fields.keys() {
                    if !first {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", field)?;
                    first = false;
                }
                Ok(())
            }
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::AuthRequired { next } => write!(f, "Authentication required for {}", next),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Cache(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AuthRequired { .. } => StatusCode::FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::AuthRequired { next } => HttpResponse::Found()
                .insert_header((
                    header::LOCATION,
                    format!("/auth/login/?next={}", next),
                ))
                .finish(),
            AppError::Validation(fields) => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "validation failed",
                    "fields": fields,
                    "status": StatusCode::BAD_REQUEST.as_u16(),
                }))
            }
            other => {
                let status = other.status_code();
                HttpResponse::build(status).json(serde_json::json!({
                    "error": other.to_string(),
                    "status": status.as_u16(),
                }))
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("row not found".to_string()),
            other => AppError::Database(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Cache(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_required_renders_login_redirect() {
        let err = AppError::AuthRequired {
            next: "/posts/1/comment/".to_string(),
        };
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::FOUND);
        let location = resp
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert_eq!(location, "/auth/login/?next=/posts/1/comment/");
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
