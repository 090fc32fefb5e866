use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid verification token")]
    TokenNotFound,

    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Authentication required")]
    Unauthorized,

    #[error("Permission denied")]
    Forbidden,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AccountError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AccountError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type AccountResult<T> = Result<T, AccountError>;

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match &self {
            AccountError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("User {} not found", id),
                None,
            ),
            AccountError::TokenNotFound => (
                StatusCode::NOT_FOUND,
                "not_found",
                "Invalid verification token".to_string(),
                None,
            ),
            // Duplicate email is a field-level validation failure to the
            // caller; the store's unique index is what actually detects it.
            AccountError::DuplicateEmail(email) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("User with email '{}' already exists", email),
                Some(json!({ "email": ["already taken"] })),
            ),
            AccountError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid email or password".to_string(),
                None,
            ),
            AccountError::Validation { field, message } => {
                let mut fields = serde_json::Map::new();
                fields.insert(field.clone(), json!([message.clone()]));
                (
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    message.clone(),
                    Some(serde_json::Value::Object(fields)),
                )
            }
            AccountError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required".to_string(),
                None,
            ),
            // A plain 403 body. Never a redirect: redirecting would leak
            // whether the resource exists.
            AccountError::Forbidden => (
                StatusCode::FORBIDDEN,
                "forbidden",
                "You don't have permission to access this resource".to_string(),
                None,
            ),
            AccountError::PasswordHash(msg) => {
                tracing::error!("Password hash error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            AccountError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({
            "error": {
                "type": error_type,
                "message": message
            }
        });
        if let Some(details) = details {
            body["error"]["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_maps_to_403() {
        let response = AccountError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_token_not_found_maps_to_404() {
        let response = AccountError::TokenNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_duplicate_email_is_validation_taxonomy() {
        let response = AccountError::DuplicateEmail("a@b.com".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
