//! Standard error response body for API endpoints.

use serde::Serialize;

// Error codes for observability and debugging
pub const CODE_VALIDATION: i32 = 1001;
pub const CODE_NOT_FOUND: i32 = 1004;
pub const CODE_INTERNAL: i32 = 1005;

/// Standard error response structure.
///
/// Returned for all error responses, providing consistent error information
/// to clients:
/// - `error`: machine-readable error identifier (e.g., "BadRequest")
/// - `message`: human-readable error message
/// - `details`: optional structured details (e.g., per-field validation errors)
/// - `code`: integer error code for logging and monitoring
///
/// # JSON Example
///
/// ```json
/// {
///   "error": "BadRequest",
///   "message": "Request validation failed",
///   "details": {"email": [{"code": "email"}]},
///   "code": 1001
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
}
