// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError(String),
    /// Wrong key, corrupted ciphertext, or malformed encoding. The message
    /// is fixed and never distinguishes which, to avoid oracle leakage.
    DecryptionFailed,

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError(_) => 400,
            ApiError::DecryptionFailed => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError(msg) => msg,
            ApiError::DecryptionFailed => "wrong key or corrupted data",
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::DecryptionFailed => "DECRYPTION_FAILED",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        ApiError::ValidationError(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert domain error types to ApiError
impl From<crate::store::StoreError> for ApiError {
    fn from(err: crate::store::StoreError) -> Self {
        match err {
            crate::store::StoreError::NotFound(msg) => ApiError::not_found(msg),
            crate::store::StoreError::Conflict(msg) => ApiError::conflict(msg),
            crate::store::StoreError::QueryError(msg) => {
                tracing::error!("store query error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            crate::store::StoreError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("sqlx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<crate::services::KeyError> for ApiError {
    fn from(err: crate::services::KeyError) -> Self {
        match err {
            crate::services::KeyError::Validation(msg) => ApiError::validation_error(msg),
            crate::services::KeyError::NotFound => ApiError::not_found("key not found"),
            // opaque on purpose: never disclose which of (owner, pin) failed
            crate::services::KeyError::Denied => ApiError::forbidden("not authorized"),
            crate::services::KeyError::Store(e) => e.into(),
            crate::services::KeyError::Hash(e) => {
                tracing::error!("bcrypt error: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<crate::services::EncryptionError> for ApiError {
    fn from(err: crate::services::EncryptionError) -> Self {
        match err {
            crate::services::EncryptionError::NoActiveKey => {
                ApiError::forbidden("no active encryption key")
            }
            crate::services::EncryptionError::MaterialMissing => {
                tracing::error!("key material missing for an existing key record");
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            crate::services::EncryptionError::Crypto(e) => e.into(),
            crate::services::EncryptionError::Store(e) => e.into(),
        }
    }
}

impl From<crate::crypto::CryptoError> for ApiError {
    fn from(err: crate::crypto::CryptoError) -> Self {
        match err {
            crate::crypto::CryptoError::Decrypt => ApiError::DecryptionFailed,
            crate::crypto::CryptoError::InvalidKeyLength => {
                ApiError::validation_error("key must be exactly 32 characters")
            }
        }
    }
}

impl From<crate::services::PermissionError> for ApiError {
    fn from(err: crate::services::PermissionError) -> Self {
        match err {
            crate::services::PermissionError::InvalidRole(role) => {
                ApiError::validation_error(format!("invalid role: {role}"))
            }
            crate::services::PermissionError::InvalidLevel(level) => {
                ApiError::validation_error(format!("invalid permission level: {level}"))
            }
            crate::services::PermissionError::NotFound => ApiError::not_found("page not found"),
            crate::services::PermissionError::Conflict(page) => {
                ApiError::conflict(format!("page already exists: {page}"))
            }
            crate::services::PermissionError::Store(e) => e.into(),
        }
    }
}

impl From<crate::services::SlipError> for ApiError {
    fn from(err: crate::services::SlipError) -> Self {
        match err {
            crate::services::SlipError::Validation(msg) => ApiError::validation_error(msg),
            crate::services::SlipError::NotFound => ApiError::not_found("salary slip not found"),
            crate::services::SlipError::Key(e) => e.into(),
            crate::services::SlipError::Encryption(e) => e.into(),
            crate::services::SlipError::Store(e) => e.into(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
