use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use sea_orm::{DbErr, SqlErr};
use serde::{Deserialize, Serialize};

/// Structured failure payload returned to the client.
///
/// Checkout callers rely on the `{success: false, message}` contract:
/// whatever goes wrong inside the write sequence, they always receive
/// this shape rather than a raw datastore error.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    /// HTTP status category (e.g., "Not Found", "Bad Request")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Customer {0} not found for this tenant")]
    CustomerNotFound(i64),

    #[error("Invalid service reference: {0}")]
    InvalidServiceReference(String),

    #[error("Membership plan {0} not found for this tenant")]
    MembershipPlanNotFound(i64),

    #[error("Invalid reference, please refresh and retry: {0}")]
    InvalidReference(String),

    #[error("Duplicate transaction: {0}")]
    DuplicateTransaction(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Driver-level SQL failures are classified before they reach the
/// client: a unique-constraint hit means a replayed checkout, a
/// foreign-key hit means a reference that vanished between the
/// existence check and the insert.
impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                ServiceError::DuplicateTransaction(detail)
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                ServiceError::InvalidReference(detail)
            }
            _ => ServiceError::DatabaseError(err),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_) | Self::InternalError(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) | Self::CustomerNotFound(_) | Self::MembershipPlanNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::ValidationError(_)
            | Self::InvalidInput(_)
            | Self::InvalidServiceReference(_)
            | Self::InvalidReference(_) => StatusCode::BAD_REQUEST,
            Self::DuplicateTransaction(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    /// Returns the message suitable for HTTP responses. Internal errors
    /// get a generic message so driver details never leak to the UI.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::InternalError(_) | Self::Other(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            success: false,
            error: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            message: self.response_message(),
            timestamp: Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}
