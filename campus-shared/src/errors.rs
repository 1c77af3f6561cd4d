use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{service}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Session/token errors
/// - E2xxx: Dating errors
/// - E8xxx: Wallet and savings errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    ServiceUnavailable,
    BadRequest,

    // Session (E1xxx)
    TokenExpired,
    TokenInvalid,

    // Dating (E2xxx)
    ProfileNotFound,
    ProfileRequired,
    CannotSwipeSelf,
    AlreadySwiped,
    MatchNotFound,

    // Wallet (E8xxx)
    WalletNotFound,
    GoalNotFound,
    InsufficientFunds,
    InsufficientGoalFunds,
    InvalidAmount,
    WalletSessionExpired,
    WalletApiFailed,
    WalletApiDecode,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::ServiceUnavailable => "E0007",
            Self::BadRequest => "E0008",

            // Session
            Self::TokenExpired => "E1001",
            Self::TokenInvalid => "E1002",

            // Dating
            Self::ProfileNotFound => "E2001",
            Self::ProfileRequired => "E2002",
            Self::CannotSwipeSelf => "E2003",
            Self::AlreadySwiped => "E2004",
            Self::MatchNotFound => "E2005",

            // Wallet
            Self::WalletNotFound => "E8001",
            Self::GoalNotFound => "E8002",
            Self::InsufficientFunds => "E8003",
            Self::InsufficientGoalFunds => "E8004",
            Self::InvalidAmount => "E8005",
            Self::WalletSessionExpired => "E8006",
            Self::WalletApiFailed => "E8007",
            Self::WalletApiDecode => "E8008",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::ValidationError | Self::BadRequest | Self::InvalidAmount => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::ProfileNotFound | Self::MatchNotFound
            | Self::WalletNotFound | Self::GoalNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::TokenExpired | Self::TokenInvalid
            | Self::WalletSessionExpired => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::ProfileRequired | Self::CannotSwipeSelf => StatusCode::FORBIDDEN,
            Self::AlreadySwiped => StatusCode::CONFLICT,
            Self::InsufficientFunds | Self::InsufficientGoalFunds => StatusCode::UNPROCESSABLE_ENTITY,
            Self::WalletApiFailed | Self::WalletApiDecode => StatusCode::BAD_GATEWAY,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// The error code this error renders with.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Known { code, .. } => *code,
            AppError::Internal(_) => ErrorCode::InternalError,
            AppError::Database(diesel::result::Error::NotFound) => ErrorCode::NotFound,
            AppError::Database(_) => ErrorCode::InternalError,
            AppError::Validation(_) => ErrorCode::ValidationError,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(errors.field_errors()).unwrap_or(serde_json::Value::Null);
        Self::with_details(ErrorCode::ValidationError, "request validation failed", details)
    }
}

impl AppError {
    /// Text safe to show a client. Wrapped causes stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::Known { message, .. } => message.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Database(diesel::result::Error::NotFound) => "resource not found".to_string(),
            AppError::Database(_) => "database error".to_string(),
            AppError::Internal(_) => "internal server error".to_string(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Known { details, .. } => details.clone(),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status = code.status_code();

        match &self {
            AppError::Internal(err) => tracing::error!(error = ?err, "internal server error"),
            AppError::Database(diesel::result::Error::NotFound) => {}
            AppError::Database(err) => tracing::error!(error = %err, "database error"),
            AppError::Known { message, .. } if status.is_server_error() => {
                tracing::error!(code = code.code(), error = %message, "request failed")
            }
            _ => tracing::debug!(code = code.code(), status = status.as_u16(), "request rejected"),
        }

        let body = ApiErrorResponse::new(code.code(), self.public_message(), self.details());
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
