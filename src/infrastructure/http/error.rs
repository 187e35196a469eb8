//! HTTP Error Handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::AppError;

/// 业务错误码
pub mod errno {
    pub const BAD_REQUEST: i32 = 1001;
    pub const UNAUTHORIZED: i32 = 1002;
    pub const NOT_FOUND: i32 = 1003;
    pub const INTERNAL_ERROR: i32 = 1004;
    pub const SERVICE_UNAVAILABLE: i32 = 1005;
}

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Internal(String),
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // 业务错误统一 200 + errno，鉴权失败保留 401
        let (status, response) = match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!(errno = errno::BAD_REQUEST, error = %msg, "Bad request");
                (
                    StatusCode::OK,
                    ErrorResponse::new(errno::BAD_REQUEST, msg),
                )
            }
            ApiError::Unauthorized(msg) => {
                tracing::warn!(errno = errno::UNAUTHORIZED, error = %msg, "Unauthorized");
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse::new(errno::UNAUTHORIZED, msg),
                )
            }
            ApiError::NotFound(msg) => {
                tracing::warn!(errno = errno::NOT_FOUND, error = %msg, "Not found");
                (StatusCode::OK, ErrorResponse::new(errno::NOT_FOUND, msg))
            }
            ApiError::Internal(msg) => {
                tracing::error!(errno = errno::INTERNAL_ERROR, error = %msg, "Internal server error");
                (
                    StatusCode::OK,
                    ErrorResponse::new(errno::INTERNAL_ERROR, msg),
                )
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::error!(errno = errno::SERVICE_UNAVAILABLE, error = %msg, "Service unavailable");
                (
                    StatusCode::OK,
                    ErrorResponse::new(errno::SERVICE_UNAVAILABLE, msg),
                )
            }
        };

        (status, Json(response)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::InvalidArgument(msg) => ApiError::BadRequest(msg),
            AppError::UnsupportedProvider(_) | AppError::SynthesisNotSupported(_) => {
                ApiError::BadRequest(e.to_string())
            }
            AppError::EngineNotReady => ApiError::ServiceUnavailable(e.to_string()),
            AppError::SynthesisFailed { .. }
            | AppError::PlaybackWaitTimeout { .. }
            | AppError::DeviceError(_) => ApiError::ServiceUnavailable(e.to_string()),
            AppError::TaskFailed(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<crate::infrastructure::cache::CacheError> for ApiError {
    fn from(e: crate::infrastructure::cache::CacheError) -> Self {
        use crate::infrastructure::cache::CacheError;
        match e {
            CacheError::NotFound(name) => ApiError::NotFound(format!("audio not found: {}", name)),
            CacheError::InvalidFilename(name) => {
                ApiError::BadRequest(format!("invalid audio filename: {}", name))
            }
            CacheError::IoError(msg) => ApiError::Internal(msg),
        }
    }
}
