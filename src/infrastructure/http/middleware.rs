//! HTTP Middleware
//!
//! - Bearer token 鉴权
//! - HTTP 状态码错误日志

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::header::AUTHORIZATION;
use std::sync::Arc;

use super::error::ApiError;
use super::state::AppState;

/// 免鉴权路径：健康检查，以及音箱直接拉取音频的端点
fn is_public_path(path: &str) -> bool {
    path == "/api/ping" || path.starts_with("/api/audio/")
}

/// Bearer token 鉴权中间件
///
/// 未配置 auth_token 时直接放行。
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(expected) = &state.auth_token {
        if !is_public_path(request.uri().path()) {
            let authorized = request
                .headers()
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.strip_prefix("Bearer ") == Some(expected.as_str()))
                .unwrap_or(false);

            if !authorized {
                return ApiError::Unauthorized("invalid or missing token".to_string())
                    .into_response();
            }
        }
    }

    next.run(request).await
}

/// HTTP 状态码错误日志中间件
///
/// 拦截 HTTP 响应，当状态码为 4xx 或 5xx 时记录日志
/// 注意：业务错误（errno != 0）在 ApiError::into_response() 中记录
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            "HTTP client error"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        assert!(is_public_path("/api/ping"));
        assert!(is_public_path("/api/audio/tts-1-abc.mp3"));
        assert!(!is_public_path("/api/speak"));
        assert!(!is_public_path("/api/utterance"));
    }
}
