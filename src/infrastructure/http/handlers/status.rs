//! Status Handlers - 健康检查与运行状态

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::application::QueueStatus;
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::state::AppState;

/// Ping 响应
#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Ping endpoint - 健康检查
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// 运行状态响应
#[derive(Serialize)]
pub struct StatusResponseDto {
    pub queue: QueueStatus,
    pub ai_conversation_mode: bool,
    pub provider: String,
}

/// 运行状态：队列状态 + 会话状态 + 当前供应商
pub async fn status(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatusResponseDto>> {
    Json(ApiResponse::success(StatusResponseDto {
        queue: state.queue.status(),
        ai_conversation_mode: state.voice.ai_mode_active(),
        provider: state.speech.provider(),
    }))
}
