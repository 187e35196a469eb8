//! Utterance Handler - 识别文本接入
//!
//! 设备每识别出一句话推送一次。响应 data 非空表示指令已接管，
//! 设备应抑制默认回复；data 为 null 表示交回设备默认处理。

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::infrastructure::http::dto::{ApiResponse, UtteranceRequest, UtteranceResponseDto};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

pub async fn utterance(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UtteranceRequest>,
) -> Result<Json<ApiResponse<UtteranceResponseDto>>, ApiError> {
    let handled = state.voice.handle_utterance(&req.text)?;

    Ok(Json(ApiResponse::maybe(handled.map(|h| {
        UtteranceResponseDto {
            handled: true,
            action: h.action.to_string(),
        }
    }))))
}
