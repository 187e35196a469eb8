//! Speak / Chat / Play Handlers
//!
//! 三个请求都打包为任务进入全局队列，响应在任务真正完成后返回。

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{ChatCommand, PlayCommand, SpeakCommand};
use crate::infrastructure::http::dto::{
    ApiResponse, ChatRequest, ChatResponseDto, PlayResponseDto, PlayUrlRequest, SpeakRequest,
    SpeakResponseDto,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

pub async fn speak(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpeakRequest>,
) -> Result<Json<ApiResponse<SpeakResponseDto>>, ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text is required".to_string()));
    }

    let outcome = state
        .speech
        .speak(SpeakCommand {
            text: req.text,
            interrupt: req.interrupt,
            story_mode: req.story_mode,
        })
        .await?;

    Ok(Json(ApiResponse::success(SpeakResponseDto {
        mode: outcome.mode,
        text: outcome.text,
    })))
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatResponseDto>>, ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text is required".to_string()));
    }

    let outcome = state
        .speech
        .chat(ChatCommand {
            text: req.text,
            interrupt: req.interrupt,
            story_mode: req.story_mode,
        })
        .await?;

    Ok(Json(ApiResponse::success(ChatResponseDto {
        mode: outcome.mode,
        reply_text: outcome.reply_text,
    })))
}

pub async fn play(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PlayUrlRequest>,
) -> Result<Json<ApiResponse<PlayResponseDto>>, ApiError> {
    if req.url.trim().is_empty() {
        return Err(ApiError::BadRequest("url is required".to_string()));
    }

    let outcome = state
        .speech
        .play(PlayCommand {
            url: req.url,
            interrupt: req.interrupt,
            blocking: req.blocking,
        })
        .await?;

    Ok(Json(ApiResponse::success(PlayResponseDto {
        mode: outcome.mode,
    })))
}
