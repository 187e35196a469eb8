//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping        GET   健康检查
//! - /api/status      GET   队列状态 + 会话状态
//! - /api/speak       POST  播报文本（TTS 或设备语音）
//! - /api/chat        POST  问 AI 并播报回复
//! - /api/play        POST  播放音频 URL
//! - /api/utterance   POST  识别文本接入（语音指令分类入口）
//! - /api/audio/{f}   GET   缓存音频下载

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/status", get(handlers::status))
        .route("/speak", post(handlers::speak))
        .route("/chat", post(handlers::chat))
        .route("/play", post(handlers::play))
        .route("/utterance", post(handlers::utterance))
        .route("/audio/:filename", get(handlers::get_audio))
}
