//! Speaker Port - 音箱设备能力抽象
//!
//! 定义核心所需的设备原语，具体实现在 infrastructure/adapters 层。
//! 设备侧的认证、协议封帧和 AI 模型调用不在本服务范围内。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Speaker 错误
#[derive(Debug, Error)]
pub enum SpeakerError {
    #[error("Speaker engine not ready")]
    EngineNotReady,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Device error: {0}")]
    DeviceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 播放请求
#[derive(Debug, Clone)]
pub enum PlayRequest {
    /// 设备默认语音播报文本
    Text(String),
    /// 播放音频 URL
    Url { url: String, blocking: bool },
}

/// 播放状态（只能轮询，设备不会主动推送）
#[derive(Debug, Clone, Copy)]
pub struct PlaybackStatus {
    pub is_playing: bool,
}

/// 发给设备侧 AI 的消息
#[derive(Debug, Clone)]
pub struct AiMessage {
    pub id: String,
    pub role: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl AiMessage {
    /// 构造一条用户消息
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: "user".to_string(),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// AI 回复
#[derive(Debug, Clone)]
pub struct AiReply {
    pub text: String,
}

/// Speaker Port
///
/// 音箱设备的抽象接口。所有调用都必须经由任务队列串行化，
/// 保证设备在任一时刻只处理一条播放指令。
#[async_trait]
pub trait SpeakerPort: Send + Sync {
    /// 设备能力是否就绪
    fn is_ready(&self) -> bool {
        true
    }

    /// 中止当前播放
    async fn abort_playback(&self) -> Result<(), SpeakerError>;

    /// 播放文本（设备默认语音）或音频 URL
    async fn play(&self, request: PlayRequest) -> Result<(), SpeakerError>;

    /// 查询播放状态
    async fn playback_status(&self) -> Result<PlaybackStatus, SpeakerError>;

    /// 向设备侧 AI 提问
    async fn ask_ai(&self, message: AiMessage) -> Result<AiReply, SpeakerError>;
}
