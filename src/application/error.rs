//! 应用层错误定义
//!
//! 统一的任务/服务错误类型，队列状态中记录的错误摘要也由此导出

use thiserror::Error;

use super::ports::{ProviderError, SpeakerError};

/// 应用层错误
#[derive(Debug, Error)]
pub enum AppError {
    /// 参数无效（注册调用等）
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// 请求了未注册的供应商
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// 供应商不具备合成能力
    #[error("Provider {0} does not support synthesis")]
    SynthesisNotSupported(String),

    /// 上游 TTS 合成失败
    #[error("Synthesis failed (code {code}): {message}")]
    SynthesisFailed { code: i64, message: String },

    /// 设备能力不可用
    #[error("Speaker engine not ready")]
    EngineNotReady,

    /// 故事模式等待上一段播放完成超时
    #[error("Playback wait timed out after {waited_secs}s")]
    PlaybackWaitTimeout { waited_secs: u64 },

    /// 设备调用失败
    #[error("Device error: {0}")]
    DeviceError(String),

    /// 任务执行失败（通用包装）
    #[error("Task failed: {0}")]
    TaskFailed(String),
}

impl AppError {
    /// 错误类别标识（用于队列状态与 API 错误码映射）
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidArgument(_) => "InvalidArgument",
            AppError::UnsupportedProvider(_) => "UnsupportedProvider",
            AppError::SynthesisNotSupported(_) => "SynthesisNotSupported",
            AppError::SynthesisFailed { .. } => "SynthesisFailed",
            AppError::EngineNotReady => "EngineNotReady",
            AppError::PlaybackWaitTimeout { .. } => "PlaybackWaitTimeout",
            AppError::DeviceError(_) => "DeviceError",
            AppError::TaskFailed(_) => "TaskFailed",
        }
    }
}

impl From<SpeakerError> for AppError {
    fn from(err: SpeakerError) -> Self {
        match err {
            SpeakerError::EngineNotReady => AppError::EngineNotReady,
            other => AppError::DeviceError(other.to_string()),
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::InvalidArgument(msg) => AppError::InvalidArgument(msg),
            ProviderError::UnsupportedProvider(name) => AppError::UnsupportedProvider(name),
            ProviderError::SynthesisNotSupported(name) => AppError::SynthesisNotSupported(name),
            ProviderError::SynthesisFailed { code, message } => {
                AppError::SynthesisFailed { code, message }
            }
            ProviderError::NetworkError(msg) => AppError::SynthesisFailed {
                code: -1,
                message: msg,
            },
            ProviderError::CacheError(msg) => AppError::SynthesisFailed {
                code: -1,
                message: format!("cache: {}", msg),
            },
        }
    }
}
