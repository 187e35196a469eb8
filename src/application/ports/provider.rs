//! TTS Provider Port - 语音合成供应商抽象
//!
//! 供应商是一个可选具备合成能力的具名实现：`xiaomi` 只占位（播放走设备
//! 默认语音），`volcano` 通过网络合成并返回可播放的音频 URL。

use async_trait::async_trait;
use thiserror::Error;

/// Provider 错误
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("Provider {0} does not support synthesis")]
    SynthesisNotSupported(String),

    #[error("Synthesis failed (code {code}): {message}")]
    SynthesisFailed { code: i64, message: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Cache error: {0}")]
    CacheError(String),
}

/// TTS Provider Port
///
/// 合成能力是可选的：`can_synthesize` 返回 false 的供应商，
/// 其 `synthesize` 永远返回 `SynthesisNotSupported`，不发起任何网络调用。
#[async_trait]
pub trait TtsProvider: Send + Sync {
    /// 供应商名称（注册表内的规范名）
    fn name(&self) -> &str;

    /// 是否具备合成能力
    fn can_synthesize(&self) -> bool {
        false
    }

    /// 合成文本，返回可播放的音频 URL
    async fn synthesize(&self, _text: &str) -> Result<String, ProviderError> {
        Err(ProviderError::SynthesisNotSupported(self.name().to_string()))
    }
}
