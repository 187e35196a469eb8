//! Volcano TTS Provider - 火山引擎语音合成
//!
//! 实现 TtsProvider trait，通过 HTTP 调用火山引擎 TTS 服务
//!
//! 外部 TTS API:
//! POST https://openspeech.bytedance.com/api/v1/tts
//! Request: {"app": {...}, "user": {...}, "audio": {...}, "request": {...}}  (JSON)
//! Response: {"code": 3000, "message": "...", "data": "<base64 audio>"}
//!
//! 鉴权支持两种模式（配置选择）：
//! - token:   `Authorization: Bearer;{access_token}`
//! - api_key: `X-Api-Key: {access_token}`

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{ProviderError, TtsProvider};
use crate::config::{VolcanoAuthMode, VolcanoConfig};
use crate::infrastructure::cache::FsAudioCache;

/// 火山引擎成功应用码
const VOLCANO_SUCCESS_CODE: i64 = 3000;

/// TTS 响应体
#[derive(Debug, Deserialize)]
struct VolcanoResponse {
    code: i64,
    #[serde(default)]
    message: String,
    /// base64 音频数据，失败时缺省
    #[serde(default)]
    data: String,
}

/// 火山引擎 TTS Provider
pub struct VolcanoProvider {
    client: Client,
    config: VolcanoConfig,
    cache: Arc<FsAudioCache>,
    /// 本服务的公开 Base URL（音箱从这里拉取合成音频）
    public_base_url: String,
}

impl VolcanoProvider {
    /// 创建 Provider
    pub fn new(
        config: VolcanoConfig,
        cache: Arc<FsAudioCache>,
        public_base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            config,
            cache,
            public_base_url: public_base_url.into(),
        })
    }

    /// 构造请求体
    fn build_request_body(&self, text: &str, reqid: &str) -> serde_json::Value {
        json!({
            "app": {
                "appid": self.config.app_id,
                "token": self.config.access_token,
                "cluster": self.config.cluster,
            },
            "user": {
                "uid": "miqiao",
            },
            "audio": {
                "voice_type": self.config.voice_type,
                "encoding": self.config.encoding,
                "rate": self.config.rate,
                "speed_ratio": self.config.speed_ratio,
                "volume_ratio": self.config.volume_ratio,
                "pitch_ratio": self.config.pitch_ratio,
            },
            "request": {
                "reqid": reqid,
                "text": text,
                "operation": "query",
            },
        })
    }
}

#[async_trait]
impl TtsProvider for VolcanoProvider {
    fn name(&self) -> &str {
        "volcano"
    }

    fn can_synthesize(&self) -> bool {
        true
    }

    async fn synthesize(&self, text: &str) -> Result<String, ProviderError> {
        let reqid = uuid::Uuid::new_v4().to_string();
        let body = self.build_request_body(text, &reqid);

        tracing::debug!(
            reqid = %reqid,
            text_chars = text.chars().count(),
            voice_type = %self.config.voice_type,
            "Sending volcano TTS request"
        );

        let mut request = self.client.post(&self.config.api_url).json(&body);
        request = match self.config.auth_mode {
            VolcanoAuthMode::Token => request.header(
                "Authorization",
                format!("Bearer;{}", self.config.access_token),
            ),
            VolcanoAuthMode::ApiKey => request.header("X-Api-Key", &self.config.access_token),
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::NetworkError("volcano TTS request timed out".to_string())
            } else if e.is_connect() {
                ProviderError::NetworkError(format!("cannot connect to volcano TTS: {}", e))
            } else {
                ProviderError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::SynthesisFailed {
                code: status.as_u16() as i64,
                message: error_text,
            });
        }

        let payload: VolcanoResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::NetworkError(format!("invalid volcano response: {}", e)))?;

        if payload.code != VOLCANO_SUCCESS_CODE {
            return Err(ProviderError::SynthesisFailed {
                code: payload.code,
                message: payload.message,
            });
        }

        let audio = base64::engine::general_purpose::STANDARD
            .decode(payload.data.as_bytes())
            .map_err(|e| ProviderError::SynthesisFailed {
                code: VOLCANO_SUCCESS_CODE,
                message: format!("invalid base64 audio payload: {}", e),
            })?;

        let filename = self
            .cache
            .store(&audio, &self.config.encoding)
            .await
            .map_err(|e| ProviderError::CacheError(e.to_string()))?;

        let url = format!("{}/api/audio/{}", self.public_base_url, filename);
        tracing::info!(reqid = %reqid, bytes = audio.len(), url = %url, "Volcano synthesis completed");
        Ok(url)
    }
}
