//! HTTP Speaker Client - 调用音箱设备桥接服务
//!
//! 实现 SpeakerPort trait，通过 HTTP 调用运行在设备侧的桥接服务
//!
//! 桥接 API:
//! - POST {base}/api/playback/abort
//! - POST {base}/api/playback/play     {"text": "..."} 或 {"url": "...", "blocking": bool}
//! - GET  {base}/api/playback/status   -> {"is_playing": bool}
//! - POST {base}/api/ai/ask            {"id", "role", "text", "timestamp"} -> {"text": "..."}

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::application::ports::{
    AiMessage, AiReply, PlayRequest, PlaybackStatus, SpeakerError, SpeakerPort,
};

/// HTTP Speaker 客户端配置
#[derive(Debug, Clone)]
pub struct HttpSpeakerClientConfig {
    /// 设备桥接服务 Base URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpSpeakerClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9528".to_string(),
            timeout_secs: 30,
        }
    }
}

impl HttpSpeakerClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    is_playing: bool,
}

#[derive(Debug, Deserialize)]
struct AskResponse {
    text: String,
}

/// HTTP Speaker 客户端
pub struct HttpSpeakerClient {
    client: Client,
    config: HttpSpeakerClientConfig,
}

impl HttpSpeakerClient {
    /// 创建新的客户端
    pub fn new(config: HttpSpeakerClientConfig) -> Result<Self, SpeakerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SpeakerError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn map_error(e: reqwest::Error) -> SpeakerError {
        if e.is_timeout() {
            SpeakerError::Timeout
        } else if e.is_connect() {
            SpeakerError::NetworkError(format!("cannot connect to speaker bridge: {}", e))
        } else {
            SpeakerError::NetworkError(e.to_string())
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SpeakerError> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SpeakerError::DeviceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl SpeakerPort for HttpSpeakerClient {
    async fn abort_playback(&self) -> Result<(), SpeakerError> {
        let response = self
            .client
            .post(self.url("/api/playback/abort"))
            .send()
            .await
            .map_err(Self::map_error)?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn play(&self, request: PlayRequest) -> Result<(), SpeakerError> {
        let body = match request {
            PlayRequest::Text(text) => json!({ "text": text }),
            PlayRequest::Url { url, blocking } => json!({ "url": url, "blocking": blocking }),
        };

        let response = self
            .client
            .post(self.url("/api/playback/play"))
            .json(&body)
            .send()
            .await
            .map_err(Self::map_error)?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn playback_status(&self) -> Result<PlaybackStatus, SpeakerError> {
        let response = self
            .client
            .get(self.url("/api/playback/status"))
            .send()
            .await
            .map_err(Self::map_error)?;
        let payload: StatusResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| SpeakerError::InvalidResponse(e.to_string()))?;

        Ok(PlaybackStatus {
            is_playing: payload.is_playing,
        })
    }

    async fn ask_ai(&self, message: AiMessage) -> Result<AiReply, SpeakerError> {
        let body = json!({
            "id": message.id,
            "role": message.role,
            "text": message.text,
            "timestamp": message.timestamp.timestamp_millis(),
        });

        let response = self
            .client
            .post(self.url("/api/ai/ask"))
            .json(&body)
            .send()
            .await
            .map_err(Self::map_error)?;
        let payload: AskResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| SpeakerError::InvalidResponse(e.to_string()))?;

        Ok(AiReply { text: payload.text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = HttpSpeakerClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:9528");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_config_builder() {
        let config = HttpSpeakerClientConfig::new("http://speaker:9000").with_timeout(5);
        assert_eq!(config.base_url, "http://speaker:9000");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_url_join() {
        let client = HttpSpeakerClient::new(HttpSpeakerClientConfig::new("http://speaker:9000"))
            .unwrap();
        assert_eq!(
            client.url("/api/playback/abort"),
            "http://speaker:9000/api/playback/abort"
        );
    }
}
