//! Data Transfer Objects

use serde::{Deserialize, Serialize};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }

    /// 成功响应（data 可空）
    pub fn maybe(data: Option<T>) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data,
        }
    }
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Speak / Chat / Play DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SpeakRequest {
    pub text: String,
    #[serde(default = "default_true")]
    pub interrupt: bool,
    #[serde(default, alias = "storyMode")]
    pub story_mode: bool,
}

#[derive(Debug, Serialize)]
pub struct SpeakResponseDto {
    pub mode: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
    #[serde(default = "default_true")]
    pub interrupt: bool,
    #[serde(default, alias = "storyMode")]
    pub story_mode: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatResponseDto {
    pub mode: String,
    pub reply_text: String,
}

#[derive(Debug, Deserialize)]
pub struct PlayUrlRequest {
    pub url: String,
    #[serde(default = "default_true")]
    pub interrupt: bool,
    #[serde(default)]
    pub blocking: bool,
}

#[derive(Debug, Serialize)]
pub struct PlayResponseDto {
    pub mode: String,
}

// ============================================================================
// Utterance DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UtteranceRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct UtteranceResponseDto {
    pub handled: bool,
    pub action: String,
}
