//! Fake Speaker - 测试用音箱
//!
//! 记录全部设备调用，返回预设的 AI 回复，可模拟设备未就绪。

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::application::ports::{
    AiMessage, AiReply, PlayRequest, PlaybackStatus, SpeakerError, SpeakerPort,
};

/// 记录下来的一次设备调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeakerCall {
    Abort,
    PlayText(String),
    PlayUrl { url: String, blocking: bool },
    Status,
    AskAi(String),
}

/// 测试用音箱
pub struct FakeSpeaker {
    calls: Mutex<Vec<SpeakerCall>>,
    ai_reply: Mutex<String>,
    ready: AtomicBool,
    playing: AtomicBool,
}

impl FakeSpeaker {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            ai_reply: Mutex::new(String::new()),
            ready: AtomicBool::new(true),
            playing: AtomicBool::new(false),
        }
    }

    /// 全部调用记录
    pub fn calls(&self) -> Vec<SpeakerCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// 设置 ask_ai 的返回文本
    pub fn set_ai_reply(&self, reply: impl Into<String>) {
        *self.ai_reply.lock().unwrap_or_else(|e| e.into_inner()) = reply.into();
    }

    /// 模拟设备就绪状态
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// 模拟播放中状态
    pub fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::SeqCst);
    }

    fn record(&self, call: SpeakerCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

impl Default for FakeSpeaker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeakerPort for FakeSpeaker {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn abort_playback(&self) -> Result<(), SpeakerError> {
        self.record(SpeakerCall::Abort);
        self.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn play(&self, request: PlayRequest) -> Result<(), SpeakerError> {
        match request {
            PlayRequest::Text(text) => self.record(SpeakerCall::PlayText(text)),
            PlayRequest::Url { url, blocking } => {
                self.record(SpeakerCall::PlayUrl { url, blocking })
            }
        }
        Ok(())
    }

    async fn playback_status(&self) -> Result<PlaybackStatus, SpeakerError> {
        self.record(SpeakerCall::Status);
        Ok(PlaybackStatus {
            is_playing: self.playing.load(Ordering::SeqCst),
        })
    }

    async fn ask_ai(&self, message: AiMessage) -> Result<AiReply, SpeakerError> {
        self.record(SpeakerCall::AskAi(message.text));
        Ok(AiReply {
            text: self
                .ai_reply
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone(),
        })
    }
}
