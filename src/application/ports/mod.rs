//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod provider;
mod speaker;

pub use provider::{ProviderError, TtsProvider};
pub use speaker::{
    AiMessage, AiReply, PlayRequest, PlaybackStatus, SpeakerError, SpeakerPort,
};
