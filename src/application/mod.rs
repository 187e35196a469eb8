//! Application Layer - 任务队列、注册表与服务编排
//!
//! - ports: 出站端口（SpeakerPort, TtsProvider）
//! - task_queue: 全局串行任务队列
//! - registry: TTS 供应商注册表
//! - story: 故事模式分段播放
//! - speech: speak / chat / play 操作
//! - voice: 语音指令处理与会话状态

mod error;
pub mod ports;
mod registry;
mod speech;
mod story;
mod task_queue;
mod voice;

pub use error::AppError;
pub use registry::ProviderRegistry;
pub use speech::{
    ChatCommand, ChatOutcome, PlayCommand, PlayOutcome, SpeakCommand, SpeakOutcome, SpeechService,
};
pub use story::{StoryPacer, StoryPacerConfig};
pub use task_queue::{QueueStatus, TaskErrorInfo, TaskQueue};
pub use voice::{HandledUtterance, VoiceService, VoiceServiceConfig};
