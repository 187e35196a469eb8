//! Miqiao - 小爱音箱 AI 语音中介服务
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - 故事分段器（长文本讲述的分块策略）
//! - 语音指令解释器（唤醒词 / 模式切换 / 停止指令分类）
//!
//! 应用层 (application/):
//! - Ports: 端口定义（SpeakerPort, TtsProvider）
//! - TaskQueue: 全局串行任务队列（设备操作唯一入口）
//! - ProviderRegistry: TTS 供应商注册表（别名解析 + 能力查询）
//! - StoryPacer: 故事模式分段播放
//! - SpeechService / VoiceService: speak / chat / play / 语音指令编排
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API（speak / chat / play / utterance / audio）
//! - Cache: 文件系统音频缓存（按时间淘汰）
//! - Adapters: 火山引擎 TTS 客户端、音箱设备客户端

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
