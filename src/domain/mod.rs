//! Domain Layer - 纯领域逻辑
//!
//! - chunker: 故事文本分段
//! - interpreter: 语音指令分类

pub mod chunker;
pub mod interpreter;
