//! Application State

use std::sync::Arc;

use crate::application::{ProviderRegistry, SpeechService, TaskQueue, VoiceService};
use crate::infrastructure::cache::FsAudioCache;

/// 应用状态
pub struct AppState {
    pub queue: Arc<TaskQueue>,
    pub registry: Arc<ProviderRegistry>,
    pub speech: Arc<SpeechService>,
    pub voice: Arc<VoiceService>,
    pub cache: Arc<FsAudioCache>,
    /// API 鉴权 token，None 表示不鉴权
    pub auth_token: Option<String>,
}

impl AppState {
    pub fn new(
        queue: Arc<TaskQueue>,
        registry: Arc<ProviderRegistry>,
        speech: Arc<SpeechService>,
        voice: Arc<VoiceService>,
        cache: Arc<FsAudioCache>,
        auth_token: Option<String>,
    ) -> Self {
        Self {
            queue,
            registry,
            speech,
            voice,
            cache,
            auth_token,
        }
    }
}
