//! Story Pacer - 故事模式分段播放
//!
//! 长文本分段后逐段走 合成 -> 播放 -> 轮询等待播放完成 的循环。
//! 设备只能被轮询，不会推送播放结束事件，所以等待是一个带硬超时的
//! 定时轮询循环。段间静默不超过一个轮询间隔，段与段绝不重叠。

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::domain::chunker::{chunk_story, ChunkConfig};

use super::error::AppError;
use super::ports::{PlayRequest, SpeakerPort};
use super::registry::ProviderRegistry;

/// 故事模式配置
#[derive(Debug, Clone)]
pub struct StoryPacerConfig {
    /// 分段上限
    pub chunk: ChunkConfig,
    /// 播放状态轮询间隔
    pub poll_interval: Duration,
    /// 等待上一段播放完成的超时时间
    pub wait_timeout: Duration,
}

impl Default for StoryPacerConfig {
    fn default() -> Self {
        Self {
            chunk: ChunkConfig::default(),
            poll_interval: Duration::from_millis(1000),
            wait_timeout: Duration::from_secs(300),
        }
    }
}

/// 故事分段播放器
pub struct StoryPacer {
    config: StoryPacerConfig,
    speaker: Arc<dyn SpeakerPort>,
    registry: Arc<ProviderRegistry>,
}

impl StoryPacer {
    pub fn new(
        config: StoryPacerConfig,
        speaker: Arc<dyn SpeakerPort>,
        registry: Arc<ProviderRegistry>,
    ) -> Self {
        Self {
            config,
            speaker,
            registry,
        }
    }

    /// 逐段讲述一个故事，返回播放的段数
    ///
    /// 第 0 段直接合成播放；之后每段先等待前一段播放完成。
    /// 任何一段合成失败即中止后续段并上抛错误（不做静默降级）。
    pub async fn speak_story(&self, provider: &str, text: &str) -> Result<usize, AppError> {
        let chunks = chunk_story(text, &self.config.chunk);
        tracing::info!(provider = %provider, chunks = chunks.len(), "Story pacing started");

        for (index, chunk) in chunks.iter().enumerate() {
            if index > 0 {
                self.wait_playback_idle().await?;
            }

            let url = self.registry.synthesize(provider, chunk).await?;
            self.speaker
                .play(PlayRequest::Url {
                    url,
                    blocking: false,
                })
                .await?;

            tracing::debug!(index = index, chars = chunk.chars().count(), "Story chunk playing");
        }

        Ok(chunks.len())
    }

    /// 轮询等待设备播放结束
    ///
    /// 每次轮询前先睡一个间隔，给刚下发的播放指令留出起播时间；
    /// 超过硬超时则返回 `PlaybackWaitTimeout`。
    async fn wait_playback_idle(&self) -> Result<(), AppError> {
        let deadline = Instant::now() + self.config.wait_timeout;

        loop {
            tokio::time::sleep(self.config.poll_interval).await;

            if Instant::now() >= deadline {
                return Err(AppError::PlaybackWaitTimeout {
                    waited_secs: self.config.wait_timeout.as_secs(),
                });
            }

            let status = self.speaker.playback_status().await?;
            if !status.is_playing {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        AiMessage, AiReply, PlaybackStatus, ProviderError, SpeakerError, TtsProvider,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// 播放后若干次状态轮询内保持 playing 的测试音箱
    struct PollingSpeaker {
        played: Mutex<Vec<String>>,
        polls_per_play: usize,
        remaining_polls: AtomicUsize,
    }

    impl PollingSpeaker {
        fn new(polls_per_play: usize) -> Self {
            Self {
                played: Mutex::new(Vec::new()),
                polls_per_play,
                remaining_polls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SpeakerPort for PollingSpeaker {
        async fn abort_playback(&self) -> Result<(), SpeakerError> {
            Ok(())
        }

        async fn play(&self, request: PlayRequest) -> Result<(), SpeakerError> {
            if let PlayRequest::Url { url, .. } = request {
                self.played.lock().unwrap().push(url);
            }
            self.remaining_polls
                .store(self.polls_per_play, Ordering::SeqCst);
            Ok(())
        }

        async fn playback_status(&self) -> Result<PlaybackStatus, SpeakerError> {
            let prev = self
                .remaining_polls
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                    Some(n.saturating_sub(1))
                })
                .unwrap();
            Ok(PlaybackStatus {
                is_playing: prev > 0,
            })
        }

        async fn ask_ai(&self, _message: AiMessage) -> Result<AiReply, SpeakerError> {
            Ok(AiReply {
                text: String::new(),
            })
        }
    }

    /// 前 N 次成功之后失败的测试供应商
    struct FlakyProvider {
        succeed_times: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TtsProvider for FlakyProvider {
        fn name(&self) -> &str {
            "flaky"
        }

        fn can_synthesize(&self) -> bool {
            true
        }

        async fn synthesize(&self, text: &str) -> Result<String, ProviderError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.succeed_times {
                Ok(format!("http://audio/{}", text))
            } else {
                Err(ProviderError::SynthesisFailed {
                    code: 500,
                    message: "upstream down".to_string(),
                })
            }
        }
    }

    fn pacer_config() -> StoryPacerConfig {
        StoryPacerConfig {
            chunk: ChunkConfig {
                first_chunk_max_chars: 5,
                normal_chunk_max_chars: 10,
            },
            poll_interval: Duration::from_millis(5),
            wait_timeout: Duration::from_millis(200),
        }
    }

    #[tokio::test]
    async fn test_chunks_played_sequentially() {
        let speaker = Arc::new(PollingSpeaker::new(3));
        let registry = Arc::new(ProviderRegistry::new());
        registry
            .register(
                "flaky",
                Arc::new(FlakyProvider {
                    succeed_times: usize::MAX,
                    calls: AtomicUsize::new(0),
                }),
            )
            .unwrap();

        let pacer = StoryPacer::new(pacer_config(), speaker.clone(), registry);
        let count = pacer
            .speak_story("flaky", "第一句。第二句。第三句。")
            .await
            .unwrap();

        assert_eq!(count, 2);
        let played = speaker.played.lock().unwrap().clone();
        assert_eq!(
            played,
            vec![
                "http://audio/第一句。".to_string(),
                "http://audio/第二句。第三句。".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_synthesis_failure_aborts_remaining_chunks() {
        let speaker = Arc::new(PollingSpeaker::new(1));
        let registry = Arc::new(ProviderRegistry::new());
        registry
            .register(
                "flaky",
                Arc::new(FlakyProvider {
                    succeed_times: 1,
                    calls: AtomicUsize::new(0),
                }),
            )
            .unwrap();

        let pacer = StoryPacer::new(pacer_config(), speaker.clone(), registry);
        let result = pacer.speak_story("flaky", "第一句。第二句。第三句。").await;

        assert!(matches!(result, Err(AppError::SynthesisFailed { .. })));
        // 只播放了失败前的那一段
        assert_eq!(speaker.played.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_wait_timeout() {
        // 永远 playing 的音箱
        let speaker = Arc::new(PollingSpeaker::new(usize::MAX));
        let registry = Arc::new(ProviderRegistry::new());
        registry
            .register(
                "flaky",
                Arc::new(FlakyProvider {
                    succeed_times: usize::MAX,
                    calls: AtomicUsize::new(0),
                }),
            )
            .unwrap();

        let pacer = StoryPacer::new(pacer_config(), speaker, registry);
        let result = pacer.speak_story("flaky", "第一句。第二句。").await;

        assert!(matches!(
            result,
            Err(AppError::PlaybackWaitTimeout { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_text_plays_nothing() {
        let speaker = Arc::new(PollingSpeaker::new(0));
        let registry = Arc::new(ProviderRegistry::new());
        let pacer = StoryPacer::new(pacer_config(), speaker.clone(), registry);

        let count = pacer.speak_story("flaky", "  ").await.unwrap();
        assert_eq!(count, 0);
        assert!(speaker.played.lock().unwrap().is_empty());
    }
}
