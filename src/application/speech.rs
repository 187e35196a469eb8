//! Speech Service - speak / chat / play 操作编排
//!
//! 所有设备操作在此打包为任务提交到全局队列。`interrupt` 作为任务的
//! 第一个动作触发一次中止播放，不会取消其他已排队任务。
//!
//! 单次合成失败会本地降级到设备默认语音（结果 mode 标记为 `xiaomi`），
//! 故事模式的合成失败不降级，直接上抛。

use std::future::Future;
use std::sync::Arc;

use super::error::AppError;
use super::ports::{AiMessage, PlayRequest, SpeakerPort};
use super::registry::ProviderRegistry;
use super::story::StoryPacer;
use super::task_queue::TaskQueue;

/// Speak 请求
#[derive(Debug, Clone)]
pub struct SpeakCommand {
    pub text: String,
    pub interrupt: bool,
    pub story_mode: bool,
}

/// Chat 请求
#[derive(Debug, Clone)]
pub struct ChatCommand {
    pub text: String,
    pub interrupt: bool,
    pub story_mode: bool,
}

/// Play 请求
#[derive(Debug, Clone)]
pub struct PlayCommand {
    pub url: String,
    pub interrupt: bool,
    pub blocking: bool,
}

/// Speak 结果
#[derive(Debug, Clone)]
pub struct SpeakOutcome {
    /// 实际出声方式: xiaomi / tts:<provider> / tts:<provider>:story
    pub mode: String,
    pub text: String,
}

/// Chat 结果
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub mode: String,
    pub reply_text: String,
}

/// Play 结果
#[derive(Debug, Clone)]
pub struct PlayOutcome {
    pub mode: String,
}

/// Speech Service
pub struct SpeechService {
    queue: Arc<TaskQueue>,
    speaker: Arc<dyn SpeakerPort>,
    registry: Arc<ProviderRegistry>,
    pacer: Arc<StoryPacer>,
    /// 默认 TTS 供应商（可为别名）
    provider: String,
    /// 故事模式附加给 AI 的系统指令
    story_instruction: String,
}

impl SpeechService {
    pub fn new(
        queue: Arc<TaskQueue>,
        speaker: Arc<dyn SpeakerPort>,
        registry: Arc<ProviderRegistry>,
        pacer: Arc<StoryPacer>,
        provider: impl Into<String>,
        story_instruction: impl Into<String>,
    ) -> Self {
        Self {
            queue,
            speaker,
            registry,
            pacer,
            provider: provider.into(),
            story_instruction: story_instruction.into(),
        }
    }

    /// 当前默认供应商的规范名
    pub fn provider(&self) -> String {
        self.registry.resolve(&self.provider)
    }

    /// 提交一个 speak 任务，返回完成 future
    ///
    /// 设备未就绪时立即返回 `EngineNotReady`，不入队。
    pub fn submit_speak(
        &self,
        task_type: &str,
        cmd: SpeakCommand,
    ) -> Result<impl Future<Output = Result<SpeakOutcome, AppError>>, AppError> {
        if !self.speaker.is_ready() {
            return Err(AppError::EngineNotReady);
        }

        let speaker = self.speaker.clone();
        let registry = self.registry.clone();
        let pacer = self.pacer.clone();
        let provider = self.provider.clone();

        Ok(self.queue.enqueue(task_type.to_string(), async move {
            let mode = render_speech(
                speaker,
                registry,
                pacer,
                &provider,
                &cmd.text,
                cmd.interrupt,
                cmd.story_mode,
            )
            .await?;
            Ok(SpeakOutcome {
                mode,
                text: cmd.text,
            })
        }))
    }

    /// speak：合成（或设备语音）播报一段文本
    pub async fn speak(&self, cmd: SpeakCommand) -> Result<SpeakOutcome, AppError> {
        self.submit_speak("speak", cmd)?.await
    }

    /// 提交一个 chat 任务：问 AI 并播报回复
    pub fn submit_chat(
        &self,
        task_type: &str,
        cmd: ChatCommand,
    ) -> Result<impl Future<Output = Result<ChatOutcome, AppError>>, AppError> {
        if !self.speaker.is_ready() {
            return Err(AppError::EngineNotReady);
        }

        let speaker = self.speaker.clone();
        let registry = self.registry.clone();
        let pacer = self.pacer.clone();
        let provider = self.provider.clone();
        let instruction = self.story_instruction.clone();

        Ok(self.queue.enqueue(task_type.to_string(), async move {
            if cmd.interrupt {
                speaker.abort_playback().await?;
            }

            let prompt = if cmd.story_mode && !instruction.is_empty() {
                format!("{}\n{}", cmd.text, instruction)
            } else {
                cmd.text.clone()
            };

            let reply = speaker.ask_ai(AiMessage::user(prompt)).await?;
            tracing::info!(reply_chars = reply.text.chars().count(), "AI reply received");

            // interrupt 已在任务开头处理过
            let mode = render_speech(
                speaker,
                registry,
                pacer,
                &provider,
                &reply.text,
                false,
                cmd.story_mode,
            )
            .await?;

            Ok(ChatOutcome {
                mode,
                reply_text: reply.text,
            })
        }))
    }

    /// chat：问 AI 并播报回复
    pub async fn chat(&self, cmd: ChatCommand) -> Result<ChatOutcome, AppError> {
        self.submit_chat("chat", cmd)?.await
    }

    /// play：直接播放音频 URL
    pub async fn play(&self, cmd: PlayCommand) -> Result<PlayOutcome, AppError> {
        if !self.speaker.is_ready() {
            return Err(AppError::EngineNotReady);
        }

        let speaker = self.speaker.clone();
        self.queue
            .enqueue("play", async move {
                if cmd.interrupt {
                    speaker.abort_playback().await?;
                }
                speaker
                    .play(PlayRequest::Url {
                        url: cmd.url,
                        blocking: cmd.blocking,
                    })
                    .await?;
                Ok(PlayOutcome {
                    mode: "url".to_string(),
                })
            })
            .await
    }
}

/// 把一段文本变成声音，返回实际出声方式
///
/// 优先走供应商合成；单次合成失败降级到设备默认语音。
/// 故事模式走 StoryPacer，其合成失败直接上抛。
async fn render_speech(
    speaker: Arc<dyn SpeakerPort>,
    registry: Arc<ProviderRegistry>,
    pacer: Arc<StoryPacer>,
    provider: &str,
    text: &str,
    interrupt: bool,
    story_mode: bool,
) -> Result<String, AppError> {
    if interrupt {
        speaker.abort_playback().await?;
    }

    let canonical = registry.resolve(provider);
    if registry.can_synthesize(&canonical) {
        if story_mode {
            pacer.speak_story(&canonical, text).await?;
            return Ok(format!("tts:{}:story", canonical));
        }

        match registry.synthesize(&canonical, text).await {
            Ok(url) => {
                speaker
                    .play(PlayRequest::Url {
                        url,
                        blocking: false,
                    })
                    .await?;
                return Ok(format!("tts:{}", canonical));
            }
            Err(e) => {
                tracing::warn!(
                    provider = %canonical,
                    error = %e,
                    "Synthesis failed, falling back to device voice"
                );
            }
        }
    }

    speaker.play(PlayRequest::Text(text.to_string())).await?;
    Ok("xiaomi".to_string())
}
