//! Voice Service - 语音指令处理与会话状态
//!
//! 持有唯一一份会话状态：AI 对话模式开关。该开关只在显式的
//! 进入/退出指令里写入，分类时只读。
//!
//! 所有副作用（停止播放、模式提示语、AI 问答）都提交到全局任务队列，
//! 与 HTTP 侧并发到达的任务保持同一全局顺序。提交后立即返回分类结果，
//! 不等待任务完成——设备需要马上知道是否抑制默认回复。

use regex::Regex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::interpreter::{classify, InterpreterRules, VoiceCommand};

use super::error::AppError;
use super::ports::SpeakerPort;
use super::speech::{ChatCommand, SpeakCommand, SpeechService};
use super::task_queue::TaskQueue;

/// Voice Service 配置
#[derive(Debug, Clone)]
pub struct VoiceServiceConfig {
    /// 分类规则
    pub rules: InterpreterRules,
    /// 进入对话模式的提示语
    pub enter_reply: String,
    /// 退出对话模式的提示语
    pub exit_reply: String,
    /// 故事模式触发正则
    pub story_trigger: Regex,
}

/// 一条已被处理的语音指令（返回给设备以抑制其默认回复）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandledUtterance {
    /// 处理动作: stop / enter-ai-mode / exit-ai-mode / ai-query / noop
    pub action: &'static str,
}

impl HandledUtterance {
    fn new(action: &'static str) -> Self {
        Self { action }
    }
}

/// Voice Service
pub struct VoiceService {
    queue: Arc<TaskQueue>,
    speaker: Arc<dyn SpeakerPort>,
    speech: Arc<SpeechService>,
    config: VoiceServiceConfig,
    /// AI 对话模式开关，仅本服务写入
    ai_mode: AtomicBool,
}

impl VoiceService {
    pub fn new(
        queue: Arc<TaskQueue>,
        speaker: Arc<dyn SpeakerPort>,
        speech: Arc<SpeechService>,
        config: VoiceServiceConfig,
    ) -> Self {
        Self {
            queue,
            speaker,
            speech,
            config,
            ai_mode: AtomicBool::new(false),
        }
    }

    /// 当前是否处于 AI 对话模式
    pub fn ai_mode_active(&self) -> bool {
        self.ai_mode.load(Ordering::Relaxed)
    }

    /// 处理一条识别出的语音文本
    ///
    /// 返回 `Some(HandledUtterance)` 表示指令已接管，设备应抑制默认回复；
    /// 返回 `None` 表示非指令，交回设备默认处理。
    pub fn handle_utterance(&self, text: &str) -> Result<Option<HandledUtterance>, AppError> {
        let active = self.ai_mode_active();
        let command = classify(text, active, &self.config.rules);
        tracing::debug!(text = %text, ai_mode = active, command = ?command, "Utterance classified");

        match command {
            VoiceCommand::Stop => {
                if !self.speaker.is_ready() {
                    return Err(AppError::EngineNotReady);
                }
                let speaker = self.speaker.clone();
                let completion = self.queue.enqueue("stop", async move {
                    speaker.abort_playback().await?;
                    Ok(())
                });
                drive("stop", completion);
                Ok(Some(HandledUtterance::new("stop")))
            }

            VoiceCommand::EnterAiMode => {
                self.ai_mode.store(true, Ordering::Relaxed);
                tracing::info!("AI conversation mode entered");
                let completion = self.speech.submit_speak(
                    "enter-message",
                    SpeakCommand {
                        text: self.config.enter_reply.clone(),
                        interrupt: true,
                        story_mode: false,
                    },
                )?;
                drive("enter-message", completion);
                Ok(Some(HandledUtterance::new("enter-ai-mode")))
            }

            VoiceCommand::ExitAiMode => {
                self.ai_mode.store(false, Ordering::Relaxed);
                tracing::info!("AI conversation mode exited");
                let completion = self.speech.submit_speak(
                    "exit-message",
                    SpeakCommand {
                        text: self.config.exit_reply.clone(),
                        interrupt: true,
                        story_mode: false,
                    },
                )?;
                drive("exit-message", completion);
                Ok(Some(HandledUtterance::new("exit-ai-mode")))
            }

            VoiceCommand::Query { intent } => {
                // 空意图：已接管但无事可做，不调 AI
                if intent.is_empty() {
                    return Ok(Some(HandledUtterance::new("noop")));
                }

                let story = self.config.story_trigger.is_match(&intent);
                let task_type = if story { "story-query" } else { "ai-query" };
                let completion = self.speech.submit_chat(
                    task_type,
                    ChatCommand {
                        text: intent,
                        interrupt: true,
                        story_mode: story,
                    },
                )?;
                drive(task_type, completion);
                Ok(Some(HandledUtterance::new("ai-query")))
            }

            VoiceCommand::Ignore => Ok(None),
        }
    }
}

/// 后台驱动任务完成 future，失败只记日志
fn drive<T: Send + 'static>(
    task_type: &'static str,
    completion: impl std::future::Future<Output = Result<T, AppError>> + Send + 'static,
) {
    tokio::spawn(async move {
        if let Err(e) = completion.await {
            tracing::warn!(task_type = %task_type, error = %e, "Voice task failed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::registry::ProviderRegistry;
    use crate::application::story::{StoryPacer, StoryPacerConfig};
    use crate::infrastructure::adapters::providers::XiaomiProvider;
    use crate::infrastructure::adapters::speaker::{FakeSpeaker, SpeakerCall};
    use std::time::Duration;

    fn build(speaker: Arc<FakeSpeaker>) -> (Arc<TaskQueue>, VoiceService) {
        let queue = Arc::new(TaskQueue::new());
        let registry = Arc::new(ProviderRegistry::new());
        registry
            .register("xiaomi", Arc::new(XiaomiProvider))
            .unwrap();
        let pacer = Arc::new(StoryPacer::new(
            StoryPacerConfig::default(),
            speaker.clone(),
            registry.clone(),
        ));
        let speech = Arc::new(SpeechService::new(
            queue.clone(),
            speaker.clone(),
            registry,
            pacer,
            "xiaomi",
            "请直接讲一个完整的故事。",
        ));

        let config = VoiceServiceConfig {
            rules: InterpreterRules {
                wake_keywords: vec!["请".to_string()],
                enter_phrases: vec!["进入AI模式".to_string()],
                exit_phrases: vec!["退出模式".to_string()],
                stop_keywords: vec!["停止".to_string()],
            },
            enter_reply: "已进入AI对话模式".to_string(),
            exit_reply: "已退出AI对话模式".to_string(),
            story_trigger: Regex::new("讲.{0,6}故事").unwrap(),
        };

        let service = VoiceService::new(queue.clone(), speaker, speech, config);
        (queue, service)
    }

    /// 等待队列排空（后台任务全部完成）
    async fn drain(queue: &TaskQueue) {
        for _ in 0..200 {
            if queue.status().depth == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("queue did not drain");
    }

    #[tokio::test]
    async fn test_wake_keyword_dispatches_ai_query() {
        let speaker = Arc::new(FakeSpeaker::new());
        speaker.set_ai_reply("晴");
        let (queue, service) = build(speaker.clone());

        let handled = service.handle_utterance("请告诉我天气").unwrap();
        assert_eq!(handled, Some(HandledUtterance::new("ai-query")));

        drain(&queue).await;
        let calls = speaker.calls();
        assert!(calls
            .iter()
            .any(|c| matches!(c, SpeakerCall::AskAi(q) if q == "告诉我天气")));
    }

    #[tokio::test]
    async fn test_exit_mode_queues_single_exit_message() {
        let speaker = Arc::new(FakeSpeaker::new());
        let (queue, service) = build(speaker.clone());

        service.handle_utterance("进入AI模式").unwrap();
        drain(&queue).await;
        assert!(service.ai_mode_active());

        let handled = service.handle_utterance("退出模式").unwrap();
        assert_eq!(handled, Some(HandledUtterance::new("exit-ai-mode")));
        assert!(!service.ai_mode_active());

        drain(&queue).await;
        // 恰好一个 exit-message 任务，且没有 AI 调用
        assert_eq!(
            queue.status().last_task_type.as_deref(),
            Some("exit-message")
        );
        let calls = speaker.calls();
        assert!(!calls.iter().any(|c| matches!(c, SpeakerCall::AskAi(_))));
        assert!(calls
            .iter()
            .any(|c| matches!(c, SpeakerCall::PlayText(t) if t == "已退出AI对话模式")));
    }

    #[tokio::test]
    async fn test_ai_mode_routes_plain_text_to_query() {
        let speaker = Arc::new(FakeSpeaker::new());
        speaker.set_ai_reply("回答");
        let (queue, service) = build(speaker.clone());

        service.handle_utterance("进入AI模式").unwrap();
        let handled = service.handle_utterance("随便聊点什么").unwrap();
        assert_eq!(handled, Some(HandledUtterance::new("ai-query")));

        drain(&queue).await;
        assert!(speaker
            .calls()
            .iter()
            .any(|c| matches!(c, SpeakerCall::AskAi(q) if q == "随便聊点什么")));
    }

    #[tokio::test]
    async fn test_stop_aborts_playback() {
        let speaker = Arc::new(FakeSpeaker::new());
        let (queue, service) = build(speaker.clone());

        let handled = service.handle_utterance("停止播放").unwrap();
        assert_eq!(handled, Some(HandledUtterance::new("stop")));

        drain(&queue).await;
        assert!(speaker
            .calls()
            .iter()
            .any(|c| matches!(c, SpeakerCall::Abort)));
    }

    #[tokio::test]
    async fn test_plain_text_passes_through() {
        let speaker = Arc::new(FakeSpeaker::new());
        let (_queue, service) = build(speaker.clone());

        let handled = service.handle_utterance("播放音乐").unwrap();
        assert_eq!(handled, None);
        assert!(speaker.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_intent_is_handled_noop() {
        let speaker = Arc::new(FakeSpeaker::new());
        let (_queue, service) = build(speaker.clone());

        let handled = service.handle_utterance("请").unwrap();
        assert_eq!(handled, Some(HandledUtterance::new("noop")));
        assert!(speaker.calls().is_empty());
    }

    #[tokio::test]
    async fn test_story_trigger_routes_to_story_query() {
        let speaker = Arc::new(FakeSpeaker::new());
        speaker.set_ai_reply("从前有座山。");
        let (queue, service) = build(speaker.clone());

        service.handle_utterance("请给我讲个睡前故事").unwrap();
        drain(&queue).await;

        assert_eq!(
            queue.status().last_task_type.as_deref(),
            Some("story-query")
        );
    }
}
