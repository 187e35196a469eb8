//! Miqiao - 小爱音箱 AI 语音中介服务
//!
//! 启动流程：加载配置 -> 初始化日志 -> 组装注册表/队列/服务 -> HTTP 服务

use std::sync::Arc;
use std::time::Duration;

use miqiao::application::{
    ProviderRegistry, SpeechService, StoryPacer, StoryPacerConfig, TaskQueue, VoiceService,
    VoiceServiceConfig,
};
use miqiao::config::{load_config, print_config};
use miqiao::domain::chunker::ChunkConfig;
use miqiao::domain::interpreter::InterpreterRules;
use miqiao::infrastructure::adapters::providers::{VolcanoProvider, XiaomiProvider};
use miqiao::infrastructure::adapters::speaker::{HttpSpeakerClient, HttpSpeakerClientConfig};
use miqiao::infrastructure::cache::{FsAudioCache, FsCacheConfig};
use miqiao::infrastructure::http::{AppState, HttpServer, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},miqiao={},tower_http=debug",
        config.log.level, config.log.level
    );
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));
    if config.log.json {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    tracing::info!("Miqiao - 小爱音箱 AI 语音中介服务");
    print_config(&config);

    // 确保缓存目录存在
    tokio::fs::create_dir_all(&config.cache.dir).await?;

    // 音频缓存
    let cache = Arc::new(FsAudioCache::new(FsCacheConfig {
        dir: config.cache.dir.clone(),
        max_age: Duration::from_secs(config.cache.max_age_secs),
        file_prefix: config.cache.file_prefix.clone(),
    }));

    // 供应商注册表：内置 xiaomi / volcano，别名 doubao -> volcano
    let registry = Arc::new(ProviderRegistry::new());
    registry
        .register("xiaomi", Arc::new(XiaomiProvider))
        .map_err(|e| anyhow::anyhow!("Failed to register provider: {}", e))?;
    if config.tts.volcano.access_token.is_empty() {
        tracing::warn!("Volcano access token not configured, volcano synthesis unavailable");
    } else {
        let volcano = VolcanoProvider::new(
            config.tts.volcano.clone(),
            cache.clone(),
            config.server.public_base_url(),
        )
        .map_err(|e| anyhow::anyhow!("Failed to create volcano provider: {}", e))?;
        registry
            .register("volcano", Arc::new(volcano))
            .map_err(|e| anyhow::anyhow!("Failed to register provider: {}", e))?;
    }
    registry
        .register_alias("doubao", "volcano")
        .map_err(|e| anyhow::anyhow!("Failed to register alias: {}", e))?;

    // 音箱设备客户端
    let speaker = Arc::new(
        HttpSpeakerClient::new(
            HttpSpeakerClientConfig::new(config.device.base_url.clone())
                .with_timeout(config.device.timeout_secs),
        )
        .map_err(|e| anyhow::anyhow!("Failed to create speaker client: {}", e))?,
    );

    // 全局串行任务队列
    let queue = Arc::new(TaskQueue::new());

    // 故事分段播放器
    let pacer = Arc::new(StoryPacer::new(
        StoryPacerConfig {
            chunk: ChunkConfig {
                first_chunk_max_chars: config.story.first_chunk_max_chars,
                normal_chunk_max_chars: config.story.normal_chunk_max_chars,
            },
            poll_interval: Duration::from_millis(config.story.poll_interval_ms),
            wait_timeout: Duration::from_secs(config.story.wait_timeout_secs),
        },
        speaker.clone(),
        registry.clone(),
    ));

    // speak / chat / play 编排
    let speech = Arc::new(SpeechService::new(
        queue.clone(),
        speaker.clone(),
        registry.clone(),
        pacer,
        config.tts.provider.clone(),
        config.wakeup.story_instruction.clone(),
    ));

    // 语音指令处理
    let story_trigger = regex::Regex::new(&config.wakeup.story_trigger)
        .map_err(|e| anyhow::anyhow!("Invalid story trigger pattern: {}", e))?;
    let voice = Arc::new(VoiceService::new(
        queue.clone(),
        speaker,
        speech.clone(),
        VoiceServiceConfig {
            rules: InterpreterRules {
                wake_keywords: config.wakeup.keywords.clone(),
                enter_phrases: config.wakeup.enter_ai_mode.clone(),
                exit_phrases: config.wakeup.exit_ai_mode.clone(),
                stop_keywords: config.wakeup.stop_keywords.clone(),
            },
            enter_reply: config.wakeup.enter_reply.clone(),
            exit_reply: config.wakeup.exit_reply.clone(),
            story_trigger,
        },
    ));

    // HTTP 服务器
    let server_config = ServerConfig::new(
        &config.server.host,
        config.server.port,
        config.server.max_body_bytes,
    );
    let state = AppState::new(
        queue,
        registry,
        speech,
        voice,
        cache,
        config.server.auth_token.clone(),
    );

    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for ctrl-c");
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
