//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `MIQIAO_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `MIQIAO_SERVER__PORT=8080`
/// - `MIQIAO_DEVICE__BASE_URL=http://speaker:9528`
/// - `MIQIAO_TTS__PROVIDER=doubao`
/// - `MIQIAO_TTS__VOLCANO__ACCESS_TOKEN=xxx`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 4399)?
        .set_default("server.max_body_bytes", 1024 * 1024)?
        .set_default("device.base_url", "http://localhost:9528")?
        .set_default("device.timeout_secs", 30)?
        .set_default("tts.provider", "xiaomi")?
        .set_default("cache.dir", "data/audio")?
        .set_default("cache.max_age_secs", 3600)?
        .set_default("cache.file_prefix", "tts")?
        .set_default("story.first_chunk_max_chars", 80)?
        .set_default("story.normal_chunk_max_chars", 200)?
        .set_default("story.poll_interval_ms", 1000)?
        .set_default("story.wait_timeout_secs", 300)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        // 搜索默认配置文件
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 前缀: MIQIAO_
    // 层级分隔符: __ (双下划线)
    builder = builder.add_source(
        Environment::with_prefix("MIQIAO")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 构建配置
    let config = builder.build()?;

    // 5. 反序列化为 AppConfig
    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

    // 6. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    // 验证端口范围
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    // 验证设备地址
    if config.device.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Device base URL cannot be empty".to_string(),
        ));
    }

    // 验证故事分段上限
    if config.story.first_chunk_max_chars == 0 || config.story.normal_chunk_max_chars == 0 {
        return Err(ConfigError::ValidationError(
            "Story chunk limits cannot be 0".to_string(),
        ));
    }
    if config.story.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Story poll interval cannot be 0".to_string(),
        ));
    }

    // 验证故事触发正则
    if let Err(e) = regex::Regex::new(&config.wakeup.story_trigger) {
        return Err(ConfigError::ValidationError(format!(
            "Invalid story trigger pattern: {}",
            e
        )));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Public Base URL: {}", config.server.public_base_url());
    tracing::info!("Auth Enabled: {}", config.server.auth_token.is_some());
    tracing::info!("Device: {}", config.device.base_url);
    tracing::info!("TTS Provider: {}", config.tts.provider);
    tracing::info!("Cache Directory: {:?}", config.cache.dir);
    tracing::info!("Cache Max Age: {}s", config.cache.max_age_secs);
    tracing::info!(
        "Story Chunks: first {} / normal {} chars",
        config.story.first_chunk_max_chars,
        config.story.normal_chunk_max_chars
    );
    tracing::info!("Wake Keywords: {:?}", config.wakeup.keywords);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
