//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 音箱设备配置
    #[serde(default)]
    pub device: DeviceConfig,

    /// TTS 配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 音频缓存配置
    #[serde(default)]
    pub cache: CacheConfig,

    /// 故事模式配置
    #[serde(default)]
    pub story: StoryConfig,

    /// 唤醒/指令配置
    #[serde(default)]
    pub wakeup: WakeupConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 公开访问的 Base URL（音箱拉取合成音频时使用）
    /// 如果未设置，则使用 http://{host}:{port}
    #[serde(default)]
    pub base_url: Option<String>,

    /// API 鉴权 token，未设置时不做鉴权
    #[serde(default)]
    pub auth_token: Option<String>,

    /// 请求体大小上限（字节）
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4399
}

fn default_max_body_bytes() -> usize {
    1024 * 1024 // 1 MB，纯文本请求足够
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
            auth_token: None,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 获取公开的 Base URL
    pub fn public_base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| {
            let host = if self.host == "0.0.0.0" {
                "localhost"
            } else {
                &self.host
            };
            format!("http://{}:{}", host, self.port)
        })
    }
}

/// 音箱设备配置
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    /// 设备桥接服务的 Base URL
    #[serde(default = "default_device_url")]
    pub base_url: String,

    /// 设备请求超时时间（秒）
    #[serde(default = "default_device_timeout")]
    pub timeout_secs: u64,
}

fn default_device_url() -> String {
    "http://localhost:9528".to_string()
}

fn default_device_timeout() -> u64 {
    30
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            base_url: default_device_url(),
            timeout_secs: default_device_timeout(),
        }
    }
}

/// TTS 配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    /// 默认 TTS 供应商（支持别名，如 doubao -> volcano）
    #[serde(default = "default_provider")]
    pub provider: String,

    /// 火山引擎配置
    #[serde(default)]
    pub volcano: VolcanoConfig,
}

fn default_provider() -> String {
    "xiaomi".to_string()
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            volcano: VolcanoConfig::default(),
        }
    }
}

/// 火山引擎 TTS 鉴权模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolcanoAuthMode {
    /// X-Api-Key 头鉴权
    ApiKey,
    /// Bearer;token 头鉴权
    Token,
}

/// 火山引擎 TTS 配置
#[derive(Debug, Clone, Deserialize)]
pub struct VolcanoConfig {
    /// TTS API 地址
    #[serde(default = "default_volcano_api_url")]
    pub api_url: String,

    /// 应用 ID
    #[serde(default)]
    pub app_id: String,

    /// 访问令牌（api_key 模式下为 API Key）
    #[serde(default)]
    pub access_token: String,

    /// 鉴权模式
    #[serde(default = "default_volcano_auth_mode")]
    pub auth_mode: VolcanoAuthMode,

    /// 业务集群
    #[serde(default = "default_volcano_cluster")]
    pub cluster: String,

    /// 音色
    #[serde(default = "default_volcano_voice")]
    pub voice_type: String,

    /// 音频编码格式（mp3 / wav / pcm）
    #[serde(default = "default_volcano_encoding")]
    pub encoding: String,

    /// 采样率
    #[serde(default = "default_volcano_rate")]
    pub rate: u32,

    /// 语速
    #[serde(default = "default_ratio")]
    pub speed_ratio: f32,

    /// 音量
    #[serde(default = "default_ratio")]
    pub volume_ratio: f32,

    /// 音调
    #[serde(default = "default_ratio")]
    pub pitch_ratio: f32,

    /// 请求超时时间（秒）
    #[serde(default = "default_volcano_timeout")]
    pub timeout_secs: u64,
}

fn default_volcano_api_url() -> String {
    "https://openspeech.bytedance.com/api/v1/tts".to_string()
}

fn default_volcano_auth_mode() -> VolcanoAuthMode {
    VolcanoAuthMode::Token
}

fn default_volcano_cluster() -> String {
    "volcano_tts".to_string()
}

fn default_volcano_voice() -> String {
    "BV001_streaming".to_string()
}

fn default_volcano_encoding() -> String {
    "mp3".to_string()
}

fn default_volcano_rate() -> u32 {
    24000
}

fn default_ratio() -> f32 {
    1.0
}

fn default_volcano_timeout() -> u64 {
    30
}

impl Default for VolcanoConfig {
    fn default() -> Self {
        Self {
            api_url: default_volcano_api_url(),
            app_id: String::new(),
            access_token: String::new(),
            auth_mode: default_volcano_auth_mode(),
            cluster: default_volcano_cluster(),
            voice_type: default_volcano_voice(),
            encoding: default_volcano_encoding(),
            rate: default_volcano_rate(),
            speed_ratio: default_ratio(),
            volume_ratio: default_ratio(),
            pitch_ratio: default_ratio(),
            timeout_secs: default_volcano_timeout(),
        }
    }
}

/// 音频缓存配置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// 缓存目录
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,

    /// 缓存文件最大保留时间（秒），超龄文件在下次合成前被清理
    #[serde(default = "default_max_cache_age")]
    pub max_age_secs: u64,

    /// 缓存文件名前缀
    #[serde(default = "default_cache_prefix")]
    pub file_prefix: String,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("data/audio")
}

fn default_max_cache_age() -> u64 {
    3600 // 1 小时
}

fn default_cache_prefix() -> String {
    "tts".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            max_age_secs: default_max_cache_age(),
            file_prefix: default_cache_prefix(),
        }
    }
}

/// 故事模式配置
#[derive(Debug, Clone, Deserialize)]
pub struct StoryConfig {
    /// 第一段最大字符数（越小首句出声越快）
    #[serde(default = "default_first_chunk")]
    pub first_chunk_max_chars: usize,

    /// 后续段最大字符数
    #[serde(default = "default_normal_chunk")]
    pub normal_chunk_max_chars: usize,

    /// 播放状态轮询间隔（毫秒）
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// 等待上一段播放完成的超时时间（秒）
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_secs: u64,
}

fn default_first_chunk() -> usize {
    80
}

fn default_normal_chunk() -> usize {
    200
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_wait_timeout() -> u64 {
    300
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            first_chunk_max_chars: default_first_chunk(),
            normal_chunk_max_chars: default_normal_chunk(),
            poll_interval_ms: default_poll_interval(),
            wait_timeout_secs: default_wait_timeout(),
        }
    }
}

/// 唤醒/指令配置
#[derive(Debug, Clone, Deserialize)]
pub struct WakeupConfig {
    /// 唤醒关键词（原文包含即触发 AI 问答）
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// 进入 AI 对话模式的完整指令
    #[serde(default = "default_enter_ai_mode")]
    pub enter_ai_mode: Vec<String>,

    /// 退出 AI 对话模式的完整指令
    #[serde(default = "default_exit_ai_mode")]
    pub exit_ai_mode: Vec<String>,

    /// 停止播放关键词
    #[serde(default = "default_stop_keywords")]
    pub stop_keywords: Vec<String>,

    /// 进入对话模式的提示语
    #[serde(default = "default_enter_reply")]
    pub enter_reply: String,

    /// 退出对话模式的提示语
    #[serde(default = "default_exit_reply")]
    pub exit_reply: String,

    /// 故事模式触发正则
    #[serde(default = "default_story_trigger")]
    pub story_trigger: String,

    /// 故事模式附加给 AI 的系统指令
    #[serde(default = "default_story_instruction")]
    pub story_instruction: String,
}

fn default_keywords() -> Vec<String> {
    vec!["请问".to_string(), "请回答".to_string()]
}

fn default_enter_ai_mode() -> Vec<String> {
    vec!["进入AI模式".to_string(), "打开AI模式".to_string()]
}

fn default_exit_ai_mode() -> Vec<String> {
    vec!["退出AI模式".to_string(), "退出模式".to_string()]
}

fn default_stop_keywords() -> Vec<String> {
    vec!["停止".to_string(), "停止播放".to_string(), "闭嘴".to_string()]
}

fn default_enter_reply() -> String {
    "已进入AI对话模式".to_string()
}

fn default_exit_reply() -> String {
    "已退出AI对话模式".to_string()
}

fn default_story_trigger() -> String {
    "讲.{0,6}故事".to_string()
}

fn default_story_instruction() -> String {
    "请直接讲一个完整的故事，不要提问，不要寒暄。".to_string()
}

impl Default for WakeupConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            enter_ai_mode: default_enter_ai_mode(),
            exit_ai_mode: default_exit_ai_mode(),
            stop_keywords: default_stop_keywords(),
            enter_reply: default_enter_reply(),
            exit_reply: default_exit_reply(),
            story_trigger: default_story_trigger(),
            story_instruction: default_story_instruction(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
