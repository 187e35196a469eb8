//! 文件系统音频缓存
//!
//! 合成音频落盘为 `<prefix>-<时间戳>-<请求id>.<ext>`，无索引文件，
//! 目录列表 + mtime 即真相。每次写入前顺手清理超龄文件；清理失败
//! 只记日志。文件名含唯一请求 id，并发写入不会冲突；读取可能与
//! 清理竞争拿到 NotFound，属于可接受的有界不一致。

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// 缓存错误
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache entry not found: {0}")]
    NotFound(String),

    #[error("Invalid cache filename: {0}")]
    InvalidFilename(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 缓存配置
#[derive(Debug, Clone)]
pub struct FsCacheConfig {
    /// 缓存目录
    pub dir: PathBuf,
    /// 最大保留时间
    pub max_age: Duration,
    /// 文件名前缀
    pub file_prefix: String,
}

impl Default for FsCacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data/audio"),
            max_age: Duration::from_secs(3600),
            file_prefix: "tts".to_string(),
        }
    }
}

/// 文件系统音频缓存
pub struct FsAudioCache {
    config: FsCacheConfig,
}

impl FsAudioCache {
    pub fn new(config: FsCacheConfig) -> Self {
        Self { config }
    }

    /// 缓存目录
    pub fn dir(&self) -> &Path {
        &self.config.dir
    }

    /// 写入一段合成音频，返回生成的文件名
    ///
    /// 写入前先做一次超龄清理（失败不致命）。
    pub async fn store(&self, audio: &[u8], ext: &str) -> Result<String, CacheError> {
        if let Err(e) = self.evict_stale().await {
            tracing::warn!(error = %e, "Cache eviction failed, continuing");
        }

        tokio::fs::create_dir_all(&self.config.dir)
            .await
            .map_err(|e| CacheError::IoError(e.to_string()))?;

        let filename = format!(
            "{}-{}-{}.{}",
            self.config.file_prefix,
            chrono::Utc::now().timestamp_millis(),
            uuid::Uuid::new_v4().simple(),
            ext,
        );
        let path = self.config.dir.join(&filename);

        tokio::fs::write(&path, audio)
            .await
            .map_err(|e| CacheError::IoError(e.to_string()))?;

        tracing::debug!(filename = %filename, bytes = audio.len(), "Audio cached");
        Ok(filename)
    }

    /// 打开一个缓存文件用于流式读取，返回文件句柄和大小
    ///
    /// 文件名不允许路径分隔符，防止目录穿越。
    pub async fn open(&self, filename: &str) -> Result<(tokio::fs::File, u64), CacheError> {
        if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
            return Err(CacheError::InvalidFilename(filename.to_string()));
        }

        let path = self.config.dir.join(filename);
        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|_| CacheError::NotFound(filename.to_string()))?;
        let len = file
            .metadata()
            .await
            .map_err(|e| CacheError::IoError(e.to_string()))?
            .len();

        Ok((file, len))
    }

    /// 清理超龄文件，返回删除数量
    pub async fn evict_stale(&self) -> Result<usize, CacheError> {
        let mut entries = match tokio::fs::read_dir(&self.config.dir).await {
            Ok(entries) => entries,
            // 目录还不存在 = 没有可清理的
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(CacheError::IoError(e.to_string())),
        };

        let mut evicted = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CacheError::IoError(e.to_string()))?
        {
            let metadata = match entry.metadata().await {
                Ok(m) if m.is_file() => m,
                _ => continue,
            };

            let age = metadata
                .modified()
                .ok()
                .and_then(|t| t.elapsed().ok())
                .unwrap_or(Duration::ZERO);

            if age > self.config.max_age {
                match tokio::fs::remove_file(entry.path()).await {
                    Ok(()) => evicted += 1,
                    Err(e) => {
                        tracing::warn!(path = ?entry.path(), error = %e, "Failed to evict cache file")
                    }
                }
            }
        }

        if evicted > 0 {
            tracing::info!(evicted = evicted, "Stale cache files evicted");
        }
        Ok(evicted)
    }
}
