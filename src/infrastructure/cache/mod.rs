//! 音频缓存实现

mod fs_cache;

pub use fs_cache::{CacheError, FsAudioCache, FsCacheConfig};
