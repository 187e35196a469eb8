//! Provider Registry - TTS 供应商注册表
//!
//! 按名称管理合成能力，支持别名（如 doubao -> volcano）。
//! 名称一律大小写归一化；别名在查找时惰性解析，最多一跳，
//! 因此别名可以先于目标注册。

use dashmap::DashMap;
use std::sync::Arc;

use super::ports::{ProviderError, TtsProvider};

/// TTS 供应商注册表
#[derive(Default)]
pub struct ProviderRegistry {
    providers: DashMap<String, Arc<dyn TtsProvider>>,
    aliases: DashMap<String, String>,
}

/// 名称归一化：去首尾空白并转小写
fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册供应商
    pub fn register(
        &self,
        name: &str,
        provider: Arc<dyn TtsProvider>,
    ) -> Result<(), ProviderError> {
        let name = normalize(name);
        if name.is_empty() {
            return Err(ProviderError::InvalidArgument(
                "provider name cannot be empty".to_string(),
            ));
        }

        tracing::info!(provider = %name, can_synthesize = provider.can_synthesize(), "Provider registered");
        self.providers.insert(name, provider);
        Ok(())
    }

    /// 注册别名
    pub fn register_alias(&self, alias: &str, target: &str) -> Result<(), ProviderError> {
        let alias = normalize(alias);
        let target = normalize(target);
        if alias.is_empty() || target.is_empty() {
            return Err(ProviderError::InvalidArgument(
                "alias and target cannot be empty".to_string(),
            ));
        }

        tracing::info!(alias = %alias, target = %target, "Provider alias registered");
        self.aliases.insert(alias, target);
        Ok(())
    }

    /// 解析为规范名：归一化后最多跟随一跳别名
    ///
    /// 未注册的名称原样（归一化后）返回，由后续查找报错。
    pub fn resolve(&self, requested: &str) -> String {
        let name = normalize(requested);
        match self.aliases.get(&name) {
            Some(target) => target.clone(),
            None => name,
        }
    }

    /// 解析后的供应商是否具备合成能力
    pub fn can_synthesize(&self, name: &str) -> bool {
        let canonical = self.resolve(name);
        self.providers
            .get(&canonical)
            .map(|p| p.can_synthesize())
            .unwrap_or(false)
    }

    /// 合成文本
    ///
    /// 解析后无对应条目返回 `UnsupportedProvider`；条目无合成能力返回
    /// `SynthesisNotSupported`，两者都不会发起网络调用。
    pub async fn synthesize(&self, name: &str, text: &str) -> Result<String, ProviderError> {
        let canonical = self.resolve(name);
        let provider = self
            .providers
            .get(&canonical)
            .map(|p| p.clone())
            .ok_or_else(|| ProviderError::UnsupportedProvider(canonical.clone()))?;

        if !provider.can_synthesize() {
            return Err(ProviderError::SynthesisNotSupported(canonical));
        }

        provider.synthesize(text).await
    }
}
