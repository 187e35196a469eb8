//! Xiaomi Provider - 设备默认语音占位
//!
//! 不具备合成能力：选中它时播报直接走音箱自带语音。

use crate::application::ports::TtsProvider;

/// 小米音箱默认语音占位 Provider
pub struct XiaomiProvider;

impl TtsProvider for XiaomiProvider {
    fn name(&self) -> &str {
        "xiaomi"
    }
}
