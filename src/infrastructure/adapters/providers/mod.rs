//! TTS Provider 适配器

mod volcano;
mod xiaomi;

pub use volcano::VolcanoProvider;
pub use xiaomi::XiaomiProvider;
