//! 音箱设备适配器

mod fake_speaker;
mod http_speaker_client;

pub use fake_speaker::{FakeSpeaker, SpeakerCall};
pub use http_speaker_client::{HttpSpeakerClient, HttpSpeakerClientConfig};
