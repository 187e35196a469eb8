//! HTTP Handlers

mod audio;
mod speak;
mod status;
mod utterance;

pub use audio::get_audio;
pub use speak::{chat, play, speak};
pub use status::{ping, status};
pub use utterance::utterance;
