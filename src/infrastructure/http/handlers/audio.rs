//! Audio Handler - 缓存音频流式下载
//!
//! 音箱通过这里拉取合成好的音频文件。文件可能刚被淘汰清理，
//! 此时返回 NotFound 即可。

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::Response,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 按扩展名推断 Content-Type
fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit('.').next() {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        Some("pcm") => "audio/L16",
        _ => "application/octet-stream",
    }
}

pub async fn get_audio(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let (file, len) = state.cache.open(&filename).await?;

    let stream = ReaderStream::new(file);
    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type_for(&filename))
        .header(header::CONTENT_LENGTH, len)
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_inference() {
        assert_eq!(content_type_for("tts-1-abc.mp3"), "audio/mpeg");
        assert_eq!(content_type_for("tts-1-abc.wav"), "audio/wav");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
