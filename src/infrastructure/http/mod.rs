//! HTTP Infrastructure - RESTful API

mod dto;
mod error;
mod handlers;
mod middleware;
mod routes;
mod server;
mod state;

pub use error::{ApiError, ErrorResponse};
pub use server::{HttpServer, ServerConfig};
pub use state::AppState;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{
        ProviderRegistry, SpeechService, StoryPacer, StoryPacerConfig, TaskQueue, VoiceService,
        VoiceServiceConfig,
    };
    use crate::domain::interpreter::InterpreterRules;
    use crate::infrastructure::adapters::providers::XiaomiProvider;
    use crate::infrastructure::adapters::speaker::FakeSpeaker;
    use crate::infrastructure::cache::{FsAudioCache, FsCacheConfig};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use regex::Regex;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn test_router(auth_token: Option<String>, cache_dir: &std::path::Path) -> axum::Router {
        let queue = Arc::new(TaskQueue::new());
        let speaker = Arc::new(FakeSpeaker::new());
        speaker.set_ai_reply("好的");
        let registry = Arc::new(ProviderRegistry::new());
        registry
            .register("xiaomi", Arc::new(XiaomiProvider))
            .unwrap();
        let pacer = Arc::new(StoryPacer::new(
            StoryPacerConfig::default(),
            speaker.clone(),
            registry.clone(),
        ));
        let speech = Arc::new(SpeechService::new(
            queue.clone(),
            speaker.clone(),
            registry.clone(),
            pacer,
            "xiaomi",
            String::new(),
        ));
        let voice = Arc::new(VoiceService::new(
            queue.clone(),
            speaker,
            speech.clone(),
            VoiceServiceConfig {
                rules: InterpreterRules {
                    wake_keywords: vec!["请".to_string()],
                    enter_phrases: vec!["进入AI模式".to_string()],
                    exit_phrases: vec!["退出模式".to_string()],
                    stop_keywords: vec!["停止".to_string()],
                },
                enter_reply: "已进入".to_string(),
                exit_reply: "已退出".to_string(),
                story_trigger: Regex::new("讲.{0,6}故事").unwrap(),
            },
        ));
        let cache = Arc::new(FsAudioCache::new(FsCacheConfig {
            dir: cache_dir.to_path_buf(),
            max_age: Duration::from_secs(3600),
            file_prefix: "tts".to_string(),
        }));

        let state = AppState::new(queue, registry, speech, voice, cache, auth_token);
        HttpServer::new(ServerConfig::default(), state).build_router()
    }

    fn json_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ping() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_router(None, tmp.path());

        let response = app
            .oneshot(Request::builder().uri("/api/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_speak_via_device_voice() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_router(None, tmp.path());

        let response = app
            .oneshot(json_post("/api/speak", r#"{"text": "你好"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["errno"], 0);
        assert_eq!(json["data"]["mode"], "xiaomi");
        assert_eq!(json["data"]["text"], "你好");
    }

    #[tokio::test]
    async fn test_speak_rejects_empty_text() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_router(None, tmp.path());

        let response = app
            .oneshot(json_post("/api/speak", r#"{"text": "  "}"#))
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_ne!(json["errno"], 0);
    }

    #[tokio::test]
    async fn test_chat_returns_reply() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_router(None, tmp.path());

        let response = app
            .oneshot(json_post("/api/chat", r#"{"text": "今天天气"}"#))
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["errno"], 0);
        assert_eq!(json["data"]["reply_text"], "好的");
        assert_eq!(json["data"]["mode"], "xiaomi");
    }

    #[tokio::test]
    async fn test_play_url() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_router(None, tmp.path());

        let response = app
            .oneshot(json_post(
                "/api/play",
                r#"{"url": "http://example.com/a.mp3", "blocking": true}"#,
            ))
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["errno"], 0);
        assert_eq!(json["data"]["mode"], "url");
    }

    #[tokio::test]
    async fn test_utterance_handled_and_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_router(None, tmp.path());

        // 唤醒词触发，接管
        let response = app
            .clone()
            .oneshot(json_post("/api/utterance", r#"{"text": "请告诉我天气"}"#))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["data"]["handled"], true);
        assert_eq!(json["data"]["action"], "ai-query");

        // 普通文本，交回设备
        let response = app
            .oneshot(json_post("/api/utterance", r#"{"text": "播放音乐"}"#))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert!(json["data"].is_null());
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_router(None, tmp.path());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["errno"], 0);
        assert_eq!(json["data"]["ai_conversation_mode"], false);
        assert_eq!(json["data"]["provider"], "xiaomi");
        assert_eq!(json["data"]["queue"]["depth"], 0);
    }

    #[tokio::test]
    async fn test_auth_rejects_missing_token() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_router(Some("secret".to_string()), tmp.path());

        let response = app
            .clone()
            .oneshot(json_post("/api/speak", r#"{"text": "你好"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // ping 免鉴权
        let response = app
            .oneshot(Request::builder().uri("/api/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_auth_accepts_bearer_token() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_router(Some("secret".to_string()), tmp.path());

        let request = Request::builder()
            .method("POST")
            .uri("/api/speak")
            .header("content-type", "application/json")
            .header("authorization", "Bearer secret")
            .body(Body::from(r#"{"text": "你好"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["errno"], 0);
    }

    #[tokio::test]
    async fn test_audio_download_and_not_found() {
        let tmp = tempfile::tempdir().unwrap();

        // 预置一个缓存文件
        let cache = FsAudioCache::new(FsCacheConfig {
            dir: tmp.path().to_path_buf(),
            max_age: Duration::from_secs(3600),
            file_prefix: "tts".to_string(),
        });
        let filename = cache.store(b"fake-mp3-bytes", "mp3").await.unwrap();

        let app = test_router(None, tmp.path());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/audio/{}", filename))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "audio/mpeg"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"fake-mp3-bytes");

        // 不存在的文件
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/audio/tts-0-missing.mp3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_ne!(json["errno"], 0);
    }
}
