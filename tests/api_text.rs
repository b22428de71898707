// tests/api_text.rs
//
// Auxiliary text endpoints with stub services behind the public traits.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use parking_lot::Mutex;
use serde_json::json;

mod common;
use common::{send, send_raw};

use news_aggregator::services::{
    FakeNewsDetector, FakeNewsLabel, FakeNewsVerdict, ServiceError, Summarizer, Translator,
};
use news_aggregator::{create_router, AppState};

/// Records what it was asked to translate and answers with a fixed reply.
struct RecordingTranslator {
    seen: Mutex<Vec<(String, String)>>,
    reply: Result<String, &'static str>,
}

impl RecordingTranslator {
    fn replying(reply: Result<String, &'static str>) -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
            reply,
        })
    }
}

#[async_trait]
impl Translator for RecordingTranslator {
    async fn translate(&self, text: &str, to: &str) -> Result<String, ServiceError> {
        self.seen.lock().push((text.to_string(), to.to_string()));
        match &self.reply {
            Ok(t) => Ok(t.clone()),
            Err(reason) => Err(ServiceError::Failed {
                service: "translate",
                reason: reason.to_string(),
            }),
        }
    }
}

struct FixedSummarizer(Result<Vec<String>, fn() -> ServiceError>);

#[async_trait]
impl Summarizer for FixedSummarizer {
    async fn summarize(&self, _title: &str, _text: &str) -> Result<Vec<String>, ServiceError> {
        match &self.0 {
            Ok(points) => Ok(points.clone()),
            Err(make) => Err(make()),
        }
    }
}

struct AlwaysFake;

impl FakeNewsDetector for AlwaysFake {
    fn classify(&self, _text: &str) -> FakeNewsVerdict {
        FakeNewsVerdict {
            label: FakeNewsLabel::Fake,
            confidence: 0.75,
        }
    }
}

#[tokio::test]
async fn translate_truncates_to_1000_chars_before_dispatch() {
    let translator = RecordingTranslator::replying(Ok("hola".into()));
    let app = create_router(AppState::for_tests().with_translator(translator.clone()));

    let long = "a".repeat(1500);
    let (status, body) = send(
        &app,
        "POST",
        "/api/translate",
        Some(json!({ "text": long, "to": "es" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["translatedText"], "hola");

    let seen = translator.seen.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0.chars().count(), 1000);
    assert_eq!(seen[0].1, "es");
}

#[tokio::test]
async fn translate_never_returns_an_empty_success() {
    let translator = RecordingTranslator::replying(Ok("   ".into()));
    let app = create_router(AppState::for_tests().with_translator(translator));
    let (status, body) = send(
        &app,
        "POST",
        "/api/translate",
        Some(json!({ "text": "hello", "to": "fr" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to translate text");
    assert!(body.get("translatedText").is_none());
}

#[tokio::test]
async fn translate_upstream_failure_is_generic_500() {
    let translator = RecordingTranslator::replying(Err("Translation not available"));
    let app = create_router(AppState::for_tests().with_translator(translator));
    let (status, body) = send(
        &app,
        "POST",
        "/api/translate",
        Some(json!({ "text": "hello", "to": "fr" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to translate text");
}

#[tokio::test]
async fn translate_requires_text_and_target() {
    let translator = RecordingTranslator::replying(Ok("x".into()));
    let app = create_router(AppState::for_tests().with_translator(translator.clone()));
    let (status, _) = send(&app, "POST", "/api/translate", Some(json!({ "text": "hi" })), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(translator.seen.lock().is_empty());
}

#[tokio::test]
async fn summarize_returns_points() {
    let s = FixedSummarizer(Ok(vec!["First.".into(), "Second.".into()]));
    let app = create_router(AppState::for_tests().with_summarizer(Arc::new(s)));
    let (status, body) = send(
        &app,
        "POST",
        "/api/summarize",
        Some(json!({ "title": "T", "text": "Body" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], json!(["First.", "Second."]));
}

#[tokio::test]
async fn summarize_maps_upstream_401_to_invalid_credentials() {
    let s = FixedSummarizer(Err(|| {
        ServiceError::InvalidCredentials("Invalid Hugging Face API token".into())
    }));
    let app = create_router(AppState::for_tests().with_summarizer(Arc::new(s)));
    let (status, body) = send(
        &app,
        "POST",
        "/api/summarize",
        Some(json!({ "title": "T", "text": "Body" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid Hugging Face API token");
}

#[tokio::test]
async fn summarize_without_token_reports_not_configured() {
    // Test state has no HF token, so the real summarizer is wired unconfigured.
    let app = create_router(AppState::for_tests());
    let (status, body) = send(
        &app,
        "POST",
        "/api/summarize",
        Some(json!({ "title": "T", "text": "Body" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "summarization service is not configured");
}

#[tokio::test]
async fn summarize_requires_title_and_text() {
    let app = create_router(AppState::for_tests());
    let (status, body) = send(&app, "POST", "/api/summarize", Some(json!({ "text": "x" })), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Text and title are required");
}

#[tokio::test]
async fn fake_news_detector_shape() {
    let app = create_router(AppState::for_tests());
    let (status, body) = send(
        &app,
        "POST",
        "/detect-fake-news",
        Some(json!({ "text": "Aliens endorse candidate" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let label = body["label"].as_str().unwrap();
    assert!(label == "Fake" || label == "Real");
    let c = body["confidence"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&c));

    let app = create_router(AppState::for_tests().with_detector(Arc::new(AlwaysFake)));
    let (_, body) = send(&app, "POST", "/detect-fake-news", Some(json!({ "text": "x" })), None).await;
    assert_eq!(body["label"], "Fake");
    assert_eq!(body["confidence"], 0.75);
}

#[tokio::test]
async fn fake_news_requires_text() {
    let app = create_router(AppState::for_tests());
    let (status, body) = send(&app, "POST", "/detect-fake-news", Some(json!({ "text": "" })), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Text is required");
}

#[tokio::test]
async fn malformed_json_body_renders_error_body() {
    let app = create_router(AppState::for_tests());
    let (status, body) = send_raw(
        &app,
        "POST",
        "/api/translate",
        Some("application/json"),
        "{not json",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("JSON"), "{body}");

    // Wrong content type goes through the same envelope.
    let (status, body) =
        send_raw(&app, "POST", "/detect-fake-news", Some("text/plain"), "hello").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");
}

