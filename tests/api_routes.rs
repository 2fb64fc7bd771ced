//! HTTP surface tests: the router runs in-process against fake text and model
//! providers, so nothing here touches the network.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
    Router,
};
use link_tldr::{
    api::routes::create_router,
    config::Config,
    error::{AppError, Result},
    extractor::{TextSource, truncate_chars},
    llm::LanguageModel,
    AppState,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

struct FakeSource {
    pages: HashMap<String, String>,
    calls: AtomicUsize,
}

#[async_trait]
impl TextSource for FakeSource {
    async fn extract(&self, url: &str, max_chars: usize) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = self
            .pages
            .get(url)
            .ok_or_else(|| AppError::FetchError(format!("{url} returned status 404 Not Found")))?;
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::EmptyContent);
        }
        Ok(truncate_chars(text, max_chars).to_string())
    }
}

struct FakeModel {
    reply: String,
    fail: bool,
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn generate(&self, _model: &str, _prompt: &str) -> Result<String> {
        if self.fail {
            return Err(AppError::LlmError("401 invalid api key".into()));
        }
        Ok(self.reply.clone())
    }

    async fn list_models(&self, limit: usize) -> Result<Vec<String>> {
        if self.fail {
            return Err(AppError::LlmError("401 invalid api key".into()));
        }
        Ok((0..100).map(|i| format!("vendor/model-{i}")).take(limit).collect())
    }
}

fn config(model_name: Option<&str>) -> Config {
    let model_name = model_name.map(str::to_string);
    Config::from_lookup(|key| match key {
        "MODEL_NAME" => model_name.clone(),
        "MAX_INPUT_CHARS" => Some("20".to_string()),
        _ => None,
    })
    .unwrap()
}

struct Harness {
    app: Router,
    source: Arc<FakeSource>,
}

fn harness(model_name: Option<&str>, reply: &str, fail: bool) -> Harness {
    let pages = HashMap::from([
        (
            "https://example.com/article".to_string(),
            "A fairly long article body that exceeds the limit".to_string(),
        ),
        ("https://example.com/blank".to_string(), "   ".to_string()),
    ]);
    let source = Arc::new(FakeSource {
        pages,
        calls: AtomicUsize::new(0),
    });
    let model = Arc::new(FakeModel {
        reply: reply.to_string(),
        fail,
    });
    let state = AppState::with_components(config(model_name), source.clone(), model);
    Harness {
        app: create_router(state),
        source,
    }
}

const GOOD_REPLY: &str =
    r#"{"title":"Article","bullets":["one","two"],"takeaway":"short","tags":["news","tech","rust"]}"#;

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_configuration() {
    let h = harness(Some("vendor/model-1"), GOOD_REPLY, false);
    let (status, body) = send(&h.app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "model": "vendor/model-1", "max_input_chars": 20}));
}

#[tokio::test]
async fn health_without_model_reports_null() {
    let h = harness(None, GOOD_REPLY, true);
    let (status, body) = send(&h.app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"], Value::Null);
}

#[tokio::test]
async fn models_are_capped() {
    let h = harness(Some("m"), GOOD_REPLY, false);
    let (status, body) = send(&h.app, Method::GET, "/models", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["models"].as_array().unwrap().len(), 30);
    assert_eq!(body["models"][0], "vendor/model-0");
}

#[tokio::test]
async fn provider_failure_is_500_on_models_and_ping() {
    let h = harness(Some("m"), GOOD_REPLY, true);

    for uri in ["/models", "/ai-health"] {
        let (status, body) = send(&h.app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert!(body["detail"].as_str().unwrap().contains("invalid api key"));
    }
}

#[tokio::test]
async fn ai_health_returns_reply() {
    let h = harness(Some("m"), "ok", false);
    let (status, body) = send(&h.app, Method::GET, "/ai-health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ai": "ok"}));
}

#[tokio::test]
async fn ai_health_without_model_is_500() {
    let h = harness(None, "ok", false);
    let (status, body) = send(&h.app, Method::GET, "/ai-health", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("MODEL_NAME"));
}

#[tokio::test]
async fn summarize_then_hit_cache() {
    let h = harness(Some("m"), GOOD_REPLY, false);
    let request = json!({"url": "https://example.com/article"});

    let (status, first) = send(&h.app, Method::POST, "/summarize", Some(request.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["source"], "https://example.com/article");
    assert_eq!(first["chars"], 20);
    assert_eq!(first["cache_hit"], false);
    assert_eq!(first["summary"]["title"], "Article");
    assert_eq!(first["summary"]["tags"], json!(["news", "tech", "rust"]));
    for key in ["total", "parse", "ai"] {
        assert!(first["timing_ms"][key].is_u64(), "{key}");
    }

    let (status, second) = send(&h.app, Method::POST, "/summarize", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["cache_hit"], true);
    assert_eq!(second["source"], first["source"]);
    assert_eq!(second["chars"], first["chars"]);
    assert_eq!(second["summary"], first["summary"]);
    assert_eq!(second["timing_ms"]["parse"], 0);
    assert_eq!(second["timing_ms"]["ai"], 0);

    assert_eq!(h.source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn non_json_reply_still_succeeds() {
    let h = harness(Some("m"), "not json at all", false);
    let (status, body) = send(
        &h.app,
        Method::POST,
        "/summarize",
        Some(json!({"url": "https://example.com/article"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["summary"],
        json!({"title": "", "bullets": ["not json at all"], "takeaway": "", "tags": []})
    );
}

#[tokio::test]
async fn empty_page_is_400() {
    let h = harness(Some("m"), GOOD_REPLY, false);
    let (status, body) = send(
        &h.app,
        Method::POST,
        "/summarize",
        Some(json!({"url": "https://example.com/blank"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"detail": "Empty text"}));
}

#[tokio::test]
async fn every_pipeline_failure_is_400() {
    let cases = [
        (harness(Some("m"), GOOD_REPLY, false), json!({"url": "https://example.com/missing"})),
        (harness(Some("m"), GOOD_REPLY, true), json!({"url": "https://example.com/article"})),
        (harness(None, GOOD_REPLY, false), json!({"url": "https://example.com/article"})),
        (harness(Some("m"), GOOD_REPLY, false), json!({"url": "no scheme here"})),
    ];

    for (h, request) in cases {
        let (status, body) = send(&h.app, Method::POST, "/summarize", Some(request.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{request}");
        assert!(!body["detail"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn malformed_body_is_400_with_detail() {
    let h = harness(Some("m"), GOOD_REPLY, false);
    let (status, body) = send(&h.app, Method::POST, "/summarize", Some(json!({"link": "x"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
    assert_eq!(h.source.calls.load(Ordering::SeqCst), 0);
}
