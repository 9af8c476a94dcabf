//! HTTP surface for the storybook generator.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::StoryError;
use crate::models::{StoryRequest, StoryResult};
use crate::pipeline::StoryPipeline;

/// Successful response body
#[derive(Debug, Serialize)]
pub struct StoryResponse {
    pub story: StoryResult,
}

impl IntoResponse for StoryError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Creates the storybook router, served at `/` and `/api/story`
pub fn create_router(pipeline: Arc<StoryPipeline>) -> Router {
    let story = get(liveness).post(create_story).fallback(method_not_allowed);

    Router::new()
        .route("/", story.clone())
        .route("/api/story", story)
        .with_state(pipeline)
}

/// Bind and serve until the process is stopped
pub async fn serve(bind: &str, pipeline: Arc<StoryPipeline>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, create_router(pipeline))
        .await
        .context("Server error")
}

/// Liveness probe.
async fn liveness() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({"status": "ok", "message": "storybook generator is running"})),
    )
}

async fn create_story(
    State(pipeline): State<Arc<StoryPipeline>>,
    body: Bytes,
) -> Result<Json<StoryResponse>, StoryError> {
    let request = StoryRequest::from_json(&body, &pipeline.config().limits).inspect_err(|e| {
        warn!("Rejected story request: {}", e);
    })?;

    let request_id = Uuid::new_v4();
    let story = pipeline
        .generate(&request, request_id)
        .await
        .inspect_err(|e| error!(%request_id, "Story generation failed: {}", e))?;

    Ok(Json(StoryResponse { story }))
}

async fn method_not_allowed(method: Method) -> StoryError {
    StoryError::MethodNotAllowed(method.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::{FakeIllustrator, FakeNarrator, ScriptedWriter, FENCED_TWO_PAGE_REPLY};
    use crate::pipeline::PipelineConfig;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    struct Harness {
        writer: Arc<ScriptedWriter>,
        illustrator: Arc<FakeIllustrator>,
        narrator: Arc<FakeNarrator>,
    }

    impl Harness {
        fn new(writer: ScriptedWriter, illustrator: FakeIllustrator, narrator: FakeNarrator) -> Self {
            Self {
                writer: Arc::new(writer),
                illustrator: Arc::new(illustrator),
                narrator: Arc::new(narrator),
            }
        }

        fn router(&self) -> Router {
            create_router(Arc::new(StoryPipeline::new(
                self.writer.clone(),
                self.illustrator.clone(),
                self.narrator.clone(),
                PipelineConfig::default(),
            )))
        }

        async fn send(&self, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();

            let response = self.router().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, value)
        }
    }

    fn healthy() -> Harness {
        Harness::new(
            ScriptedWriter::replying(FENCED_TWO_PAGE_REPLY),
            FakeIllustrator::working(),
            FakeNarrator::working(),
        )
    }

    #[tokio::test]
    async fn test_generates_story() {
        let harness = healthy();

        let (status, body) = harness
            .send("POST", "/", r#"{"prompt": "a brave dragon", "pageCount": 2}"#)
            .await;

        assert_eq!(status, StatusCode::OK);
        let story = &body["story"];
        assert_eq!(story["title"], "The Brave Dragon");
        let pages = story["pages"].as_array().unwrap();
        assert_eq!(pages.len(), 2);
        for (index, page) in pages.iter().enumerate() {
            assert_eq!(page["page_number"], index as u64 + 1);
            assert!(page["text"].is_string());
            assert!(page["imagePrompt"].is_string());
            assert!(page["imageUrl"].as_str().unwrap().starts_with("data:image/png;base64,"));
            assert!(page["audioUrl"].as_str().unwrap().starts_with("data:audio/wav;base64,"));
        }
    }

    #[tokio::test]
    async fn test_empty_prompt_is_rejected_before_any_call() {
        let harness = healthy();

        let (status, body) = harness.send("POST", "/", r#"{"prompt": ""}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("prompt"));
        assert_eq!(harness.writer.calls(), 0);
        assert_eq!(harness.illustrator.calls(), 0);
        assert_eq!(harness.narrator.calls(), 0);
    }

    #[tokio::test]
    async fn test_garbage_reply_is_500_with_preview() {
        let harness = Harness::new(
            ScriptedWriter::replying("Once upon a time there was no JSON at all."),
            FakeIllustrator::working(),
            FakeNarrator::working(),
        );

        let (status, body) = harness
            .send("POST", "/", r#"{"prompt": "a brave dragon", "pageCount": 2}"#)
            .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("Once upon a time"));
        assert!(message.len() <= 1200);
        assert!(body.get("story").is_none());
        assert_eq!(harness.illustrator.calls(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_500() {
        let harness = Harness::new(
            ScriptedWriter::failing("API key not valid"),
            FakeIllustrator::working(),
            FakeNarrator::working(),
        );

        let (status, body) = harness.send("POST", "/", r#"{"prompt": "a brave dragon"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_asset_outage_still_returns_story() {
        let harness = Harness::new(
            ScriptedWriter::replying(FENCED_TWO_PAGE_REPLY),
            FakeIllustrator::down(),
            FakeNarrator::down(),
        );

        let (status, body) = harness
            .send("POST", "/", r#"{"prompt": "a brave dragon", "pageCount": 2}"#)
            .await;

        assert_eq!(status, StatusCode::OK);
        let pages = body["story"]["pages"].as_array().unwrap();
        assert_eq!(pages.len(), 2);
        for page in pages {
            assert!(page["imageUrl"].is_null());
            assert!(page["audioUrl"].is_null());
        }
    }

    #[tokio::test]
    async fn test_liveness_probe() {
        let (status, body) = healthy().send("GET", "/api/story", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_other_methods_are_405() {
        let harness = healthy();
        for method in ["PUT", "DELETE", "PATCH"] {
            let (status, body) = harness.send(method, "/", "{}").await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{}", method);
            assert!(body["error"].as_str().unwrap().contains(method));
        }
        assert_eq!(harness.writer.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_json_is_400() {
        let (status, body) = healthy().send("POST", "/", "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
