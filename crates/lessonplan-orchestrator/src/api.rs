//! HTTP API for lesson generation.
//!
//! # Endpoints
//!
//! - `POST /generate` - Generate the three raw stage texts
//! - `POST /generate/markdown` - Generate and render the three Markdown documents
//! - `GET /health` - Liveness probe
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use lessonplan_orchestrator::{create_router, AppState, Config, GeminiBackend, Orchestrator};
//!
//! # async fn example() -> lessonplan_orchestrator::Result<()> {
//! let config = Config::default();
//! let backend = GeminiBackend::from_env(&config.backend)?;
//! let state = AppState::new(Orchestrator::new(Arc::new(backend)));
//!
//! let router = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, router).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use lessonplan_report::{
    parse_in_class_content, parse_post_class_content, parse_pre_class_content, render_lesson,
    LessonDocuments,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{GenerationResult, LessonError, Orchestrator, Stage, TopicRequest};

// ============================================================================
// Response Types
// ============================================================================

/// Error response body returned on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Description of the error.
    pub detail: String,
}

/// Response body for the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the server is up.
    pub status: String,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the HTTP server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The generation pipeline.
    pub orchestrator: Orchestrator,
}

impl AppState {
    /// Creates a new `AppState` around the given orchestrator.
    #[must_use]
    pub const fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }
}

// ============================================================================
// API Error Type
// ============================================================================

/// Internal error type for API handlers.
#[derive(Debug)]
enum ApiError {
    /// The pipeline failed at some stage, or rejected the request.
    Generation(LessonError),
}

impl From<LessonError> for ApiError {
    fn from(err: LessonError) -> Self {
        Self::Generation(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::Generation(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error generating content: {err}"),
            ),
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the HTTP router with all API endpoints.
///
/// The router allows any origin, method and header, and logs every request
/// through `TraceLayer`.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/generate", post(handle_generate))
        .route("/generate/markdown", post(handle_generate_markdown))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

// ============================================================================
// Handlers
// ============================================================================

/// Handler for `POST /generate`.
async fn handle_generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TopicRequest>,
) -> Result<Json<GenerationResult>, ApiError> {
    info!(topic = %request.topic, difficulty = %request.difficulty, "Received generate request");

    let result = state.orchestrator.generate(&request).await.map_err(|e| {
        warn!(error = %e, "Generation failed");
        ApiError::from(e)
    })?;

    Ok(Json(result))
}

/// Handler for `POST /generate/markdown`.
///
/// Stage texts that are not valid JSON render as headings only.
async fn handle_generate_markdown(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TopicRequest>,
) -> Result<Json<LessonDocuments>, ApiError> {
    info!(topic = %request.topic, difficulty = %request.difficulty, "Received markdown request");

    let result = state.orchestrator.generate(&request).await.map_err(|e| {
        warn!(error = %e, "Generation failed");
        ApiError::from(e)
    })?;

    let malformed = [
        (Stage::InClass, parse_in_class_content(&result.in_class_content).err()),
        (Stage::PreClass, parse_pre_class_content(&result.pre_class_content).err()),
        (Stage::PostClass, parse_post_class_content(&result.post_class_content).err()),
    ];
    for (stage, err) in malformed {
        if let Some(e) = err {
            warn!(stage = %stage, error = %e, "Stage output is not a JSON object; rendering defaults");
        }
    }

    Ok(Json(render_lesson(
        &result.in_class_content,
        &result.pre_class_content,
        &result.post_class_content,
    )))
}

/// Handler for `GET /health`.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use tower::util::ServiceExt;

    use super::*;
    use crate::error::BackendErrorKind;
    use crate::testing::ScriptedBackend;

    const IN_CLASS: &str = r#"{"learning_objectives": ["Explain halving"], "materials_needed": [], "class_activities": [], "assessment_methods": [], "summary": "Halve the range"}"#;
    const PRE_CLASS: &str = r#"{"overview": "Searching sorted arrays", "key_concepts": ["Midpoint - the centre index"]}"#;
    const POST_CLASS: &str = r#"{"quiz": [{"question": "Worst case?", "options": ["O(1)", "O(log n)", "O(n)", "O(n log n)"], "answer": "O(log n)"}], "summary": "Review"}"#;

    fn router_with(backend: ScriptedBackend) -> (Router, Arc<ScriptedBackend>) {
        let backend = Arc::new(backend);
        let orchestrator = Orchestrator::new(Arc::clone(&backend) as Arc<dyn crate::GenerativeBackend>);
        (create_router(AppState::new(orchestrator)), backend)
    }

    fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    // ------------------------------------------------------------------------
    // Generate endpoint tests
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_generate_returns_three_fields() {
        let (router, backend) =
            router_with(ScriptedBackend::succeeding(IN_CLASS, PRE_CLASS, POST_CLASS));

        let response = router
            .oneshot(post_json(
                "/generate",
                &serde_json::json!({ "topic": "Binary Search", "difficulty": "easy" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["in_class_content"], IN_CLASS);
        assert_eq!(body["pre_class_content"], PRE_CLASS);
        assert_eq!(body["post_class_content"], POST_CLASS);

        let prompts = backend.prompts();
        assert!(prompts[0].ends_with("\n\nBinary Search\n\neasy"));
        assert!(prompts[1].contains(IN_CLASS));
        assert!(prompts[2].contains(IN_CLASS));
    }

    #[tokio::test]
    async fn test_generate_defaults_difficulty_to_medium() {
        let (router, backend) =
            router_with(ScriptedBackend::succeeding(IN_CLASS, PRE_CLASS, POST_CLASS));

        let response = router
            .oneshot(post_json(
                "/generate",
                &serde_json::json!({ "topic": "Graphs" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(backend.prompts()[0].ends_with("\n\nGraphs\n\nmedium"));
    }

    #[tokio::test]
    async fn test_generate_failure_returns_detail_without_partial_fields() {
        let (router, _) = router_with(ScriptedBackend::new([
            Ok(IN_CLASS.to_string()),
            Ok(PRE_CLASS.to_string()),
            Err(LessonError::backend_api_error(
                BackendErrorKind::RateLimit,
                "HTTP 429: quota exhausted",
            )),
        ]));

        let response = router
            .oneshot(post_json(
                "/generate",
                &serde_json::json!({ "topic": "Binary Search", "difficulty": "easy" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.starts_with("Error generating content: "));
        assert!(detail.contains("quota exhausted"));
        assert!(body.get("in_class_content").is_none());
        assert!(body.get("pre_class_content").is_none());
    }

    #[tokio::test]
    async fn test_generate_empty_topic_is_server_error() {
        let (router, backend) =
            router_with(ScriptedBackend::succeeding(IN_CLASS, PRE_CLASS, POST_CLASS));

        let response = router
            .oneshot(post_json("/generate", &serde_json::json!({ "topic": "" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["detail"].as_str().unwrap().contains("topic must not be empty"));
        assert!(backend.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_generate_missing_topic_is_rejected() {
        let (router, backend) =
            router_with(ScriptedBackend::succeeding(IN_CLASS, PRE_CLASS, POST_CLASS));

        let response = router
            .oneshot(post_json(
                "/generate",
                &serde_json::json!({ "difficulty": "easy" }),
            ))
            .await
            .unwrap();

        assert!(response.status().is_client_error());
        assert!(backend.prompts().is_empty());
    }

    // ------------------------------------------------------------------------
    // Markdown endpoint tests
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_generate_markdown_renders_documents() {
        let (router, _) =
            router_with(ScriptedBackend::succeeding(IN_CLASS, PRE_CLASS, POST_CLASS));

        let response = router
            .oneshot(post_json(
                "/generate/markdown",
                &serde_json::json!({ "topic": "Binary Search", "difficulty": "easy" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let documents: LessonDocuments = serde_json::from_value(body).unwrap();
        assert!(documents.in_class_markdown.contains("- Explain halving"));
        assert!(documents.pre_class_markdown.contains("- Midpoint - the centre index"));
        assert!(documents.post_class_markdown.contains("**Answer:** O(log n)"));
    }

    #[tokio::test]
    async fn test_generate_markdown_tolerates_malformed_output() {
        let (router, _) = router_with(ScriptedBackend::succeeding(
            "Sorry, I cannot help with that.",
            PRE_CLASS,
            POST_CLASS,
        ));

        let response = router
            .oneshot(post_json(
                "/generate/markdown",
                &serde_json::json!({ "topic": "Binary Search" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let documents: LessonDocuments =
            serde_json::from_value(body_json(response).await).unwrap();
        assert!(documents.in_class_markdown.starts_with("## 🧠 Learning Objectives"));
        assert!(!documents.in_class_markdown.contains("Sorry"));
    }

    #[tokio::test]
    async fn test_generate_markdown_failure_returns_detail() {
        let (router, _) = router_with(ScriptedBackend::new([Err(
            LessonError::backend_api_error(BackendErrorKind::Server, "HTTP 503: unavailable"),
        )]));

        let response = router
            .oneshot(post_json(
                "/generate/markdown",
                &serde_json::json!({ "topic": "Binary Search" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["detail"].as_str().unwrap().contains("in-class generation failed"));
    }

    // ------------------------------------------------------------------------
    // Health, CORS and routing tests
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_health() {
        let (router, _) = router_with(ScriptedBackend::default());

        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_any_origin() {
        let (router, _) = router_with(ScriptedBackend::default());

        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/generate")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_unknown_route_returns_404() {
        let (router, _) = router_with(ScriptedBackend::default());

        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
