//! End-to-end tests for the lesson generation API.
//!
//! The real router is served on an ephemeral port and driven over HTTP,
//! with a canned backend standing in for the generative API.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use lessonplan_orchestrator::{
    create_router, AppState, BackendErrorKind, GenerationResult, GenerativeBackend, LessonError,
    Orchestrator,
};
use lessonplan_report::{parse_in_class_content, LessonDocuments};

const IN_CLASS: &str = r#"```json
{
  "learning_objectives": ["Explain why binary search needs sorted input", "Trace the midpoint updates"],
  "materials_needed": ["Whiteboard", "Sorted number cards"],
  "class_activities": [
    {
      "activity_title": "Guess the Number",
      "duration": "15 minutes",
      "description": "Students halve the range out loud",
      "teaching_script": "Ask a volunteer to pick a number between 1 and 100."
    }
  ],
  "assessment_methods": ["Exit ticket"],
  "summary": "Each comparison halves the search space"
}
```"#;

const PRE_CLASS: &str = r#"{"overview": "Searching sorted data quickly", "key_concepts": ["Midpoint - the centre index", "Invariant - the target stays in range"], "short_example": "Finding 7 in [1, 3, 5, 7, 9]", "pre_class_reading_materials": [], "pre_class_activities": []}"#;

const POST_CLASS: &str = r#"{"quiz": [{"question": "What is the worst-case complexity?", "options": ["O(1)", "O(log n)", "O(n)", "O(n log n)"], "answer": "O(log n)"}], "summary": "Binary search runs in logarithmic time"}"#;

/// Answers each stage by recognising its instruction.
#[derive(Default)]
struct CannedBackend {
    prompts: Mutex<Vec<String>>,
    fail_post_class: bool,
}

#[async_trait]
impl GenerativeBackend for CannedBackend {
    async fn generate(&self, prompt: &str) -> lessonplan_orchestrator::Result<String> {
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push(prompt.to_string());

        if prompt.contains("creating pre-class content") {
            Ok(PRE_CLASS.to_string())
        } else if prompt.contains("creating post-class content") {
            if self.fail_post_class {
                Err(LessonError::backend_api_error(
                    BackendErrorKind::RateLimit,
                    "HTTP 429: Resource has been exhausted",
                ))
            } else {
                Ok(POST_CLASS.to_string())
            }
        } else {
            Ok(format!("\n{IN_CLASS}\n"))
        }
    }

    fn model(&self) -> &str {
        "canned"
    }
}

/// Spawns the API on an ephemeral port and returns its base URL.
async fn spawn_server(backend: Arc<CannedBackend>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local addr");

    let orchestrator = Orchestrator::new(backend);
    let router = create_router(AppState::new(orchestrator));

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });

    // Give the server a moment to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://{addr}")
}

#[tokio::test]
async fn test_binary_search_lesson_end_to_end() {
    let backend = Arc::new(CannedBackend::default());
    let base_url = spawn_server(Arc::clone(&backend)).await;

    let response = reqwest::Client::new()
        .post(format!("{base_url}/generate"))
        .json(&serde_json::json!({ "topic": "Binary Search", "difficulty": "easy" }))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let result: GenerationResult = response.json().await.expect("Invalid body");
    assert!(!result.in_class_content.is_empty());
    assert!(!result.pre_class_content.is_empty());
    assert!(!result.post_class_content.is_empty());
    assert_eq!(result.in_class_content, IN_CLASS);

    let in_class = parse_in_class_content(&result.in_class_content).expect("in-class shape");
    assert_eq!(in_class.class_activities.len(), 1);
    assert_eq!(in_class.class_activities[0].duration, "15 minutes");

    let prompts = backend.prompts.lock().expect("prompt log poisoned").clone();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[0].ends_with("\n\nBinary Search\n\neasy"));
    for prompt in &prompts[1..] {
        assert!(prompt.ends_with(IN_CLASS), "derived stage missing in-class text");
        assert!(prompt.contains("The difficulty level of the topic is easy."));
    }
}

#[tokio::test]
async fn test_markdown_endpoint_end_to_end() {
    let backend = Arc::new(CannedBackend::default());
    let base_url = spawn_server(backend).await;

    let documents: LessonDocuments = reqwest::Client::new()
        .post(format!("{base_url}/generate/markdown"))
        .json(&serde_json::json!({ "topic": "Binary Search", "difficulty": "easy" }))
        .send()
        .await
        .expect("Request failed")
        .error_for_status()
        .expect("Unexpected status")
        .json()
        .await
        .expect("Invalid body");

    assert!(documents
        .in_class_markdown
        .contains("### Guess the Number\n**Duration:** 15 minutes"));
    assert!(documents
        .pre_class_markdown
        .contains("- Midpoint - the centre index\n- Invariant - the target stays in range"));
    assert!(documents.post_class_markdown.contains("**Answer:** O(log n)"));
}

#[tokio::test]
async fn test_stage_failure_returns_500_with_detail() {
    let backend = Arc::new(CannedBackend {
        fail_post_class: true,
        ..Default::default()
    });
    let base_url = spawn_server(Arc::clone(&backend)).await;

    let response = reqwest::Client::new()
        .post(format!("{base_url}/generate"))
        .json(&serde_json::json!({ "topic": "Binary Search" }))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = response.json().await.expect("Invalid body");
    let detail = body["detail"].as_str().expect("detail field");
    assert!(detail.starts_with("Error generating content: post-class generation failed"));
    assert!(detail.contains("Resource has been exhausted"));
    assert!(body.get("in_class_content").is_none());

    let prompts = backend.prompts.lock().expect("prompt log poisoned").clone();
    assert!(prompts[0].ends_with("\n\nmedium"));
}

#[tokio::test]
async fn test_health_endpoint() {
    let base_url = spawn_server(Arc::new(CannedBackend::default())).await;

    let body: serde_json::Value = reqwest::get(format!("{base_url}/health"))
        .await
        .expect("Request failed")
        .json()
        .await
        .expect("Invalid body");

    assert_eq!(body, serde_json::json!({ "status": "ok" }));
}
