//! The three-stage lesson generation pipeline.
//!
//! The in-class plan is generated first. Its raw text then seeds the
//! pre-class and post-class prompts. Calls run strictly in sequence and the
//! first failure aborts the whole generation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backend::GenerativeBackend;
use crate::error::{LessonError, Result};
use crate::prompts;

/// Difficulty used when a request does not name one.
pub const DEFAULT_DIFFICULTY: &str = "medium";

fn default_difficulty() -> String {
    DEFAULT_DIFFICULTY.to_string()
}

/// One backend call in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The in-class lesson plan.
    InClass,
    /// Preparation material derived from the in-class plan.
    PreClass,
    /// Quiz and summary derived from the in-class plan.
    PostClass,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InClass => write!(f, "in-class"),
            Self::PreClass => write!(f, "pre-class"),
            Self::PostClass => write!(f, "post-class"),
        }
    }
}

/// A request to generate a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRequest {
    /// Subject of the lesson.
    pub topic: String,
    /// Free-form difficulty label, `"medium"` when absent.
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
}

impl TopicRequest {
    /// Creates a request with the given topic and difficulty.
    #[must_use]
    pub fn new(topic: impl Into<String>, difficulty: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            difficulty: difficulty.into(),
        }
    }
}

/// Raw, trimmed backend output for each stage.
///
/// The texts are whatever the backend produced; they are expected, not
/// guaranteed, to hold the JSON shapes described by the stage instructions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// In-class lesson plan.
    pub in_class_content: String,
    /// Pre-class material.
    pub pre_class_content: String,
    /// Post-class quiz and summary.
    pub post_class_content: String,
}

/// Drives the generation pipeline against a [`GenerativeBackend`].
#[derive(Clone)]
pub struct Orchestrator {
    backend: Arc<dyn GenerativeBackend>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("model", &self.backend.model())
            .finish()
    }
}

impl Orchestrator {
    /// Creates an orchestrator around the given backend.
    #[must_use]
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }

    /// Runs the full pipeline for a request.
    ///
    /// # Errors
    ///
    /// See [`Orchestrator::generate_in_class_content`].
    pub async fn generate(&self, request: &TopicRequest) -> Result<GenerationResult> {
        self.generate_in_class_content(&request.topic, &request.difficulty)
            .await
    }

    /// Generates the in-class plan, then the pre-class and post-class
    /// material from it.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::InvalidRequest` for a blank topic, without
    /// calling the backend. Any stage failure is returned as
    /// `LessonError::StageFailed` and no partial result is produced.
    pub async fn generate_in_class_content(
        &self,
        topic: &str,
        difficulty: &str,
    ) -> Result<GenerationResult> {
        let topic = topic.trim();
        if topic.is_empty() {
            warn!("Rejected generation request with an empty topic");
            return Err(LessonError::invalid_request("topic must not be empty"));
        }

        info!(topic = %topic, difficulty = %difficulty, model = %self.backend.model(), "Generating lesson");

        let in_class_content = self
            .run_stage(Stage::InClass, &prompts::in_class_prompt(topic, difficulty))
            .await?;
        let pre_class_content = self
            .generate_pre_class_content(&in_class_content, difficulty)
            .await?;
        let post_class_content = self
            .generate_post_class_content(&in_class_content, difficulty)
            .await?;

        info!(topic = %topic, "Lesson generated");

        Ok(GenerationResult {
            in_class_content,
            pre_class_content,
            post_class_content,
        })
    }

    /// Generates pre-class material from raw in-class text.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::StageFailed` if the backend call fails or
    /// produces no text.
    pub async fn generate_pre_class_content(
        &self,
        in_class_text: &str,
        difficulty: &str,
    ) -> Result<String> {
        self.run_stage(
            Stage::PreClass,
            &prompts::pre_class_prompt(in_class_text, difficulty),
        )
        .await
    }

    /// Generates the post-class quiz and summary from raw in-class text.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::StageFailed` if the backend call fails or
    /// produces no text.
    pub async fn generate_post_class_content(
        &self,
        in_class_text: &str,
        difficulty: &str,
    ) -> Result<String> {
        self.run_stage(
            Stage::PostClass,
            &prompts::post_class_prompt(in_class_text, difficulty),
        )
        .await
    }

    async fn run_stage(&self, stage: Stage, prompt: &str) -> Result<String> {
        debug!(stage = %stage, prompt_len = prompt.len(), "Stage started");

        let text = match self.backend.generate(prompt).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(stage = %stage, error = %e, "Stage failed");
                return Err(e.in_stage(stage));
            }
        };

        if text.is_empty() {
            warn!(stage = %stage, "Stage produced no text");
            return Err(
                LessonError::empty_response("backend returned only whitespace").in_stage(stage),
            );
        }

        info!(stage = %stage, response_len = text.len(), "Stage finished");
        Ok(text)
    }
}
