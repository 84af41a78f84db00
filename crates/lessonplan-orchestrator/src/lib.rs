//! Lesson Plan Orchestrator
//!
//! Runs the three-stage lesson generation pipeline against a generative
//! backend and serves it over HTTP.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod prompts;

#[cfg(test)]
mod testing;

pub use api::{create_router, AppState, ErrorResponse, HealthResponse};
pub use backend::{GeminiBackend, GenerationConfig, GenerativeBackend};
pub use config::{BackendConfig, Config, ServerConfig, CONFIG_FILE_NAME};
pub use error::{BackendErrorKind, LessonError, Result};
pub use orchestrator::{
    GenerationResult, Orchestrator, Stage, TopicRequest, DEFAULT_DIFFICULTY,
};
