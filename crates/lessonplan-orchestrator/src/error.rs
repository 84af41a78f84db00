//! Error types for the lesson plan orchestrator.
//!
//! This module defines the error hierarchy for configuration loading,
//! backend calls, and the generation pipeline.

use std::path::PathBuf;

use crate::Stage;

/// A specialized `Result` type for orchestrator operations.
pub type Result<T> = std::result::Result<T, LessonError>;

/// Errors that can occur while generating a lesson.
///
/// Variants carry an actionable suggestion where the user can do something
/// about the failure.
#[derive(Debug, thiserror::Error)]
pub enum LessonError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in the configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your lessonplan.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    /// The backend credential is not set in the environment.
    #[error("API key not found: environment variable '{var}' is not set\n\nSuggestion: Export {var} with your Generative Language API key")]
    MissingApiKey {
        /// Name of the environment variable that was read.
        var: String,
    },

    // ========================================================================
    // Backend Errors
    // ========================================================================
    /// The generative backend returned an error.
    #[error("Backend API error ({kind}): {message}\n\nSuggestion: {suggestion}")]
    BackendApiError {
        /// The kind of API error (e.g., rate limit, authentication, server).
        kind: BackendErrorKind,
        /// Detailed error message from the API.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    /// The backend answered but produced no usable text.
    #[error("Backend returned an empty response: {reason}")]
    EmptyResponse {
        /// Why the response held no text (e.g., a block reason).
        reason: String,
    },

    // ========================================================================
    // Pipeline Errors
    // ========================================================================
    /// The generation request was rejected before any backend call.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of what is wrong with the request.
        message: String,
    },

    /// A pipeline stage failed; the whole generation is aborted.
    #[error("{stage} generation failed: {source}")]
    StageFailed {
        /// The stage that failed.
        stage: Stage,
        /// The underlying failure.
        #[source]
        source: Box<LessonError>,
    },

    // ========================================================================
    // General Errors
    // ========================================================================
    /// General I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Categories of backend API errors for structured error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Authentication failure (invalid API key, expired credentials).
    Authentication,
    /// Rate limit or quota exceeded.
    RateLimit,
    /// Server error (5xx responses).
    Server,
    /// Network connectivity issues.
    Network,
    /// Other unclassified errors.
    Other,
}

impl std::fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::RateLimit => write!(f, "rate_limit"),
            Self::Server => write!(f, "server"),
            Self::Network => write!(f, "network"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl BackendErrorKind {
    /// Classifies an HTTP status code returned by the backend.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Authentication,
            429 => Self::RateLimit,
            500..=599 => Self::Server,
            _ => Self::Other,
        }
    }

    /// Returns a suggestion message for this error kind.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::Authentication => "Check your API key or credentials",
            Self::RateLimit => "Wait and retry, or check your quota",
            Self::Server => "Retry later; the backend may be experiencing issues",
            Self::Network => "Check your network connection",
            Self::Other => "Check the backend provider's status page",
        }
    }
}

impl LessonError {
    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `MissingApiKey` error.
    #[must_use]
    pub fn missing_api_key(var: impl Into<String>) -> Self {
        Self::MissingApiKey { var: var.into() }
    }

    /// Creates a new `BackendApiError` with automatic suggestion based on error kind.
    #[must_use]
    pub fn backend_api_error(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        let suggestion = kind.suggestion().to_string();
        Self::BackendApiError {
            kind,
            message: message.into(),
            suggestion,
        }
    }

    /// Creates a new `EmptyResponse` error.
    #[must_use]
    pub fn empty_response(reason: impl Into<String>) -> Self {
        Self::EmptyResponse {
            reason: reason.into(),
        }
    }

    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Wraps this error with the stage it occurred in.
    #[must_use]
    pub fn in_stage(self, stage: Stage) -> Self {
        Self::StageFailed {
            stage,
            source: Box::new(self),
        }
    }

    /// Returns the stage this error occurred in, if known.
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Returns `true` if this error is transient and a later attempt may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::BackendApiError { kind, .. } => matches!(
                kind,
                BackendErrorKind::RateLimit | BackendErrorKind::Server | BackendErrorKind::Network
            ),
            Self::StageFailed { source, .. } => source.is_transient(),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for LessonError {
    fn from(err: reqwest::Error) -> Self {
        let kind = err.status().map_or_else(
            || {
                if err.is_decode() {
                    BackendErrorKind::Other
                } else {
                    BackendErrorKind::Network
                }
            },
            |status| BackendErrorKind::from_status(status.as_u16()),
        );
        Self::backend_api_error(kind, err.to_string())
    }
}
