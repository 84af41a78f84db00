//! Configuration types for the lesson plan orchestrator.
//!
//! This module provides the configuration for the generative backend (model,
//! sampling parameters, credential source) and for the HTTP server.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LessonError, Result};

/// The default config file name.
pub const CONFIG_FILE_NAME: &str = "lessonplan.json";

/// Default model identifier.
fn default_model() -> String {
    "gemini-1.5-pro".to_string()
}

/// Default sampling temperature.
const fn default_temperature() -> f32 {
    0.35
}

/// Default output token ceiling per backend call.
const fn default_max_output_tokens() -> u32 {
    1024
}

/// Default backend API base URL.
fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

/// Default environment variable holding the API key.
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

/// Default per-request timeout in seconds.
const fn default_request_timeout_secs() -> u64 {
    120
}

/// Default bind host for the HTTP server.
fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default port for the HTTP server.
const fn default_port() -> u16 {
    8000
}

/// Main configuration for the lesson plan generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Generative backend settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `lessonplan.json` in the current directory. If not found,
    /// returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON or
    /// invalid values.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            LessonError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads configuration from `lessonplan.json` in a specific directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON or
    /// invalid values.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        Self::load_from_file(&config_path)
    }

    /// Loads configuration from a specific file path.
    ///
    /// If the file does not exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::ConfigParseError` if the file exists but contains
    /// invalid JSON.
    ///
    /// Returns `LessonError::ConfigValidationError` if the configuration values
    /// are invalid.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(LessonError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| LessonError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::ConfigValidationError` if any check fails.
    pub fn validate(&self) -> Result<()> {
        self.backend.validate()?;
        self.server.validate()
    }
}

/// Generative backend configuration.
///
/// The sampling parameters are fixed per deployment; they are not exposed to
/// HTTP callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    /// Model identifier, e.g. `gemini-1.5-pro`.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output token ceiling per call.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Base URL of the Generative Language API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Environment variable the API key is read from.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Timeout for a single backend request in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            api_base_url: default_api_base_url(),
            api_key_env: default_api_key_env(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl BackendConfig {
    fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(LessonError::config_validation(
                "backend.model must not be empty",
                "Set backend.model to a model identifier such as \"gemini-1.5-pro\" in your lessonplan.json",
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(LessonError::config_validation(
                format!(
                    "backend.temperature must be between 0.0 and 2.0 (got {})",
                    self.temperature
                ),
                "Set backend.temperature to a low value such as 0.35 in your lessonplan.json",
            ));
        }

        if self.max_output_tokens == 0 {
            return Err(LessonError::config_validation(
                "backend.maxOutputTokens must be greater than 0",
                "Set backend.maxOutputTokens to at least 1 in your lessonplan.json",
            ));
        }

        if self.api_base_url.trim().is_empty() {
            return Err(LessonError::config_validation(
                "backend.apiBaseUrl must not be empty",
                "Remove backend.apiBaseUrl from your lessonplan.json to use the default endpoint",
            ));
        }

        if self.api_key_env.trim().is_empty() {
            return Err(LessonError::config_validation(
                "backend.apiKeyEnv must not be empty",
                "Set backend.apiKeyEnv to the environment variable holding your API key",
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(LessonError::config_validation(
                "backend.requestTimeoutSecs must be greater than 0",
                "Set backend.requestTimeoutSecs to at least 1 second in your lessonplan.json",
            ));
        }

        Ok(())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(LessonError::config_validation(
                "server.host must not be empty",
                "Set server.host to an address such as \"127.0.0.1\" in your lessonplan.json",
            ));
        }

        Ok(())
    }
}
