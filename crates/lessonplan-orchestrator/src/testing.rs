//! Scripted backend shared by the unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::GenerativeBackend;
use crate::error::{LessonError, Result};

/// Replays queued responses in order and records every prompt it receives.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(responses: impl IntoIterator<Item = Result<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Three successful stage responses.
    pub fn succeeding(in_class: &str, pre_class: &str, post_class: &str) -> Self {
        Self::new([
            Ok(in_class.to_string()),
            Ok(pre_class.to_string()),
            Ok(post_class.to_string()),
        ])
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LessonError::empty_response("script exhausted")))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
