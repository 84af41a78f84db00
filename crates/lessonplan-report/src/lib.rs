//! Lesson Plan Report Generation
//!
//! This crate turns the raw text produced by each generation stage into
//! structured lesson content and renders that content for people to read.
//!
//! # Types
//!
//! - [`InClassContent`] - Objectives, materials, activities and assessment for the class itself
//! - [`PreClassContent`] - Overview, key concepts and preparatory activities
//! - [`PostClassContent`] - Quiz and summary that reinforce the class
//! - [`LessonDocuments`] - The three rendered Markdown documents
//!
//! # Generators
//!
//! - [`MarkdownGenerator`] - Render each content shape to Markdown
//! - [`json::JsonGenerator`] - Serialize a [`json::LessonReport`] with compact or pretty formatting
//!
//! # Example
//!
//! ```rust
//! use lessonplan_report::{parse_post_class_content, MarkdownGenerator};
//!
//! let raw = r#"{"quiz": [{"question": "2 + 2?", "options": ["3", "4"], "answer": "4"}]}"#;
//!
//! let content = parse_post_class_content(raw).unwrap();
//! let markdown = MarkdownGenerator::post_class(&content);
//! assert!(markdown.contains("**Answer:** 4"));
//! ```

pub mod json;
mod lenient;
mod markdown;
mod parse;

pub use markdown::MarkdownGenerator;
pub use parse::{
    parse_in_class_content, parse_in_class_content_or_default, parse_post_class_content,
    parse_post_class_content_or_default, parse_pre_class_content,
    parse_pre_class_content_or_default,
};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while parsing or rendering lesson content.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Failed to serialize or deserialize JSON.
    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to read or write report files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend text could not be read as a lesson content document.
    #[error("malformed lesson content: {0}")]
    MalformedContent(String),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

// ============================================================================
// In-class Content
// ============================================================================

/// Content for the class session itself.
///
/// Every field defaults to empty so that a backend response missing any
/// section still parses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InClassContent {
    /// What learners should be able to do after the class.
    #[serde(deserialize_with = "lenient::string_list")]
    pub learning_objectives: Vec<String>,

    /// Items the mentor needs to run the class.
    #[serde(deserialize_with = "lenient::string_list")]
    pub materials_needed: Vec<String>,

    /// Activities in the order they are run.
    #[serde(deserialize_with = "lenient::record_list")]
    pub class_activities: Vec<ClassActivity>,

    /// How understanding is checked.
    #[serde(deserialize_with = "lenient::string_list")]
    pub assessment_methods: Vec<String>,

    /// Closing key takeaways.
    #[serde(deserialize_with = "lenient::string")]
    pub summary: String,
}

/// A single in-class activity with its teaching script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassActivity {
    /// Title of the activity.
    #[serde(deserialize_with = "lenient::string")]
    pub activity_title: String,

    /// How long the activity runs, e.g. "15 minutes".
    #[serde(deserialize_with = "lenient::string")]
    pub duration: String,

    /// What the activity is about.
    #[serde(deserialize_with = "lenient::string")]
    pub description: String,

    /// Words and flow the mentor follows during the activity.
    #[serde(deserialize_with = "lenient::string")]
    pub teaching_script: String,
}

// ============================================================================
// Pre-class Content
// ============================================================================

/// Material a learner works through before the class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreClassContent {
    /// One-paragraph introduction to the topic.
    #[serde(deserialize_with = "lenient::string")]
    pub overview: String,

    /// Concepts with a short explanation each.
    #[serde(deserialize_with = "lenient::string_list")]
    pub key_concepts: Vec<String>,

    /// A small example that builds intuition.
    #[serde(deserialize_with = "lenient::string")]
    pub short_example: String,

    /// Reading materials with a brief description each.
    #[serde(deserialize_with = "lenient::string_list")]
    pub pre_class_reading_materials: Vec<String>,

    /// Activities to complete before the class.
    #[serde(deserialize_with = "lenient::record_list")]
    pub pre_class_activities: Vec<PreClassActivity>,
}

/// A single pre-class activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreClassActivity {
    /// Title of the activity.
    #[serde(deserialize_with = "lenient::string")]
    pub activity_title: String,

    /// What the activity is about.
    #[serde(deserialize_with = "lenient::string")]
    pub description: String,

    /// Steps the learner follows.
    #[serde(deserialize_with = "lenient::string")]
    pub instructions: String,
}

// ============================================================================
// Post-class Content
// ============================================================================

/// Quiz and summary that follow the class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostClassContent {
    /// Quiz questions in the order they are asked.
    #[serde(deserialize_with = "lenient::record_list")]
    pub quiz: Vec<QuizQuestion>,

    /// Key takeaways and concepts to reinforce.
    #[serde(deserialize_with = "lenient::string")]
    pub summary: String,
}

/// A multiple-choice quiz question.
///
/// The answer is not required to be one of the options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizQuestion {
    /// The question text.
    #[serde(deserialize_with = "lenient::string")]
    pub question: String,

    /// Answer options in display order.
    #[serde(deserialize_with = "lenient::string_list")]
    pub options: Vec<String>,

    /// The designated correct answer.
    #[serde(deserialize_with = "lenient::string")]
    pub answer: String,
}

// ============================================================================
// Rendered Lesson
// ============================================================================

/// File name for the rendered in-class document.
pub const IN_CLASS_FILE_NAME: &str = "in-class.md";

/// File name for the rendered pre-class document.
pub const PRE_CLASS_FILE_NAME: &str = "pre-class.md";

/// File name for the rendered post-class document.
pub const POST_CLASS_FILE_NAME: &str = "post-class.md";

/// The three rendered Markdown documents of a lesson.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonDocuments {
    /// Rendered in-class content.
    pub in_class_markdown: String,
    /// Rendered pre-class content.
    pub pre_class_markdown: String,
    /// Rendered post-class content.
    pub post_class_markdown: String,
}

impl LessonDocuments {
    /// Writes each document into `dir`, creating the directory if needed.
    ///
    /// Returns the written paths in in-class, pre-class, post-class order.
    pub fn write_to_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let files = [
            (IN_CLASS_FILE_NAME, &self.in_class_markdown),
            (PRE_CLASS_FILE_NAME, &self.pre_class_markdown),
            (POST_CLASS_FILE_NAME, &self.post_class_markdown),
        ];

        let mut written = Vec::with_capacity(files.len());
        for (name, contents) in files {
            let path = dir.join(name);
            std::fs::write(&path, contents)?;
            written.push(path);
        }

        Ok(written)
    }
}

/// Parses the raw text of each stage and renders it to Markdown.
///
/// Text that cannot be parsed renders as an empty document with only its
/// section headings.
#[must_use]
pub fn render_lesson(in_class: &str, pre_class: &str, post_class: &str) -> LessonDocuments {
    LessonDocuments {
        in_class_markdown: MarkdownGenerator::in_class(&parse_in_class_content_or_default(
            in_class,
        )),
        pre_class_markdown: MarkdownGenerator::pre_class(&parse_pre_class_content_or_default(
            pre_class,
        )),
        post_class_markdown: MarkdownGenerator::post_class(&parse_post_class_content_or_default(
            post_class,
        )),
    }
}
