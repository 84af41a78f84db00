//! JSON lesson reports.
//!
//! A [`LessonReport`] bundles the request parameters with the parsed content
//! of every stage. [`JsonGenerator`] serializes it as compact or
//! pretty-printed JSON.
//!
//! # Example
//!
//! ```rust
//! use lessonplan_report::json::{JsonGenerator, LessonReport};
//!
//! let report = LessonReport::from_raw(
//!     "Binary Search",
//!     "easy",
//!     r#"{"summary": "Halve and conquer"}"#,
//!     "{}",
//!     "{}",
//! );
//!
//! let json = JsonGenerator::new(&report).generate_pretty().unwrap();
//! assert!(json.contains("Halve and conquer"));
//! ```

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    parse_in_class_content_or_default, parse_post_class_content_or_default,
    parse_pre_class_content_or_default, InClassContent, PostClassContent, PreClassContent,
    ReportError, Result,
};

/// File name for the JSON lesson report.
pub const LESSON_REPORT_FILE_NAME: &str = "lesson.json";

/// A generated lesson with its parsed content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonReport {
    /// Topic the lesson was generated for.
    pub topic: String,
    /// Requested difficulty.
    pub difficulty: String,
    /// When the report was assembled.
    pub generated_at: DateTime<Utc>,
    /// Parsed in-class content.
    pub in_class: InClassContent,
    /// Parsed pre-class content.
    pub pre_class: PreClassContent,
    /// Parsed post-class content.
    pub post_class: PostClassContent,
}

impl LessonReport {
    /// Builds a report from the raw stage texts, parsing each leniently.
    #[must_use]
    pub fn from_raw(
        topic: impl Into<String>,
        difficulty: impl Into<String>,
        in_class: &str,
        pre_class: &str,
        post_class: &str,
    ) -> Self {
        Self {
            topic: topic.into(),
            difficulty: difficulty.into(),
            generated_at: Utc::now(),
            in_class: parse_in_class_content_or_default(in_class),
            pre_class: parse_pre_class_content_or_default(pre_class),
            post_class: parse_post_class_content_or_default(post_class),
        }
    }
}

/// JSON report generator.
pub struct JsonGenerator<'a> {
    report: &'a LessonReport,
}

impl<'a> JsonGenerator<'a> {
    /// Creates a new JSON generator for the given report.
    #[must_use]
    pub const fn new(report: &'a LessonReport) -> Self {
        Self { report }
    }

    /// Generates compact JSON output (single line, no extra whitespace).
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if JSON serialization fails.
    pub fn generate(&self) -> Result<String> {
        serde_json::to_string(self.report).map_err(ReportError::from)
    }

    /// Generates pretty-printed JSON output with indentation.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if JSON serialization fails.
    pub fn generate_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self.report).map_err(ReportError::from)
    }

    /// Writes the JSON report to a file, creating or overwriting it.
    ///
    /// Parent directories must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if JSON serialization fails.
    /// Returns [`ReportError::Io`] if file creation or writing fails.
    pub fn write_to_file(&self, path: &Path, pretty: bool) -> Result<()> {
        let json = if pretty {
            self.generate_pretty()?
        } else {
            self.generate()?
        };

        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}
