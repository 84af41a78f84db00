//! Markdown rendering of lesson content.
//!
//! This module provides [`MarkdownGenerator`] with one entry point per stage.
//! Each document is built as an ordered list of text blocks joined with
//! line breaks. Section order and headings are fixed; list items keep the
//! order they arrived in; text is emitted exactly as given.
//!
//! Missing content never fails rendering: an empty scalar leaves an empty
//! line under its heading and an empty list leaves only the heading.
//!
//! # Example
//!
//! ```rust
//! use lessonplan_report::{MarkdownGenerator, PreClassContent};
//!
//! let content = PreClassContent {
//!     key_concepts: vec!["A - x".to_string(), "B - y".to_string()],
//!     ..Default::default()
//! };
//!
//! let markdown = MarkdownGenerator::pre_class(&content);
//! assert!(markdown.contains("- A - x\n- B - y"));
//! ```

use crate::{
    ClassActivity, InClassContent, PostClassContent, PreClassActivity, PreClassContent,
    QuizQuestion,
};

/// Pre-class section headings.
const OVERVIEW: &str = "📚 Overview";
const KEY_CONCEPTS: &str = "🧩 Key Concepts";
const SHORT_EXAMPLE: &str = "💡 Short Example";
const READING_MATERIALS: &str = "📖 Pre-class Reading Materials";
const PRE_CLASS_ACTIVITIES: &str = "🎓 Pre-class Activities";

/// In-class section headings.
const LEARNING_OBJECTIVES: &str = "🧠 Learning Objectives";
const MATERIALS_NEEDED: &str = "🛠️ Materials Needed";
const CLASS_ACTIVITIES: &str = "🎯 Class Activities";
const ASSESSMENT_METHODS: &str = "📝 Assessment Methods";
const IN_CLASS_SUMMARY: &str = "📌 Summary";

/// Post-class section headings.
const QUIZ: &str = "❓ Quiz";
const POST_CLASS_SUMMARY: &str = "📚 Summary";

/// Renders lesson content shapes to Markdown.
///
/// The rendering is a pure function of its input: the same content always
/// produces the same bytes.
#[derive(Debug, Default)]
pub struct MarkdownGenerator {
    blocks: Vec<String>,
}

impl MarkdownGenerator {
    /// Renders pre-class content.
    ///
    /// Sections: Overview, Key Concepts, Short Example, Pre-class Reading
    /// Materials, Pre-class Activities.
    #[must_use]
    pub fn pre_class(content: &PreClassContent) -> String {
        let mut generator = Self::default();

        generator.write_section(OVERVIEW);
        generator.write_text(&content.overview);

        generator.write_section(KEY_CONCEPTS);
        generator.write_bullets(&content.key_concepts);

        generator.write_section(SHORT_EXAMPLE);
        generator.write_text(&content.short_example);

        generator.write_section(READING_MATERIALS);
        generator.write_bullets(&content.pre_class_reading_materials);

        generator.write_section(PRE_CLASS_ACTIVITIES);
        for activity in &content.pre_class_activities {
            generator.write_pre_class_activity(activity);
        }

        generator.finish()
    }

    /// Renders in-class content.
    ///
    /// Sections: Learning Objectives, Materials Needed, Class Activities,
    /// Assessment Methods, Summary.
    #[must_use]
    pub fn in_class(content: &InClassContent) -> String {
        let mut generator = Self::default();

        generator.write_section(LEARNING_OBJECTIVES);
        generator.write_bullets(&content.learning_objectives);

        generator.write_section(MATERIALS_NEEDED);
        generator.write_bullets(&content.materials_needed);

        generator.write_section(CLASS_ACTIVITIES);
        for activity in &content.class_activities {
            generator.write_class_activity(activity);
        }

        generator.write_section(ASSESSMENT_METHODS);
        generator.write_bullets(&content.assessment_methods);

        generator.write_section(IN_CLASS_SUMMARY);
        generator.write_text(&content.summary);

        generator.finish()
    }

    /// Renders post-class content.
    ///
    /// Sections: Quiz, Summary. Answers are printed as given; they are not
    /// checked against the options.
    #[must_use]
    pub fn post_class(content: &PostClassContent) -> String {
        let mut generator = Self::default();

        generator.write_section(QUIZ);
        for question in &content.quiz {
            generator.write_quiz_question(question);
        }

        generator.write_section(POST_CLASS_SUMMARY);
        generator.write_text(&content.summary);

        generator.finish()
    }

    /// Writes a `##` heading, separated by a blank line from earlier content.
    fn write_section(&mut self, title: &str) {
        if self.blocks.is_empty() {
            self.blocks.push(format!("## {title}"));
        } else {
            self.blocks.push(format!("\n## {title}"));
        }
    }

    fn write_subsection(&mut self, title: &str) {
        self.blocks.push(format!("\n### {title}"));
    }

    fn write_text(&mut self, text: &str) {
        self.blocks.push(text.to_string());
    }

    fn write_bullets(&mut self, items: &[String]) {
        self.blocks
            .extend(items.iter().map(|item| format!("- {item}")));
    }

    fn write_pre_class_activity(&mut self, activity: &PreClassActivity) {
        self.write_subsection(&activity.activity_title);
        self.blocks
            .push(format!("\n**Description:** {}", activity.description));
        self.blocks
            .push(format!("\n**Instructions:** {}", activity.instructions));
    }

    fn write_class_activity(&mut self, activity: &ClassActivity) {
        self.write_subsection(&activity.activity_title);
        self.blocks
            .push(format!("**Duration:** {}", activity.duration));
        self.blocks
            .push(format!("\n**Description:** {}", activity.description));
        self.blocks.push(format!(
            "\n**Teaching Script:**\n{}",
            activity.teaching_script
        ));
    }

    fn write_quiz_question(&mut self, question: &QuizQuestion) {
        self.write_subsection(&question.question);
        self.write_bullets(&question.options);
        self.blocks.push(format!("\n**Answer:** {}", question.answer));
    }

    fn finish(self) -> String {
        self.blocks.join("\n")
    }
}
