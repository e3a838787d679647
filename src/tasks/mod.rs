mod chatbot;
mod sanitize;
mod summarize;
mod write_article;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::{
    chatbot::ChatbotAgent,
    sanitize::{SanitizeDataTool, PHI_PLACEHOLDERS},
    summarize::SummarizeTool,
    write_article::WriteArticleTool,
};

/// The three text tasks that go through validation and feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Summarize,
    WriteArticle,
    Sanitize,
}

impl TaskKind {
    pub const ALL: [TaskKind; 3] = [TaskKind::Summarize, TaskKind::WriteArticle, TaskKind::Sanitize];

    /// Key of this task's list in the feedback file.
    pub fn section(self) -> &'static str {
        match self {
            TaskKind::Summarize => "summarize",
            TaskKind::WriteArticle => "write_article",
            TaskKind::Sanitize => "sanitize",
        }
    }

    /// Name of the field holding the generated text in a feedback record.
    pub fn output_key(self) -> &'static str {
        match self {
            TaskKind::Summarize => "summary",
            TaskKind::WriteArticle => "refined",
            TaskKind::Sanitize => "sanitized",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section())
    }
}
