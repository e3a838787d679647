//! Plain-text reports handed to the user after a rated run.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::{
    feedback::average_rating,
    tasks::TaskKind,
    templates::{ClockSource, Template, FILE_STAMP_FORMAT},
};

const REPORT_TEMPLATE: &str = "{{title}}
Generated on: {{generated_on}}
{{rule}}

{{original_heading}}
{{original}}

{{rule}}
{{output_heading}}
{{output}}

{{rule}}
🔍 VALIDATION REPORT:
{{validation}}

{{rule}}
📊 RATINGS:
🤖 AI Rating     : {{ai_rating}} / 5
🧠 Human Rating  : {{human_rating}} / 5
📈 Average Rating: {{average}} / 5
";

const IMPROVED_TEMPLATE: &str = "\n{{rule}}\n{{improved_heading}}\n{{improved}}\n";

/// Shortest form that reads back as the same value, keeping at least one
/// decimal: `3.0`, `4.25`.
pub fn format_rating(rating: f64) -> String {
    let text = rating.to_string();
    if text.contains(['.', 'e', 'N', 'i']) {
        text
    } else {
        format!("{text}.0")
    }
}

struct Headings {
    title: &'static str,
    original: &'static str,
    output: &'static str,
    improved: &'static str,
    file_prefix: &'static str,
}

fn headings(kind: TaskKind) -> Headings {
    match kind {
        TaskKind::Summarize => Headings {
            title: "🧾 MEDICAL SUMMARY REPORT",
            original: "📄 ORIGINAL TEXT:",
            output: "📝 FINAL SUMMARY:",
            improved: "✨ IMPROVED SUMMARY OUTPUT:",
            file_prefix: "summary",
        },
        TaskKind::Sanitize => Headings {
            title: "🛡 SANITIZED DATA REPORT",
            original: "📄 ORIGINAL DATA:",
            output: "🔒 SANITIZED OUTPUT:",
            improved: "✨ IMPROVED SANITIZED OUTPUT:",
            file_prefix: "sanitized",
        },
        TaskKind::WriteArticle => Headings {
            title: "📝 RESEARCH ARTICLE REPORT",
            original: "🧾 ORIGINAL ARTICLE:",
            output: "✍️ REFINED ARTICLE:",
            improved: "✨ IMPROVED ARTICLE:",
            file_prefix: "article",
        },
    }
}

/// Everything that goes into one downloadable report.
#[derive(Debug, Clone)]
pub struct Report {
    pub kind: TaskKind,
    pub original: String,
    pub output: String,
    pub validation: String,
    pub ai_rating: u8,
    pub human_rating: f64,
    pub improved: Option<String>,
    clock: ClockSource,
}

impl Report {
    pub fn new<O, P, V>(
        kind: TaskKind,
        original: O,
        output: P,
        validation: V,
        ai_rating: u8,
        human_rating: f64,
    ) -> Self
    where
        O: Into<String>,
        P: Into<String>,
        V: Into<String>,
    {
        Self {
            kind,
            original: original.into(),
            output: output.into(),
            validation: validation.into(),
            ai_rating,
            human_rating,
            improved: None,
            clock: ClockSource::now(),
        }
    }

    pub fn with_improved<T: Into<String>>(mut self, improved: T) -> Self {
        self.improved = Some(improved.into());
        self
    }

    /// Pin the timestamp used in the body and the file name.
    pub fn with_clock(mut self, clock: ClockSource) -> Self {
        self.clock = clock;
        self
    }

    pub fn average(&self) -> f64 {
        average_rating(self.ai_rating, self.human_rating)
    }

    pub fn render(&self) -> String {
        let h = headings(self.kind);
        let rule = "=".repeat(60);
        let ai_rating = self.ai_rating.to_string();
        let human_rating = format_rating(self.human_rating);
        let average = format_rating(self.average());

        let mut report = Template::new(REPORT_TEMPLATE, self.clock.clone()).render([
            ("title", h.title),
            ("rule", rule.as_str()),
            ("original_heading", h.original),
            ("original", self.original.trim()),
            ("output_heading", h.output),
            ("output", self.output.trim()),
            ("validation", self.validation.trim()),
            ("ai_rating", ai_rating.as_str()),
            ("human_rating", human_rating.as_str()),
            ("average", average.as_str()),
        ]);

        if let Some(improved) = self.improved.as_deref().filter(|i| !i.trim().is_empty()) {
            report.push_str(&Template::simple(IMPROVED_TEMPLATE).render([
                ("rule", rule.as_str()),
                ("improved_heading", h.improved),
                ("improved", improved.trim()),
            ]));
        }
        report
    }

    pub fn file_name(&self) -> String {
        format!(
            "{}_report_{}.txt",
            headings(self.kind).file_prefix,
            self.clock.instant().format(FILE_STAMP_FORMAT)
        )
    }

    /// Write the report into `dir`, creating it if needed. Returns the file path.
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> io::Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        fs::write(&path, self.render())?;
        info!(path = %path.display(), kind = %self.kind, "report written");
        Ok(path)
    }
}

/// Processed text and its validation in one plain-text blob.
pub fn combined_results(processed: &str, validation: &str) -> String {
    format!("=== Processed Text ===\n{processed}\n\n=== Validation Report ===\n{validation}")
}
