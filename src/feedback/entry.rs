use serde_json::{json, Map, Value};

use crate::tasks::TaskKind;

/// Rating assumed when the user does not give one.
pub const DEFAULT_HUMAN_RATING: f64 = 3.0;

/// One rated output.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackEntry {
    pub original: String,
    pub output: String,
    pub ai_rating: u8,
    pub human_rating: f64,
    pub validation: Option<String>,
}

impl FeedbackEntry {
    pub fn new<O, P>(original: O, output: P, ai_rating: u8, human_rating: f64) -> Self
    where
        O: Into<String>,
        P: Into<String>,
    {
        Self {
            original: original.into(),
            output: output.into(),
            ai_rating,
            human_rating,
            validation: None,
        }
    }

    pub fn with_validation<T: Into<String>>(mut self, validation: T) -> Self {
        self.validation = Some(validation.into());
        self
    }

    /// Mean of the two ratings, rounded to one decimal.
    pub fn average(&self) -> f64 {
        average_rating(self.ai_rating, self.human_rating)
    }

    /// File record; the output field is named after the task
    /// (`summary`, `refined` or `sanitized`).
    pub fn to_record(&self, kind: TaskKind) -> Value {
        let mut record = Map::new();
        record.insert("original".into(), json!(self.original));
        record.insert(kind.output_key().into(), json!(self.output));
        record.insert("ai_rating".into(), json!(self.ai_rating));
        record.insert("human_rating".into(), json!(self.human_rating));
        if let Some(validation) = &self.validation {
            record.insert("validation".into(), json!(validation));
        }
        Value::Object(record)
    }

    /// Read a record back. Records missing a field are skipped by returning `None`.
    pub fn from_record(kind: TaskKind, record: &Value) -> Option<Self> {
        let original = record.get("original")?.as_str()?;
        let output = record.get(kind.output_key())?.as_str()?;
        let ai_rating = record.get("ai_rating")?.as_f64()?;
        let human_rating = record.get("human_rating")?.as_f64()?;
        let validation = record
            .get("validation")
            .and_then(Value::as_str)
            .map(str::to_string);

        Some(Self {
            original: original.to_string(),
            output: output.to_string(),
            ai_rating: ai_rating.round().clamp(1.0, 5.0) as u8,
            human_rating,
            validation,
        })
    }
}

/// Mean of both ratings to one decimal, halves going to the even digit.
pub fn average_rating(ai_rating: u8, human_rating: f64) -> f64 {
    let mean = (f64::from(ai_rating) + human_rating) / 2.0;
    (mean * 10.0).round_ties_even() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_rounds_to_one_decimal() {
        assert_eq!(average_rating(4, 3.5), 3.8);
        assert_eq!(average_rating(3, 3.0), 3.0);
        assert_eq!(average_rating(2, 4.5), 3.2);
        assert_eq!(average_rating(3, 1.5), 2.2);
        assert_eq!(average_rating(5, 4.0), 4.5);
        assert_eq!(average_rating(1, 1.0), 1.0);
    }

    #[test]
    fn record_uses_task_specific_output_key() {
        let entry = FeedbackEntry::new("raw", "clean", 4, 5.0).with_validation("Rating: 4");
        let record = entry.to_record(TaskKind::Sanitize);
        assert_eq!(
            record,
            json!({
                "original": "raw",
                "sanitized": "clean",
                "ai_rating": 4,
                "human_rating": 5.0,
                "validation": "Rating: 4"
            })
        );
        assert_eq!(FeedbackEntry::from_record(TaskKind::Sanitize, &record), Some(entry));
    }

    #[test]
    fn record_for_another_task_does_not_parse() {
        let record = FeedbackEntry::new("a", "b", 3, 3.0).to_record(TaskKind::Summarize);
        assert!(FeedbackEntry::from_record(TaskKind::WriteArticle, &record).is_none());
    }
}
