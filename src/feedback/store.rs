use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{feedback::FeedbackEntry, tasks::TaskKind};

pub const DEFAULT_FEEDBACK_FILE: &str = "feedback_store.json";

#[derive(Debug)]
pub enum FeedbackStoreError {
    Io(io::Error),
    Serialization(serde_json::Error),
    /// The task's section exists but is not a list of records.
    InvalidSection(String),
}

impl std::fmt::Display for FeedbackStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedbackStoreError::Io(e) => write!(f, "Feedback file I/O error: {e}"),
            FeedbackStoreError::Serialization(e) => write!(f, "Feedback file is not valid JSON: {e}"),
            FeedbackStoreError::InvalidSection(name) => {
                write!(f, "Feedback section '{name}' is not a list")
            }
        }
    }
}

impl std::error::Error for FeedbackStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FeedbackStoreError::Io(e) => Some(e),
            FeedbackStoreError::Serialization(e) => Some(e),
            FeedbackStoreError::InvalidSection(_) => None,
        }
    }
}

impl From<io::Error> for FeedbackStoreError {
    fn from(err: io::Error) -> Self {
        FeedbackStoreError::Io(err)
    }
}

impl From<serde_json::Error> for FeedbackStoreError {
    fn from(err: serde_json::Error) -> Self {
        FeedbackStoreError::Serialization(err)
    }
}

/// Top-level sections of the feedback file in file order. Task sections hold
/// a list of records; anything else is carried through untouched.
pub type FeedbackSections = Map<String, Value>;

/// Flat JSON file of `{ "<section>": [record, ...] }`.
///
/// Every append re-reads and rewrites the whole file; one writer at a time.
#[derive(Debug, Clone)]
pub struct FeedbackStore {
    path: PathBuf,
}

impl FeedbackStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or blank file reads as no sections.
    pub fn load(&self) -> Result<FeedbackSections, FeedbackStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(FeedbackSections::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(FeedbackSections::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn append(&self, kind: TaskKind, entry: &FeedbackEntry) -> Result<(), FeedbackStoreError> {
        let mut sections = self.load()?;
        let records = sections
            .entry(kind.section())
            .or_insert_with(|| Value::Array(Vec::new()));
        match records {
            Value::Array(records) => records.push(entry.to_record(kind)),
            _ => return Err(FeedbackStoreError::InvalidSection(kind.section().to_string())),
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&sections)?)?;
        debug!(path = %self.path.display(), section = kind.section(), "feedback appended");
        Ok(())
    }

    /// Records of one task that can be read back; malformed ones are skipped.
    pub fn entries(&self, kind: TaskKind) -> Result<Vec<FeedbackEntry>, FeedbackStoreError> {
        let sections = self.load()?;
        let records = match sections.get(kind.section()) {
            None => return Ok(Vec::new()),
            Some(Value::Array(records)) => records,
            Some(_) => {
                warn!(section = kind.section(), "feedback section is not a list, ignored");
                return Ok(Vec::new());
            }
        };

        let entries: Vec<FeedbackEntry> = records
            .iter()
            .filter_map(|r| FeedbackEntry::from_record(kind, r))
            .collect();
        if entries.len() != records.len() {
            warn!(
                section = kind.section(),
                skipped = records.len() - entries.len(),
                "skipped malformed feedback records"
            );
        }
        Ok(entries)
    }

    pub fn stats(&self) -> Result<Vec<SectionStats>, FeedbackStoreError> {
        TaskKind::ALL
            .into_iter()
            .map(|kind| self.entries(kind).map(|e| SectionStats::from_entries(kind, &e)))
            .collect()
    }
}

impl Default for FeedbackStore {
    fn default() -> Self {
        Self::new(DEFAULT_FEEDBACK_FILE)
    }
}

/// Rating summary of one section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionStats {
    pub kind: TaskKind,
    pub count: usize,
    pub mean_ai_rating: Option<f64>,
    pub mean_human_rating: Option<f64>,
}

impl SectionStats {
    fn from_entries(kind: TaskKind, entries: &[FeedbackEntry]) -> Self {
        let count = entries.len();
        let mean = |f: fn(&FeedbackEntry) -> f64| {
            (count > 0).then(|| entries.iter().map(f).sum::<f64>() / count as f64)
        };
        Self {
            kind,
            count,
            mean_ai_rating: mean(|e| f64::from(e.ai_rating)),
            mean_human_rating: mean(|e| e.human_rating),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeedbackStore::new(dir.path().join("nope.json"));
        assert!(store.load().unwrap().is_empty());
        assert!(store.entries(TaskKind::Summarize).unwrap().is_empty());
    }

    #[test]
    fn append_creates_sections_and_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeedbackStore::new(dir.path().join("feedback_store.json"));

        store
            .append(TaskKind::Summarize, &FeedbackEntry::new("t1", "s1", 4, 4.0))
            .unwrap();
        store
            .append(TaskKind::Summarize, &FeedbackEntry::new("t2", "s2", 2, 1.5))
            .unwrap();
        store
            .append(TaskKind::Sanitize, &FeedbackEntry::new("d1", "x1", 5, 5.0))
            .unwrap();

        let sections = store.load().unwrap();
        assert_eq!(sections["summarize"].as_array().unwrap().len(), 2);
        assert_eq!(sections["summarize"][1]["summary"], json!("s2"));
        assert_eq!(sections["sanitize"][0]["sanitized"], json!("x1"));
        assert!(!sections.contains_key("write_article"));

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\n  \"sanitize\": ["), "expected two-space indent:\n{raw}");
    }

    #[test]
    fn foreign_sections_survive_an_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fb.json");
        fs::write(&path, r#"{"legacy": [{"anything": 1}]}"#).unwrap();

        let store = FeedbackStore::new(&path);
        store
            .append(TaskKind::WriteArticle, &FeedbackEntry::new("a", "b", 3, 3.0))
            .unwrap();

        let sections = store.load().unwrap();
        assert_eq!(sections["legacy"], json!([{"anything": 1}]));
        assert_eq!(sections["write_article"][0]["refined"], json!("b"));
    }

    #[test]
    fn non_list_sections_keep_their_shape_and_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fb.json");
        fs::write(
            &path,
            r#"{"zeta": {"version": 2}, "summarize": [], "alpha": "note"}"#,
        )
        .unwrap();

        let store = FeedbackStore::new(&path);
        store
            .append(TaskKind::Summarize, &FeedbackEntry::new("t", "s", 4, 4.0))
            .unwrap();
        store
            .append(TaskKind::Sanitize, &FeedbackEntry::new("d", "x", 5, 5.0))
            .unwrap();

        let sections = store.load().unwrap();
        let keys: Vec<&str> = sections.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "summarize", "alpha", "sanitize"]);
        assert_eq!(sections["zeta"], json!({"version": 2}));
        assert_eq!(sections["alpha"], json!("note"));
        assert_eq!(sections["summarize"][0]["summary"], json!("s"));
    }

    #[test]
    fn task_section_that_is_not_a_list_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fb.json");
        let original = r#"{"summarize": {"oops": true}}"#;
        fs::write(&path, original).unwrap();

        let store = FeedbackStore::new(&path);
        assert!(store.entries(TaskKind::Summarize).unwrap().is_empty());

        let err = store
            .append(TaskKind::Summarize, &FeedbackEntry::new("a", "b", 3, 3.0))
            .unwrap_err();
        assert!(matches!(err, FeedbackStoreError::InvalidSection(ref s) if s == "summarize"));
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn blank_file_reads_empty_and_accepts_an_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fb.json");
        fs::write(&path, "  \n").unwrap();

        let store = FeedbackStore::new(&path);
        assert!(store.load().unwrap().is_empty());

        store
            .append(TaskKind::Sanitize, &FeedbackEntry::new("d", "x", 5, 5.0))
            .unwrap();
        assert_eq!(store.entries(TaskKind::Sanitize).unwrap().len(), 1);
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn corrupt_file_is_an_error_not_a_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fb.json");
        fs::write(&path, "{ not json").unwrap();

        let store = FeedbackStore::new(&path);
        let err = store
            .append(TaskKind::Summarize, &FeedbackEntry::new("a", "b", 3, 3.0))
            .unwrap_err();
        assert!(matches!(err, FeedbackStoreError::Serialization(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn entries_skip_malformed_records_and_stats_average() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fb.json");
        fs::write(
            &path,
            r#"{"summarize": [
                {"original": "a", "summary": "b", "ai_rating": 4, "human_rating": 3.0},
                {"original": "a"},
                {"original": "c", "summary": "d", "ai_rating": 2, "human_rating": 5.0}
            ]}"#,
        )
        .unwrap();

        let store = FeedbackStore::new(&path);
        assert_eq!(store.entries(TaskKind::Summarize).unwrap().len(), 2);

        let stats = store.stats().unwrap();
        let summarize = stats.iter().find(|s| s.kind == TaskKind::Summarize).unwrap();
        assert_eq!(summarize.count, 2);
        assert_eq!(summarize.mean_ai_rating, Some(3.0));
        assert_eq!(summarize.mean_human_rating, Some(4.0));

        let sanitize = stats.iter().find(|s| s.kind == TaskKind::Sanitize).unwrap();
        assert_eq!(sanitize.count, 0);
        assert_eq!(sanitize.mean_human_rating, None);
    }
}
