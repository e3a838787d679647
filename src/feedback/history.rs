use crate::feedback::FeedbackEntry;

#[derive(Debug, Clone, Default)]
pub struct ValidationHistory {
    entries: Vec<FeedbackEntry>,
}

impl ValidationHistory {
    pub fn push(&mut self, entry: FeedbackEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FeedbackEntry] {
        &self.entries
    }

    pub fn mean_human_rating(&self) -> Option<f64> {
        if self.entries.is_empty() {
            return None;
        }
        let total: f64 = self.entries.iter().map(|e| e.human_rating).sum();
        Some(total / self.entries.len() as f64)
    }

    /// Character count of the longest stored output.
    pub fn longest_output(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.output.chars().count())
            .max()
            .unwrap_or(0)
    }
}

impl Extend<FeedbackEntry> for ValidationHistory {
    fn extend<T: IntoIterator<Item = FeedbackEntry>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}
