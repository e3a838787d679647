//! Human ratings: the in-memory history each agent tunes from, and the
//! JSON file that keeps every rating across runs.

mod entry;
mod history;
mod store;
mod tuning;

pub use self::{
    entry::{average_rating, FeedbackEntry, DEFAULT_HUMAN_RATING},
    history::ValidationHistory,
    store::{FeedbackSections, FeedbackStore, FeedbackStoreError, SectionStats, DEFAULT_FEEDBACK_FILE},
    tuning::{HyperParams, TuningPolicy},
};
