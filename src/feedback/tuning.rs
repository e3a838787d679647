use serde::{Deserialize, Serialize};

use crate::feedback::ValidationHistory;

/// The two sampling knobs human feedback is allowed to move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HyperParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl HyperParams {
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }

    /// Apply `policy` to the ratings collected so far. Returns whether
    /// either value changed.
    pub fn tune(&mut self, history: &ValidationHistory, policy: &TuningPolicy) -> bool {
        if history.len() < policy.min_samples {
            return false;
        }
        let before = *self;

        if let Some(mean) = history.mean_human_rating() {
            if mean < policy.low_mark {
                self.temperature =
                    (self.temperature - policy.temperature_step).max(policy.temperature_floor);
            } else if mean > policy.high_mark {
                self.temperature =
                    (self.temperature + policy.temperature_step).min(policy.temperature_ceiling);
            }
        }

        let limit = policy.length_ratio * f64::from(self.max_tokens);
        if history.longest_output() as f64 > limit {
            self.max_tokens = self
                .max_tokens
                .saturating_add(policy.token_step)
                .min(policy.token_ceiling);
        }

        *self != before
    }
}

/// Thresholds of the feedback rule.
///
/// With at least `min_samples` ratings: a mean human rating below
/// `low_mark` cools the temperature by one step, above `high_mark` warms it,
/// and any stored output longer (in characters) than `length_ratio` of the
/// token budget grows the budget by `token_step`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TuningPolicy {
    pub min_samples: usize,
    pub low_mark: f64,
    pub high_mark: f64,
    pub temperature_step: f32,
    pub temperature_floor: f32,
    pub temperature_ceiling: f32,
    pub length_ratio: f64,
    pub token_step: u32,
    pub token_ceiling: u32,
}

impl TuningPolicy {
    pub const fn validator() -> Self {
        Self {
            min_samples: 5,
            low_mark: 3.0,
            high_mark: 4.0,
            temperature_step: 0.05,
            temperature_floor: 0.3,
            temperature_ceiling: 1.0,
            length_ratio: 0.9,
            token_step: 50,
            token_ceiling: 1024,
        }
    }

    pub const fn article_writer() -> Self {
        Self {
            token_step: 100,
            token_ceiling: 2048,
            ..Self::validator()
        }
    }
}

impl Default for TuningPolicy {
    fn default() -> Self {
        Self::validator()
    }
}
