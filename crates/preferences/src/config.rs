//! Configuration for the preference store.

use data_loader::StarRating;
use serde::{Deserialize, Serialize};

/// Lowest accepted star rating
pub const MIN_RATING: StarRating = 1;

/// Highest accepted star rating
pub const MAX_RATING: StarRating = 5;

/// Default number of entries kept in the watch history
pub const DEFAULT_HISTORY_CAP: usize = 50;

/// What `rate_movie` does with a rating outside 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingPolicy {
    /// Store the value as given
    Accept,
    /// Fail with `PreferenceError::InvalidArgument`
    #[default]
    Reject,
    /// Store the nearest value in 1..=5
    Clamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceConfig {
    /// Maximum watch-history length; oldest entries are dropped beyond it
    pub history_cap: usize,
    pub rating_policy: RatingPolicy,
}

impl PreferenceConfig {
    pub fn with_history_cap(mut self, cap: usize) -> Self {
        self.history_cap = cap;
        self
    }

    pub fn with_rating_policy(mut self, policy: RatingPolicy) -> Self {
        self.rating_policy = policy;
        self
    }
}

impl Default for PreferenceConfig {
    fn default() -> Self {
        Self {
            history_cap: DEFAULT_HISTORY_CAP,
            rating_policy: RatingPolicy::default(),
        }
    }
}
