use serde::{Deserialize, Serialize};

use crate::error::{Result, SocialError};

/// Default number of buckets in the user directory.
pub const DEFAULT_BUCKET_COUNT: usize = 100;
/// Default number of items a single ranking pass may hold.
pub const DEFAULT_HEAP_CAPACITY: usize = 1000;

/// Tunables of a social network session.
///
/// Every ranking heap is built fresh per request with `heap_capacity` slots, so raising it costs
/// memory only while a feed or a suggestion list is being produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Number of chains in the username directory.
    pub bucket_count: usize,
    /// Maximum number of items held by one ranking pass. Further inserts are dropped.
    pub heap_capacity: usize,
    /// Interest suggestions keep candidates whose affinity distance is strictly below this value.
    pub suggestion_max_distance: f64,
    /// Weight of `1 - edge weight` in a post's priority.
    pub affinity_weight: f64,
    /// Weight of `ln(1 + popularity)` of the author in a post's priority.
    pub popularity_weight: f64,
    /// Weight of `1 / (1 + k)` where `k` is the post's position in its author's list.
    pub recency_weight: f64,
    /// Friendliness at or above this value is categorised as "Social butterfly".
    pub butterfly_threshold: f64,
    /// Friendliness at or above this value is categorised as "Friendly".
    pub friendly_threshold: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            bucket_count: DEFAULT_BUCKET_COUNT,
            heap_capacity: DEFAULT_HEAP_CAPACITY,
            suggestion_max_distance: 0.75,
            affinity_weight: 1.0,
            popularity_weight: 0.1,
            recency_weight: 1.0,
            butterfly_threshold: 0.5,
            friendly_threshold: 0.2,
        }
    }
}

impl NetworkConfig {
    pub fn new(bucket_count: usize, heap_capacity: usize, suggestion_max_distance: f64) -> Self {
        NetworkConfig {
            bucket_count,
            heap_capacity,
            suggestion_max_distance,
            ..NetworkConfig::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.bucket_count == 0 {
            return Err(SocialError::InvalidConfig(
                "bucket_count must be greater than zero".to_string(),
            ));
        }
        if self.heap_capacity == 0 {
            return Err(SocialError::InvalidConfig(
                "heap_capacity must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.suggestion_max_distance) {
            return Err(SocialError::InvalidConfig(format!(
                "suggestion_max_distance must lie in [0, 1], got {}",
                self.suggestion_max_distance
            )));
        }
        for (name, weight) in [
            ("affinity_weight", self.affinity_weight),
            ("popularity_weight", self.popularity_weight),
            ("recency_weight", self.recency_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(SocialError::InvalidConfig(format!(
                    "{} must be finite and not negative, got {}",
                    name, weight
                )));
            }
        }
        for (name, threshold) in [
            ("friendly_threshold", self.friendly_threshold),
            ("butterfly_threshold", self.butterfly_threshold),
        ] {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(SocialError::InvalidConfig(format!(
                    "{} must lie in [0, 1], got {}",
                    name, threshold
                )));
            }
        }
        if self.friendly_threshold > self.butterfly_threshold {
            return Err(SocialError::InvalidConfig(
                "friendly_threshold must not exceed butterfly_threshold".to_string(),
            ));
        }
        Ok(())
    }
}
