//! Rating aggregation for catalog entities (templates and capabilities).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::error::{ValidationError, ValidationResult};

/// Closed interval every individual rating must fall in. Fractions such as
/// `3.5` are allowed.
pub const RATING_RANGE: RangeInclusive<f64> = 1.0..=5.0;

/// Check a raw rating against [`RATING_RANGE`].
pub fn validate_rating(raw: f64) -> ValidationResult<f64> {
    if raw.is_finite() && RATING_RANGE.contains(&raw) {
        return Ok(raw);
    }
    Err(ValidationError::OutOfRange {
        field: "rating".to_string(),
        min: *RATING_RANGE.start() as i64,
        max: *RATING_RANGE.end() as i64,
    })
}

/// Stored ratings for one catalog entity.
///
/// Ratings from a known user replace that user's previous rating; anonymous
/// ratings accumulate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingBook {
    #[serde(default)]
    pub by_user: BTreeMap<String, f64>,
    #[serde(default)]
    pub anonymous: Vec<f64>,
}

impl RatingBook {
    /// Record a rating that has already passed [`validate_rating`].
    pub fn record(&mut self, user_id: Option<&str>, rating: f64) {
        match user_id.map(str::trim).filter(|u| !u.is_empty()) {
            Some(user) => {
                self.by_user.insert(user.to_string(), rating);
            }
            None => self.anonymous.push(rating),
        }
    }

    pub fn count(&self) -> u64 {
        (self.by_user.len() + self.anonymous.len()) as u64
    }

    /// Mean of all stored ratings, `0.0` when nothing has been rated.
    pub fn average(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            return 0.0;
        }
        let total: f64 = self.by_user.values().chain(self.anonymous.iter()).sum();
        total / count as f64
    }
}
