//! Reviews and ratings.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::ReviewId;
use super::timestamp::Timestamp;
use super::user::UserProfile;

/// Errors constructing a [`Rating`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating must be between {min} and {max} (got {value})", min = Rating::MIN, max = Rating::MAX)]
pub struct RatingError {
    /// The rejected value.
    pub value: i64,
}

/// A star rating, 1 through 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// # Errors
    ///
    /// Returns [`RatingError`] when `value` is outside `1..=5`.
    pub fn new(value: i64) -> Result<Self, RatingError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RatingError { value })
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for Rating {
    /// New review forms start at the top score.
    fn default() -> Self {
        Self(Self::MAX)
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A review as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub rating: Rating,
    #[serde(default)]
    pub comment: Option<String>,
    /// Author of the review.
    pub user: UserProfile,
    pub timestamp: Timestamp,
}

/// Body of `POST /ebooks/{id}/reviews`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    pub rating: Rating,
    pub comment: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert_eq!(Rating::new(1).unwrap().get(), 1);
        assert_eq!(Rating::new(5).unwrap().get(), 5);
        assert_eq!(Rating::new(6), Err(RatingError { value: 6 }));
        assert!(Rating::new(-3).is_err());
    }

    #[test]
    fn test_rating_rejects_out_of_range_json() {
        assert!(serde_json::from_str::<Rating>("9").is_err());
        assert_eq!(serde_json::from_str::<Rating>("4").unwrap().get(), 4);
    }

    #[test]
    fn test_rating_error_message() {
        assert_eq!(
            RatingError { value: 7 }.to_string(),
            "rating must be between 1 and 5 (got 7)"
        );
    }

    #[test]
    fn test_review_from_backend_json() {
        let json = r#"{
            "id": 10,
            "rating": 5,
            "comment": "Great book",
            "user": {"id": 2, "name": "Sari", "email": "sari@example.com", "role": "user"},
            "timestamp": "2025-01-02T03:04:05"
        }"#;
        let review: Review = serde_json::from_str(json).unwrap();
        assert_eq!(review.rating.get(), 5);
        assert_eq!(review.user.name, "Sari");
    }
}
