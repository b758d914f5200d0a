//! Model reviews
use chrono::{DateTime, Duration, Utc};
use failure::Error as FailureError;

use config::Reviews as ReviewsConfig;
use errors::Error;
use models::types::{ReportId, ReviewId, UserId};
use models::validation_rules::*;

/// Rating and comment left by a customer about a technician
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Review {
    id: ReviewId,
    rating: i32,
    comment: String,
    technician_id: UserId,
    user_id: UserId,
    report_id: Option<ReportId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Payload for creating review
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct NewReview {
    pub technician_id: Option<UserId>,
    pub user_id: Option<UserId>,
    pub report_id: Option<ReportId>,
    pub rating: i32,
    pub comment: Option<String>,
}

/// Payload for updating review
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UpdateReview {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

/// Checks review fields and reports the first violation found.
pub trait ReviewValidationStrategy {
    fn validate(&self, review: &NewReview) -> Result<(), FailureError>;
}

/// Checks in order: rating, blank comment, comment length, technician, author.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultReviewValidation {
    pub min_comment_length: usize,
    pub max_comment_length: usize,
}

impl Default for DefaultReviewValidation {
    fn default() -> Self {
        Self {
            min_comment_length: 10,
            max_comment_length: 5000,
        }
    }
}

impl DefaultReviewValidation {
    pub fn from_config(config: &ReviewsConfig) -> Self {
        Self {
            min_comment_length: config.min_comment_length,
            max_comment_length: config.max_comment_length,
        }
    }
}

impl ReviewValidationStrategy for DefaultReviewValidation {
    fn validate(&self, review: &NewReview) -> Result<(), FailureError> {
        validate_rating(review.rating).map_err(|e| Error::invalid("rating", e))?;

        let comment = review.comment.as_ref().map(|c| c.as_str()).unwrap_or("");
        validate_not_blank(comment).map_err(|_| {
            Error::Validate(validation_errors!({
                "comment": ["blank" => "Comment cannot be blank"]
            }))
        })?;
        validate_comment_length(comment, self.min_comment_length, self.max_comment_length)
            .map_err(|e| Error::invalid("comment", e))?;

        if review.technician_id.is_none() {
            return Err(Error::Validate(validation_errors!({
                "technician_id": ["required" => "Technician id cannot be null"]
            })).into());
        }
        if review.user_id.is_none() {
            return Err(Error::Validate(validation_errors!({
                "user_id": ["required" => "User id cannot be null"]
            })).into());
        }

        Ok(())
    }
}

impl Review {
    /// Validates payload and stamps both timestamps with the current time
    pub fn new(payload: NewReview, strategy: &ReviewValidationStrategy) -> Result<Self, FailureError> {
        strategy.validate(&payload)?;

        match (payload.technician_id, payload.user_id, payload.comment) {
            (Some(technician_id), Some(user_id), Some(comment)) => {
                let now = Utc::now();
                Ok(Self {
                    id: ReviewId::new(),
                    rating: payload.rating,
                    comment,
                    technician_id,
                    user_id,
                    report_id: payload.report_id,
                    created_at: now,
                    updated_at: now,
                })
            }
            _ => Err(Error::IllegalState("Review payload is incomplete".to_string()).into()),
        }
    }

    pub fn id(&self) -> ReviewId {
        self.id
    }

    pub fn rating(&self) -> i32 {
        self.rating
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn technician_id(&self) -> UserId {
        self.technician_id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn report_id(&self) -> Option<ReportId> {
        self.report_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether the review may still be changed at `now`, window end inclusive
    pub fn is_editable(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now.signed_duration_since(self.created_at) <= window
    }

    /// Applies payload after validating the resulting review; leaves it untouched on failure
    pub fn apply(&mut self, payload: UpdateReview, strategy: &ReviewValidationStrategy) -> Result<(), FailureError> {
        let candidate = NewReview {
            technician_id: Some(self.technician_id),
            user_id: Some(self.user_id),
            report_id: self.report_id,
            rating: payload.rating.unwrap_or(self.rating),
            comment: Some(payload.comment.unwrap_or_else(|| self.comment.clone())),
        };
        strategy.validate(&candidate)?;

        self.rating = candidate.rating;
        if let Some(comment) = candidate.comment {
            self.comment = comment;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn set_created_at(&mut self, created_at: DateTime<Utc>) {
        self.created_at = created_at;
    }
}

#[cfg(test)]
mod tests {
    use std::iter;

    use errors::tests::violation;

    use super::*;

    fn text(len: usize) -> String {
        iter::repeat('x').take(len).collect()
    }

    fn payload(rating: i32, comment: &str) -> NewReview {
        NewReview {
            technician_id: Some(UserId::new()),
            user_id: Some(UserId::new()),
            report_id: None,
            rating,
            comment: Some(comment.to_string()),
        }
    }

    fn check(review: &NewReview) -> Result<(), FailureError> {
        DefaultReviewValidation::default().validate(review)
    }

    #[test]
    fn test_rating_out_of_range() {
        for rating in &[0, 6, -1] {
            let e = check(&payload(*rating, "Fixed the sink quickly")).unwrap_err();
            let (code, message) = violation(&e, "rating").unwrap();
            assert_eq!(code, "range");
            assert_eq!(message, "Rating must be between 1 and 5");
        }
    }

    #[test]
    fn test_comment_length_boundaries() {
        assert!(check(&payload(5, &text(10))).is_ok());
        assert!(check(&payload(5, &text(5000))).is_ok());

        for len in &[9, 5001] {
            let e = check(&payload(5, &text(*len))).unwrap_err();
            assert_eq!(violation(&e, "comment").unwrap().0, "length");
        }
    }

    #[test]
    fn test_blank_comment() {
        for comment in &[None, Some(""), Some("          ")] {
            let mut review = payload(4, "");
            review.comment = comment.map(|c| c.to_string());
            let e = check(&review).unwrap_err();
            assert_eq!(violation(&e, "comment").unwrap().0, "blank");
        }
    }

    #[test]
    fn test_missing_ids_have_distinct_messages() {
        let mut review = payload(3, "Good work overall");
        review.technician_id = None;
        let (_, technician_message) = violation(&check(&review).unwrap_err(), "technician_id").unwrap();

        let mut review = payload(3, "Good work overall");
        review.user_id = None;
        let (_, user_message) = violation(&check(&review).unwrap_err(), "user_id").unwrap();

        assert_eq!(technician_message, "Technician id cannot be null");
        assert_eq!(user_message, "User id cannot be null");
    }

    #[test]
    fn test_first_violation_wins() {
        let review = NewReview {
            technician_id: None,
            user_id: None,
            report_id: None,
            rating: 0,
            comment: None,
        };
        let e = check(&review).unwrap_err();
        assert!(violation(&e, "rating").is_some());
        assert!(violation(&e, "comment").is_none());
        assert!(violation(&e, "technician_id").is_none());
    }

    #[test]
    fn test_new_review_stamps_time() {
        let review = Review::new(payload(5, "Arrived on time, great job"), &DefaultReviewValidation::default()).unwrap();
        assert_eq!(review.created_at(), review.updated_at());
        assert!(review.is_editable(Utc::now(), Duration::days(7)));
    }

    #[test]
    fn test_edit_window() {
        let mut review = Review::new(payload(5, "Arrived on time, great job"), &DefaultReviewValidation::default()).unwrap();
        let created_at = Utc::now() - Duration::days(7);
        review.set_created_at(created_at);
        assert!(review.is_editable(created_at + Duration::days(7), Duration::days(7)));
        assert!(!review.is_editable(created_at + Duration::days(7) + Duration::seconds(1), Duration::days(7)));
    }

    #[test]
    fn test_apply_revalidates() {
        let strategy = DefaultReviewValidation::default();
        let mut review = Review::new(payload(5, "Arrived on time, great job"), &strategy).unwrap();

        let e = review
            .apply(
                UpdateReview {
                    rating: Some(2),
                    comment: Some("short".to_string()),
                },
                &strategy,
            )
            .unwrap_err();
        assert_eq!(violation(&e, "comment").unwrap().0, "length");
        assert_eq!(review.rating(), 5);

        review
            .apply(
                UpdateReview {
                    rating: Some(2),
                    comment: None,
                },
                &strategy,
            )
            .unwrap();
        assert_eq!(review.rating(), 2);
        assert_eq!(review.comment(), "Arrived on time, great job");
    }
}
