//! Reviews repo, presents CRUD operations with reviews
use failure::Error as FailureError;

use errors::Error;
use models::*;
use repos::types::{RepoResult, Storage};

/// Search reviews, results are ordered by creation time
#[derive(Clone, Debug)]
pub enum ReviewSearch {
    Technician(UserId),
    Author(UserId),
    AuthorAndTechnician(UserId, UserId),
    Report(ReportId),
}

impl ReviewSearch {
    fn matches(&self, review: &Review) -> bool {
        match *self {
            ReviewSearch::Technician(technician_id) => review.technician_id() == technician_id,
            ReviewSearch::Author(user_id) => review.user_id() == user_id,
            ReviewSearch::AuthorAndTechnician(user_id, technician_id) => {
                review.user_id() == user_id && review.technician_id() == technician_id
            }
            ReviewSearch::Report(report_id) => review.report_id() == Some(report_id),
        }
    }
}

pub struct ReviewsRepoImpl {
    pub storage: Storage,
    pub user_id: Option<UserId>,
}

pub trait ReviewsRepo {
    /// Creates new review, an author reviews a technician and a report at most once
    fn create(&self, review: Review) -> RepoResult<Review>;

    /// Get review
    fn get(&self, review_id: ReviewId) -> RepoResult<Option<Review>>;

    /// List all reviews
    fn list(&self) -> RepoResult<Vec<Review>>;

    /// Search reviews
    fn find_by(&self, search: ReviewSearch) -> RepoResult<Vec<Review>>;

    /// Update review
    fn update(&self, review: Review) -> RepoResult<Review>;

    /// Delete review
    fn delete(&self, review_id: ReviewId) -> RepoResult<Option<Review>>;
}

impl ReviewsRepoImpl {
    pub fn new(storage: Storage, user_id: Option<UserId>) -> Self {
        Self { storage, user_id }
    }

    fn collect<P: Fn(&Review) -> bool>(&self, predicate: P) -> RepoResult<Vec<Review>> {
        let tables = self.storage.lock()?;
        let mut reviews: Vec<Review> = tables.reviews.values().filter(|r| predicate(r)).cloned().collect();
        reviews.sort_by_key(|r| r.created_at());
        Ok(reviews)
    }
}

impl ReviewsRepo for ReviewsRepoImpl {
    fn create(&self, review: Review) -> RepoResult<Review> {
        debug!("User {:?} creates review {:?}.", self.user_id, review);
        let mut tables = self.storage.lock()?;
        let duplicate = tables.reviews.values().find_map(|stored| {
            if stored.user_id() != review.user_id() {
                None
            } else if stored.technician_id() == review.technician_id() {
                Some("You have already reviewed this technician")
            } else if review.report_id().is_some() && stored.report_id() == review.report_id() {
                Some("You have already reviewed this report")
            } else {
                None
            }
        });
        if let Some(message) = duplicate {
            return Err(FailureError::from(Error::IllegalState(message.to_string()))
                .context(format!("Create review by user {} error occurred", review.user_id()))
                .into());
        }
        tables.reviews.insert(review.id(), review.clone());
        Ok(review)
    }

    fn get(&self, review_id: ReviewId) -> RepoResult<Option<Review>> {
        debug!("Find review with id {}.", review_id);
        let tables = self.storage.lock()?;
        Ok(tables.reviews.get(&review_id).cloned())
    }

    fn list(&self) -> RepoResult<Vec<Review>> {
        debug!("Find all reviews.");
        self.collect(|_| true)
    }

    fn find_by(&self, search: ReviewSearch) -> RepoResult<Vec<Review>> {
        debug!("Get reviews by search: {:?}.", search);
        self.collect(|r| search.matches(r))
    }

    fn update(&self, review: Review) -> RepoResult<Review> {
        debug!("Updating review {:?}.", review);
        let mut tables = self.storage.lock()?;
        match tables.reviews.get_mut(&review.id()) {
            Some(stored) => {
                *stored = review.clone();
                Ok(review)
            }
            None => Err(FailureError::from(Error::NotFound)
                .context(format!("Update review with id {} error occurred", review.id()))
                .into()),
        }
    }

    fn delete(&self, review_id: ReviewId) -> RepoResult<Option<Review>> {
        debug!("User {:?} deletes review {}.", self.user_id, review_id);
        let mut tables = self.storage.lock()?;
        Ok(tables.reviews.remove(&review_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(user_id: UserId, technician_id: UserId, report_id: Option<ReportId>) -> Review {
        let payload = NewReview {
            technician_id: Some(technician_id),
            user_id: Some(user_id),
            report_id,
            rating: 4,
            comment: Some("Arrived on time and fixed it".to_string()),
        };
        Review::new(payload, &DefaultReviewValidation::default()).unwrap()
    }

    #[test]
    fn test_create_keeps_one_review_per_technician() {
        let repo = ReviewsRepoImpl::new(Storage::new(), None);
        let author = UserId::new();
        let technician = UserId::new();

        repo.create(review(author, technician, None)).unwrap();
        let e = repo.create(review(author, technician, None)).unwrap_err();
        assert_eq!(e.to_string(), format!("Create review by user {} error occurred", author));
        assert_eq!(repo.list().unwrap().len(), 1);

        repo.create(review(UserId::new(), technician, None)).unwrap();
        assert_eq!(repo.find_by(ReviewSearch::Technician(technician)).unwrap().len(), 2);
    }

    #[test]
    fn test_create_keeps_one_review_per_report() {
        let repo = ReviewsRepoImpl::new(Storage::new(), None);
        let author = UserId::new();
        let report_id = ReportId::new();

        repo.create(review(author, UserId::new(), Some(report_id))).unwrap();
        assert!(repo.create(review(author, UserId::new(), Some(report_id))).is_err());
        assert_eq!(repo.find_by(ReviewSearch::Report(report_id)).unwrap().len(), 1);
    }
}
