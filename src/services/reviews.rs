//! Reviews Services, customers rating technicians

use chrono::{Duration, Utc};

use errors::Error;
use models::*;
use repos::{ReposFactory, ReviewSearch};
use services::types::ServiceResult;
use services::{fail_with, Service};

/// Technician shown to customers picking whom to review
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TechnicianSelection {
    pub id: UserId,
    pub full_name: String,
}

pub trait ReviewsService {
    /// Creates review authored by the acting user
    fn create_review(&self, payload: NewReview) -> ServiceResult<Review>;
    /// Updates review, only its author can do it while the edit window is open
    fn update_review(&self, review_id: ReviewId, payload: UpdateReview) -> ServiceResult<Review>;
    /// Deletes review of the acting user
    fn delete_review(&self, review_id: ReviewId) -> ServiceResult<Review>;
    /// Deletes any review, admins only
    fn delete_review_as_admin(&self, review_id: ReviewId) -> ServiceResult<Review>;
    /// Returns reviews about technician
    fn reviews_for_technician(&self, technician_id: UserId) -> ServiceResult<Vec<Review>>;
    /// Returns reviews written by user
    fn reviews_by_user(&self, user_id: UserId) -> ServiceResult<Vec<Review>>;
    /// Mean rating of technician, 0.0 when nobody has reviewed them yet
    fn average_rating(&self, technician_id: UserId) -> ServiceResult<f64>;
    /// Returns all reviews
    fn list_reviews(&self) -> ServiceResult<Vec<Review>>;
    /// Technicians that can be reviewed
    fn available_technicians(&self) -> ServiceResult<Vec<TechnicianSelection>>;
}

impl<F: ReposFactory> ReviewsService for Service<F> {
    fn create_review(&self, payload: NewReview) -> ServiceResult<Review> {
        let user_id = self.dynamic_context.user_id;
        let reviews_repo = self.static_context.repo_factory.create_reviews_repo(user_id);
        let reports_repo = self.static_context.repo_factory.create_reports_repo(user_id);
        let strategy = self.review_validation();

        self.current_user()
            .and_then(|author| {
                if payload.user_id.map(|id| id != author.id).unwrap_or(false) {
                    return Err(fail_with(Error::Forbidden, "Reviews can only be written on behalf of yourself"));
                }
                let mut payload = payload;
                payload.user_id = Some(author.id);

                if let Some(technician_id) = payload.technician_id {
                    self.technician(technician_id)?;
                }
                if let Some(report_id) = payload.report_id {
                    reports_repo
                        .get(report_id)?
                        .ok_or_else(|| fail_with(Error::NotFound, format!("Report {} not found", report_id)))?;
                }

                // one review per technician and per report is enforced by the repo
                let review = Review::new(payload, &strategy)?;
                reviews_repo.create(review)
            })
            .map(|review| {
                info!("Review {} of technician {} created by {}.", review.id(), review.technician_id(), review.user_id());
                review
            })
            .map_err(|e| e.context("Service Reviews, create endpoint error occurred.").into())
    }

    fn update_review(&self, review_id: ReviewId, payload: UpdateReview) -> ServiceResult<Review> {
        let user_id = self.dynamic_context.user_id;
        let reviews_repo = self.static_context.repo_factory.create_reviews_repo(user_id);
        let strategy = self.review_validation();
        let window = Duration::days(self.static_context.config.reviews.edit_window_days);

        self.authored_review(review_id)
            .and_then(|mut review| {
                if !review.is_editable(Utc::now(), window) {
                    warn!("Review {} is past its edit window.", review_id);
                    return Err(fail_with(
                        Error::EditWindowExpired,
                        format!("Review update window of {} days has expired", window.num_days()),
                    ));
                }
                review.apply(payload, &strategy)?;
                reviews_repo.update(review)
            })
            .map_err(|e| e.context("Service Reviews, update endpoint error occurred.").into())
    }

    fn delete_review(&self, review_id: ReviewId) -> ServiceResult<Review> {
        let user_id = self.dynamic_context.user_id;
        let reviews_repo = self.static_context.repo_factory.create_reviews_repo(user_id);

        self.authored_review(review_id)
            .and_then(|review| reviews_repo.delete(review.id()))
            .and_then(|review| review.ok_or_else(|| fail_with(Error::NotFound, format!("Review {} not found", review_id))))
            .map_err(|e| e.context("Service Reviews, delete endpoint error occurred.").into())
    }

    fn delete_review_as_admin(&self, review_id: ReviewId) -> ServiceResult<Review> {
        let user_id = self.dynamic_context.user_id;
        let reviews_repo = self.static_context.repo_factory.create_reviews_repo(user_id);

        self.check_admin()
            .and_then(|_| {
                reviews_repo
                    .delete(review_id)?
                    .ok_or_else(|| fail_with(Error::NotFound, format!("Review {} not found", review_id)))
            })
            .map(|review| {
                info!("Review {} deleted by admin.", review.id());
                review
            })
            .map_err(|e| e.context("Service Reviews, delete_review_as_admin endpoint error occurred.").into())
    }

    fn reviews_for_technician(&self, technician_id: UserId) -> ServiceResult<Vec<Review>> {
        let user_id = self.dynamic_context.user_id;
        let reviews_repo = self.static_context.repo_factory.create_reviews_repo(user_id);

        self.technician(technician_id)
            .and_then(|_| reviews_repo.find_by(ReviewSearch::Technician(technician_id)))
            .map_err(|e| e.context("Service Reviews, reviews_for_technician endpoint error occurred.").into())
    }

    fn reviews_by_user(&self, user_id: UserId) -> ServiceResult<Vec<Review>> {
        let current_user_id = self.dynamic_context.user_id;
        let reviews_repo = self.static_context.repo_factory.create_reviews_repo(current_user_id);

        reviews_repo
            .find_by(ReviewSearch::Author(user_id))
            .map_err(|e| e.context("Service Reviews, reviews_by_user endpoint error occurred.").into())
    }

    fn average_rating(&self, technician_id: UserId) -> ServiceResult<f64> {
        self.reviews_for_technician(technician_id)
            .map(|reviews| {
                if reviews.is_empty() {
                    0.0
                } else {
                    let total: i32 = reviews.iter().map(Review::rating).sum();
                    f64::from(total) / reviews.len() as f64
                }
            })
            .map_err(|e| e.context("Service Reviews, average_rating endpoint error occurred.").into())
    }

    fn list_reviews(&self) -> ServiceResult<Vec<Review>> {
        let user_id = self.dynamic_context.user_id;
        let reviews_repo = self.static_context.repo_factory.create_reviews_repo(user_id);

        reviews_repo
            .list()
            .map_err(|e| e.context("Service Reviews, list endpoint error occurred.").into())
    }

    fn available_technicians(&self) -> ServiceResult<Vec<TechnicianSelection>> {
        let user_id = self.dynamic_context.user_id;
        let users_repo = self.static_context.repo_factory.create_users_repo(user_id);

        users_repo
            .find_by_role(UserRole::Technician)
            .map(|users| {
                users
                    .into_iter()
                    .map(|user| TechnicianSelection {
                        id: user.id,
                        full_name: user.full_name,
                    })
                    .collect()
            })
            .map_err(|e| e.context("Service Reviews, available_technicians endpoint error occurred.").into())
    }
}

impl<F: ReposFactory> Service<F> {
    fn review_validation(&self) -> DefaultReviewValidation {
        DefaultReviewValidation::from_config(&self.static_context.config.reviews)
    }

    /// User having the technician role
    pub(crate) fn technician(&self, technician_id: UserId) -> ServiceResult<User> {
        let user_id = self.dynamic_context.user_id;
        let users_repo = self.static_context.repo_factory.create_users_repo(user_id);

        users_repo
            .get(technician_id)?
            .into_iter()
            .find(User::is_technician)
            .ok_or_else(|| {
                fail_with(
                    Error::NotFound,
                    format!("Technician not found or user {} is not a technician", technician_id),
                )
            })
    }

    /// Existing review written by the acting user
    fn authored_review(&self, review_id: ReviewId) -> ServiceResult<Review> {
        let user_id = self.dynamic_context.user_id;
        let reviews_repo = self.static_context.repo_factory.create_reviews_repo(user_id);

        let review = reviews_repo
            .get(review_id)?
            .ok_or_else(|| fail_with(Error::NotFound, format!("Review {} not found", review_id)))?;
        if user_id != Some(review.user_id()) {
            warn!("User {:?} is not the author of review {}.", user_id, review_id);
            return Err(fail_with(Error::Forbidden, "You are not the author of this review"));
        }
        Ok(review)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use chrono::{Duration, Utc};

    use errors::tests::violation;
    use errors::{error_kind, status_code, Error};
    use models::*;
    use repos::repo_factory::tests::*;
    use repos::ReposFactory;
    use services::reports::ReportsService;
    use services::reviews::ReviewsService;

    fn new_review(rating: i32) -> NewReview {
        NewReview {
            technician_id: Some(MOCK_TECHNICIAN_ID),
            user_id: None,
            report_id: None,
            rating,
            comment: Some("Fixed the washing machine in an hour".to_string()),
        }
    }

    #[test]
    fn test_create_review() {
        let service = create_service(Some(MOCK_USER_ID));
        let review = service.create_review(new_review(5)).unwrap();
        assert_eq!(review.user_id(), MOCK_USER_ID);
        assert_eq!(review.technician_id(), MOCK_TECHNICIAN_ID);
        assert_eq!(service.reviews_for_technician(MOCK_TECHNICIAN_ID).unwrap(), vec![review.clone()]);
        assert_eq!(service.reviews_by_user(MOCK_USER_ID).unwrap(), vec![review]);
    }

    #[test]
    fn test_review_twice() {
        let service = create_service(Some(MOCK_USER_ID));
        service.create_review(new_review(5)).unwrap();
        let e = service.create_review(new_review(4)).unwrap_err();
        assert_eq!(status_code(&e), 409);
    }

    #[test]
    fn test_concurrent_reviews_of_one_technician() {
        let factory = mock_repo_factory();
        let handles: Vec<_> = (0..8)
            .map(|rating| {
                let factory = factory.clone();
                thread::spawn(move || {
                    let service = create_service_with(Some(MOCK_USER_ID), factory);
                    service.create_review(new_review(rating % 5 + 1)).is_ok()
                })
            })
            .collect();
        let created = handles.into_iter().map(|h| h.join().unwrap()).filter(|ok| *ok).count();

        assert_eq!(created, 1);
        let service = create_service_with(Some(MOCK_USER_ID), factory);
        assert_eq!(service.reviews_by_user(MOCK_USER_ID).unwrap().len(), 1);
    }

    #[test]
    fn test_review_requires_technician() {
        let service = create_service(Some(MOCK_USER_ID));
        let mut payload = new_review(5);
        payload.technician_id = Some(MOCK_OTHER_USER_ID);
        assert_eq!(status_code(&service.create_review(payload).unwrap_err()), 404);

        let mut payload = new_review(5);
        payload.technician_id = None;
        let e = service.create_review(payload).unwrap_err();
        assert_eq!(violation(&e, "technician_id").unwrap().1, "Technician id cannot be null");
    }

    #[test]
    fn test_review_for_unknown_report() {
        let service = create_service(Some(MOCK_USER_ID));
        let mut payload = new_review(5);
        payload.report_id = Some(ReportId::new());
        assert_eq!(status_code(&service.create_review(payload).unwrap_err()), 404);
    }

    #[test]
    fn test_review_linked_to_report() {
        let service = create_service(Some(MOCK_USER_ID));
        let report = service
            .create_report(NewReport {
                repair_details: "Replaced drum bearing".to_string(),
                repair_summary: "Washer is quiet again".to_string(),
                completion_date_time: None,
            })
            .unwrap();
        let mut payload = new_review(4);
        payload.report_id = Some(report.id());
        assert_eq!(service.create_review(payload).unwrap().report_id(), Some(report.id()));
    }

    #[test]
    fn test_invalid_review_is_not_stored() {
        let service = create_service(Some(MOCK_USER_ID));
        let e = service.create_review(new_review(6)).unwrap_err();
        assert_eq!(violation(&e, "rating").unwrap().0, "range");
        assert!(service.list_reviews().unwrap().is_empty());
    }

    #[test]
    fn test_update_review() {
        let factory = mock_repo_factory();
        let author = create_service_with(Some(MOCK_USER_ID), factory.clone());
        let stranger = create_service_with(Some(MOCK_OTHER_USER_ID), factory);

        let review = author.create_review(new_review(5)).unwrap();
        let payload = UpdateReview {
            rating: Some(3),
            comment: None,
        };

        assert_eq!(status_code(&stranger.update_review(review.id(), payload.clone()).unwrap_err()), 403);
        let updated = author.update_review(review.id(), payload).unwrap();
        assert_eq!(updated.rating(), 3);
        assert!(updated.updated_at() >= review.updated_at());
    }

    #[test]
    fn test_update_after_window() {
        let factory = mock_repo_factory();
        let service = create_service_with(Some(MOCK_USER_ID), factory.clone());
        let mut review = service.create_review(new_review(5)).unwrap();
        review.set_created_at(Utc::now() - Duration::days(8));
        factory.create_reviews_repo(None).update(review.clone()).unwrap();

        let e = service
            .update_review(
                review.id(),
                UpdateReview {
                    rating: Some(1),
                    comment: None,
                },
            )
            .unwrap_err();
        match error_kind(&e) {
            Some(Error::EditWindowExpired) => {}
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_delete_review() {
        let factory = mock_repo_factory();
        let author = create_service_with(Some(MOCK_USER_ID), factory.clone());
        let stranger = create_service_with(Some(MOCK_OTHER_USER_ID), factory.clone());
        let admin = create_service_with(Some(MOCK_ADMIN_ID), factory);

        let first = author.create_review(new_review(5)).unwrap();
        assert_eq!(status_code(&stranger.delete_review(first.id()).unwrap_err()), 403);
        assert_eq!(status_code(&stranger.delete_review_as_admin(first.id()).unwrap_err()), 403);
        assert_eq!(author.delete_review(first.id()).unwrap(), first);

        let second = author.create_review(new_review(4)).unwrap();
        assert_eq!(admin.delete_review_as_admin(second.id()).unwrap(), second);
        assert_eq!(status_code(&admin.delete_review_as_admin(second.id()).unwrap_err()), 404);
    }

    #[test]
    fn test_average_rating() {
        let factory = mock_repo_factory();
        let first = create_service_with(Some(MOCK_USER_ID), factory.clone());
        let second = create_service_with(Some(MOCK_OTHER_USER_ID), factory);

        assert_eq!(first.average_rating(MOCK_TECHNICIAN_ID).unwrap(), 0.0);
        first.create_review(new_review(5)).unwrap();
        second.create_review(new_review(2)).unwrap();
        assert_eq!(first.average_rating(MOCK_TECHNICIAN_ID).unwrap(), 3.5);
        assert_eq!(status_code(&first.average_rating(MOCK_USER_ID).unwrap_err()), 404);
    }

    #[test]
    fn test_available_technicians() {
        let service = create_service(None);
        let technicians = service.available_technicians().unwrap();
        assert_eq!(technicians.len(), 1);
        assert_eq!(technicians[0].id, MOCK_TECHNICIAN_ID);
    }
}
