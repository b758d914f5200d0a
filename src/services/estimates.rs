//! Estimates Services, customers look up and answer estimates by the estimate's id

use errors::Error;
use models::*;
use repos::{ReposFactory, ServiceRequestSearch};
use services::service_requests::ServiceRequestsService;
use services::types::ServiceResult;
use services::{fail_with, Service};

pub trait EstimatesService {
    /// Returns estimate, visible to both parties of its request and admins
    fn get_estimate(&self, estimate_id: EstimateId) -> ServiceResult<Option<RepairEstimate>>;
    /// Returns service request the estimate was given for
    fn service_request_for_estimate(&self, estimate_id: EstimateId) -> ServiceResult<ServiceRequest>;
    /// Customer accepts estimate, the request moves to accepted
    fn accept_repair_estimate(&self, estimate_id: EstimateId, feedback: Option<String>) -> ServiceResult<ServiceRequest>;
    /// Customer rejects estimate, the request moves to rejected and keeps the feedback
    fn reject_repair_estimate(&self, estimate_id: EstimateId, feedback: Option<String>) -> ServiceResult<ServiceRequest>;
}

impl<F: ReposFactory> EstimatesService for Service<F> {
    fn get_estimate(&self, estimate_id: EstimateId) -> ServiceResult<Option<RepairEstimate>> {
        self.request_by_estimate(estimate_id)
            .and_then(|service_request| match service_request {
                Some(service_request) => {
                    let service_request = self.visible_request(service_request.id())?;
                    Ok(service_request.estimate().cloned())
                }
                None => Ok(None),
            })
            .map_err(|e| e.context("Service Estimates, get endpoint error occurred.").into())
    }

    fn service_request_for_estimate(&self, estimate_id: EstimateId) -> ServiceResult<ServiceRequest> {
        self.request_by_estimate(estimate_id)
            .and_then(|service_request| {
                service_request.ok_or_else(|| fail_with(Error::NotFound, format!("Estimate {} not found", estimate_id)))
            })
            .and_then(|service_request| self.visible_request(service_request.id()))
            .map_err(|e| e.context("Service Estimates, service_request_for_estimate endpoint error occurred.").into())
    }

    fn accept_repair_estimate(&self, estimate_id: EstimateId, feedback: Option<String>) -> ServiceResult<ServiceRequest> {
        self.service_request_for_estimate(estimate_id)
            .and_then(|service_request| self.accept_estimate(service_request.id(), feedback))
            .map(|service_request| {
                info!("Estimate {} accepted for service request {}.", estimate_id, service_request.id());
                service_request
            })
            .map_err(|e| e.context("Service Estimates, accept endpoint error occurred.").into())
    }

    fn reject_repair_estimate(&self, estimate_id: EstimateId, feedback: Option<String>) -> ServiceResult<ServiceRequest> {
        self.service_request_for_estimate(estimate_id)
            .and_then(|service_request| self.reject_estimate(service_request.id(), feedback))
            .map(|service_request| {
                info!("Estimate {} rejected for service request {}.", estimate_id, service_request.id());
                service_request
            })
            .map_err(|e| e.context("Service Estimates, reject endpoint error occurred.").into())
    }
}

impl<F: ReposFactory> Service<F> {
    fn request_by_estimate(&self, estimate_id: EstimateId) -> ServiceResult<Option<ServiceRequest>> {
        let user_id = self.dynamic_context.user_id;
        let service_requests_repo = self.static_context.repo_factory.create_service_requests_repo(user_id);

        service_requests_repo
            .find_by(ServiceRequestSearch::Estimate(estimate_id))
            .map(|service_requests| service_requests.into_iter().next())
    }
}
