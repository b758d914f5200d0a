//! Reactions to service request lifecycle events
use failure::Error as FailureError;

use models::report::Report;
use models::service_requests::service_request::ServiceRequest;
use models::service_requests::state::ServiceRequestState;
use models::user::User;

/// Gets told about service request events, every hook does nothing unless overridden
pub trait ServiceRequestObserver: Send + Sync {
    fn on_state_change(&self, _request: &ServiceRequest, _previous: ServiceRequestState) {}

    /// Runs before the completion is stored, an error cancels the completion
    fn on_service_completed(&self, _request: &ServiceRequest, _technician: &mut User) -> Result<(), FailureError> {
        Ok(())
    }

    fn on_report_created(&self, _request: &ServiceRequest, _report: &Report) {}
}

/// Counts the finished job on the technician's record
#[derive(Debug, Clone, Copy, Default)]
pub struct TechnicianStatsUpdater;

impl ServiceRequestObserver for TechnicianStatsUpdater {
    fn on_service_completed(&self, request: &ServiceRequest, technician: &mut User) -> Result<(), FailureError> {
        let completed_jobs = technician.increment_completed_jobs()?;
        info!(
            "Technician {} completed service request {}, {} jobs done.",
            technician.id,
            request.id(),
            completed_jobs
        );
        Ok(())
    }
}

/// Tells the customer what happened to their request
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerNotifier;

impl ServiceRequestObserver for CustomerNotifier {
    fn on_state_change(&self, request: &ServiceRequest, previous: ServiceRequestState) {
        info!(
            "Notify customer {}: service request {} changed from {} to {}.",
            request.customer_id(),
            request.id(),
            previous,
            request.state()
        );
    }

    fn on_report_created(&self, request: &ServiceRequest, report: &Report) {
        info!(
            "Notify customer {}: report {} is ready for service request {}.",
            request.customer_id(),
            report.id(),
            request.id()
        );
    }
}

/// Observers of service requests, notified in registration order
pub struct ServiceRequestSubject {
    observers: Vec<Box<ServiceRequestObserver>>,
}

impl ServiceRequestSubject {
    /// Subject nobody listens to
    pub fn new() -> Self {
        Self { observers: Vec::new() }
    }

    pub fn add_observer(&mut self, observer: Box<ServiceRequestObserver>) -> &mut Self {
        self.observers.push(observer);
        self
    }

    pub fn notify_state_change(&self, request: &ServiceRequest, previous: ServiceRequestState) {
        if request.state() == previous {
            return;
        }
        for observer in &self.observers {
            observer.on_state_change(request, previous);
        }
    }

    /// Stops at the first failing observer
    pub fn notify_service_completed(&self, request: &ServiceRequest, technician: &mut User) -> Result<(), FailureError> {
        for observer in &self.observers {
            observer.on_service_completed(request, technician)?;
        }
        Ok(())
    }

    pub fn notify_report_created(&self, request: &ServiceRequest, report: &Report) {
        for observer in &self.observers {
            observer.on_report_created(request, report);
        }
    }
}

/// Technician stats and customer notifications
impl Default for ServiceRequestSubject {
    fn default() -> Self {
        let mut subject = Self::new();
        subject
            .add_observer(Box::new(TechnicianStatsUpdater))
            .add_observer(Box::new(CustomerNotifier));
        subject
    }
}
