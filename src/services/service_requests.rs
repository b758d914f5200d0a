//! ServiceRequests Services, a repair from the customer's request to the technician's report.
//!
//! Customers create, edit and withdraw requests and answer estimates. The assigned technician
//! estimates, starts and completes the work, then writes the report. Completing a request
//! updates the technician's stats and charges the customer within one unit of work.

use chrono::Utc;
use failure::Error as FailureError;
use num_traits::Zero;
use rand::{thread_rng, Rng};
use rust_decimal::Decimal;

use errors::Error;
use models::*;
use repos::{ReposFactory, ServiceRequestSearch, Settlement};
use services::types::ServiceResult;
use services::{fail_with, Service};

pub trait ServiceRequestsService {
    /// Creates request of the acting customer, a technician is picked at random unless the payload names one
    fn create_service_request(&self, payload: NewServiceRequest) -> ServiceResult<ServiceRequest>;
    /// Returns service request, visible to its customer, its technician and admins
    fn get_service_request(&self, service_request_id: ServiceRequestId) -> ServiceResult<Option<ServiceRequest>>;
    /// Returns requests of customer
    fn service_requests_for_customer(&self, customer_id: UserId) -> ServiceResult<Vec<ServiceRequest>>;
    /// Returns requests assigned to technician, optionally only those in `state`
    fn service_requests_for_technician(
        &self,
        technician_id: UserId,
        state: Option<ServiceRequestState>,
    ) -> ServiceResult<Vec<ServiceRequest>>;
    /// Replaces request details, the request goes back to pending
    fn update_service_request(&self, service_request_id: ServiceRequestId, payload: NewServiceRequest) -> ServiceResult<ServiceRequest>;
    /// Withdraws pending or rejected request
    fn delete_service_request(&self, service_request_id: ServiceRequestId) -> ServiceResult<ServiceRequest>;
    /// Technician gives or revises the estimate
    fn provide_estimate(&self, service_request_id: ServiceRequestId, payload: NewRepairEstimate) -> ServiceResult<ServiceRequest>;
    /// Customer accepts the estimate
    fn accept_estimate(&self, service_request_id: ServiceRequestId, feedback: Option<String>) -> ServiceResult<ServiceRequest>;
    /// Customer rejects the estimate
    fn reject_estimate(&self, service_request_id: ServiceRequestId, feedback: Option<String>) -> ServiceResult<ServiceRequest>;
    /// Technician starts working on accepted request
    fn start_service(&self, service_request_id: ServiceRequestId) -> ServiceResult<ServiceRequest>;
    /// Technician finishes the work. The customer pays the estimate's cost after the coupon
    /// unless the request is already paid.
    fn complete_service(&self, service_request_id: ServiceRequestId) -> ServiceResult<ServiceRequest>;
    /// Technician writes the report of completed request
    fn create_service_report(&self, service_request_id: ServiceRequestId, payload: NewReport) -> ServiceResult<Report>;
    /// Price of the estimate with the request's coupon applied, `None` before there is an estimate
    fn service_request_price(&self, service_request_id: ServiceRequestId) -> ServiceResult<Option<PriceBreakdown>>;
}

impl<F: ReposFactory> ServiceRequestsService for Service<F> {
    fn create_service_request(&self, payload: NewServiceRequest) -> ServiceResult<ServiceRequest> {
        let user_id = self.dynamic_context.user_id;
        let service_requests_repo = self.static_context.repo_factory.create_service_requests_repo(user_id);

        self.current_user()
            .and_then(|customer| {
                if !customer.has_role(UserRole::Customer) {
                    return Err(fail_with(Error::Forbidden, "Only customers can request repairs"));
                }
                self.check_payment_method(payload.payment_method_id)?;
                self.usable_coupon(payload.coupon_code.as_ref())?;
                let technician = self.assign_technician(payload.technician_id)?;

                let service_request = ServiceRequest::new(customer.id, technician.id, payload)?;
                service_requests_repo.create(service_request)
            })
            .map(|service_request| {
                info!(
                    "Service request {} created by customer {}, assigned to technician {}.",
                    service_request.id(),
                    service_request.customer_id(),
                    service_request.technician_id()
                );
                service_request
            })
            .map_err(|e| e.context("Service ServiceRequests, create endpoint error occurred.").into())
    }

    fn get_service_request(&self, service_request_id: ServiceRequestId) -> ServiceResult<Option<ServiceRequest>> {
        let user_id = self.dynamic_context.user_id;
        let service_requests_repo = self.static_context.repo_factory.create_service_requests_repo(user_id);

        service_requests_repo
            .get(service_request_id)
            .and_then(|service_request| {
                if let Some(ref service_request) = service_request {
                    self.check_party_or_admin(service_request)?;
                }
                Ok(service_request)
            })
            .map_err(|e| e.context("Service ServiceRequests, get endpoint error occurred.").into())
    }

    fn service_requests_for_customer(&self, customer_id: UserId) -> ServiceResult<Vec<ServiceRequest>> {
        let user_id = self.dynamic_context.user_id;
        let service_requests_repo = self.static_context.repo_factory.create_service_requests_repo(user_id);

        self.check_owner_or_admin(customer_id)
            .and_then(|_| service_requests_repo.find_by(ServiceRequestSearch::Customer(customer_id)))
            .map_err(|e| e.context("Service ServiceRequests, service_requests_for_customer endpoint error occurred.").into())
    }

    fn service_requests_for_technician(
        &self,
        technician_id: UserId,
        state: Option<ServiceRequestState>,
    ) -> ServiceResult<Vec<ServiceRequest>> {
        let user_id = self.dynamic_context.user_id;
        let service_requests_repo = self.static_context.repo_factory.create_service_requests_repo(user_id);
        let search = match state {
            Some(state) => ServiceRequestSearch::TechnicianAndState(technician_id, state),
            None => ServiceRequestSearch::Technician(technician_id),
        };

        self.check_owner_or_admin(technician_id)
            .and_then(|_| service_requests_repo.find_by(search))
            .map_err(|e| e.context("Service ServiceRequests, service_requests_for_technician endpoint error occurred.").into())
    }

    fn update_service_request(&self, service_request_id: ServiceRequestId, payload: NewServiceRequest) -> ServiceResult<ServiceRequest> {
        self.customers_request(service_request_id)
            .and_then(|service_request| {
                self.check_payment_method(payload.payment_method_id)?;
                self.usable_coupon(payload.coupon_code.as_ref())?;
                self.advance(service_request, |service_request| service_request.apply(payload))
            })
            .map_err(|e| e.context("Service ServiceRequests, update endpoint error occurred.").into())
    }

    fn delete_service_request(&self, service_request_id: ServiceRequestId) -> ServiceResult<ServiceRequest> {
        let user_id = self.dynamic_context.user_id;
        let service_requests_repo = self.static_context.repo_factory.create_service_requests_repo(user_id);

        self.customers_request(service_request_id)
            .and_then(|service_request| {
                if !service_request.state().is_editable() {
                    return Err(Error::IllegalState(format!(
                        "Cannot delete request in {} state",
                        service_request.state()
                    ))
                    .into());
                }
                service_requests_repo
                    .delete(service_request_id)?
                    .ok_or_else(|| fail_with(Error::NotFound, format!("Service request {} not found", service_request_id)))
            })
            .map(|service_request| {
                info!("Service request {} withdrawn by its customer.", service_request_id);
                service_request
            })
            .map_err(|e| e.context("Service ServiceRequests, delete endpoint error occurred.").into())
    }

    fn provide_estimate(&self, service_request_id: ServiceRequestId, payload: NewRepairEstimate) -> ServiceResult<ServiceRequest> {
        self.technicians_request(service_request_id)
            .and_then(|service_request| {
                let estimate = RepairEstimate::new(payload)?;
                self.advance(service_request, |service_request| service_request.provide_estimate(estimate))
            })
            .map_err(|e| e.context("Service ServiceRequests, provide_estimate endpoint error occurred.").into())
    }

    fn accept_estimate(&self, service_request_id: ServiceRequestId, feedback: Option<String>) -> ServiceResult<ServiceRequest> {
        self.customers_request(service_request_id)
            .and_then(|service_request| self.advance(service_request, |service_request| service_request.accept_estimate(feedback)))
            .map_err(|e| e.context("Service ServiceRequests, accept_estimate endpoint error occurred.").into())
    }

    fn reject_estimate(&self, service_request_id: ServiceRequestId, feedback: Option<String>) -> ServiceResult<ServiceRequest> {
        self.customers_request(service_request_id)
            .and_then(|service_request| self.advance(service_request, |service_request| service_request.reject_estimate(feedback)))
            .map_err(|e| e.context("Service ServiceRequests, reject_estimate endpoint error occurred.").into())
    }

    fn start_service(&self, service_request_id: ServiceRequestId) -> ServiceResult<ServiceRequest> {
        self.technicians_request(service_request_id)
            .and_then(|service_request| self.advance(service_request, ServiceRequest::start_service))
            .map_err(|e| e.context("Service ServiceRequests, start_service endpoint error occurred.").into())
    }

    fn complete_service(&self, service_request_id: ServiceRequestId) -> ServiceResult<ServiceRequest> {
        let user_id = self.dynamic_context.user_id;
        let service_requests_repo = self.static_context.repo_factory.create_service_requests_repo(user_id);
        let coupons_repo = self.static_context.repo_factory.create_coupons_repo(user_id);
        let subject = ServiceRequestSubject::default();

        self.technicians_request(service_request_id)
            .and_then(|mut service_request| {
                let previous_state = service_request.state();
                service_request.complete_service()?;

                let mut technician = self.technician(service_request.technician_id())?;
                subject.notify_service_completed(&service_request, &mut technician)?;

                let coupon = match service_request.coupon_code() {
                    Some(code) => coupons_repo.get_by_code(code)?,
                    None => None,
                };
                let amount_due = service_request
                    .amount_due(coupon.as_ref())
                    .filter(|amount| *amount > Decimal::zero());
                let wallets = match amount_due {
                    Some(amount) if service_request.paid_amount().is_none() => {
                        self.charge_for_service(&mut service_request, &mut technician, amount)?.0
                    }
                    _ => vec![],
                };

                let settlement = service_requests_repo.settle(Settlement {
                    service_request,
                    previous_state,
                    wallets,
                    users: vec![technician],
                })?;
                subject.notify_state_change(&settlement.service_request, previous_state);
                Ok(settlement.service_request)
            })
            .map(|service_request| {
                info!(
                    "Service request {} completed, customer paid {:?}.",
                    service_request.id(),
                    service_request.paid_amount()
                );
                service_request
            })
            .map_err(|e| e.context("Service ServiceRequests, complete_service endpoint error occurred.").into())
    }

    fn create_service_report(&self, service_request_id: ServiceRequestId, payload: NewReport) -> ServiceResult<Report> {
        let user_id = self.dynamic_context.user_id;
        let service_requests_repo = self.static_context.repo_factory.create_service_requests_repo(user_id);

        self.technicians_request(service_request_id)
            .and_then(|mut service_request| {
                let report = payload.build()?;
                service_request.attach_report(report.id())?;
                let (service_request, report) = service_requests_repo.attach_report(service_request, report)?;
                ServiceRequestSubject::default().notify_report_created(&service_request, &report);
                Ok(report)
            })
            .map(|report| {
                info!("Report {} created for service request {}.", report.id(), service_request_id);
                report
            })
            .map_err(|e| e.context("Service ServiceRequests, create_service_report endpoint error occurred.").into())
    }

    fn service_request_price(&self, service_request_id: ServiceRequestId) -> ServiceResult<Option<PriceBreakdown>> {
        let user_id = self.dynamic_context.user_id;
        let coupons_repo = self.static_context.repo_factory.create_coupons_repo(user_id);

        self.visible_request(service_request_id)
            .and_then(|service_request| {
                let coupon = match service_request.coupon_code() {
                    Some(code) => coupons_repo.get_by_code(code)?,
                    None => None,
                };
                Ok(service_request
                    .estimate()
                    .map(|estimate| PriceBreakdown::new(estimate.cost(), coupon.as_ref())))
            })
            .map_err(|e| e.context("Service ServiceRequests, service_request_price endpoint error occurred.").into())
    }
}

impl<F: ReposFactory> Service<F> {
    /// Runs one lifecycle step and stores it, failing if the request changed state meanwhile
    fn advance<A>(&self, mut service_request: ServiceRequest, step: A) -> ServiceResult<ServiceRequest>
    where
        A: FnOnce(&mut ServiceRequest) -> ServiceResult<()>,
    {
        let user_id = self.dynamic_context.user_id;
        let service_requests_repo = self.static_context.repo_factory.create_service_requests_repo(user_id);

        let previous_state = service_request.state();
        step(&mut service_request)?;
        let settlement = service_requests_repo.settle(Settlement {
            service_request,
            previous_state,
            wallets: vec![],
            users: vec![],
        })?;
        ServiceRequestSubject::default().notify_state_change(&settlement.service_request, previous_state);
        Ok(settlement.service_request)
    }

    fn stored_request(&self, service_request_id: ServiceRequestId) -> ServiceResult<ServiceRequest> {
        let user_id = self.dynamic_context.user_id;
        let service_requests_repo = self.static_context.repo_factory.create_service_requests_repo(user_id);

        service_requests_repo
            .get(service_request_id)?
            .ok_or_else(|| fail_with(Error::NotFound, format!("Service request {} not found", service_request_id)))
    }

    /// Existing request the acting user takes part in or administers
    pub(crate) fn visible_request(&self, service_request_id: ServiceRequestId) -> ServiceResult<ServiceRequest> {
        let service_request = self.stored_request(service_request_id)?;
        self.check_party_or_admin(&service_request)?;
        Ok(service_request)
    }

    /// Existing request placed by the acting user
    fn customers_request(&self, service_request_id: ServiceRequestId) -> ServiceResult<ServiceRequest> {
        let service_request = self.stored_request(service_request_id)?;
        if self.dynamic_context.user_id != Some(service_request.customer_id()) {
            warn!("User {:?} is not the customer of service request {}.", self.dynamic_context.user_id, service_request_id);
            return Err(fail_with(Error::Forbidden, "You are not the customer of this service request"));
        }
        Ok(service_request)
    }

    /// Existing request assigned to the acting user
    fn technicians_request(&self, service_request_id: ServiceRequestId) -> ServiceResult<ServiceRequest> {
        let service_request = self.stored_request(service_request_id)?;
        if self.dynamic_context.user_id != Some(service_request.technician_id()) {
            warn!("User {:?} is not assigned to service request {}.", self.dynamic_context.user_id, service_request_id);
            return Err(fail_with(Error::Forbidden, "You are not the technician assigned to this service request"));
        }
        Ok(service_request)
    }

    fn check_party_or_admin(&self, service_request: &ServiceRequest) -> ServiceResult<()> {
        match self.dynamic_context.user_id {
            Some(user_id) if service_request.involves(user_id) => Ok(()),
            _ => self.check_admin().map(|_| ()),
        }
    }

    fn check_payment_method(&self, payment_method_id: PaymentMethodId) -> ServiceResult<()> {
        let user_id = self.dynamic_context.user_id;
        let payment_methods_repo = self.static_context.repo_factory.create_payment_methods_repo(user_id);

        match payment_methods_repo.get(payment_method_id)? {
            Some(_) => Ok(()),
            None => Err(Error::Validate(validation_errors!({
                "payment_method_id": ["not_found" => "Payment method not found"]
            }))
            .into()),
        }
    }

    /// Coupon named by the request, which must exist and be usable right now
    fn usable_coupon(&self, code: Option<&CouponCode>) -> ServiceResult<Option<Coupon>> {
        let user_id = self.dynamic_context.user_id;
        let coupons_repo = self.static_context.repo_factory.create_coupons_repo(user_id);

        let code = match code {
            Some(code) => code,
            None => return Ok(None),
        };
        let coupon = coupons_repo.get_by_code(code)?.ok_or_else(|| {
            FailureError::from(Error::Validate(validation_errors!({
                "coupon_code": ["not_found" => "Coupon not found"]
            })))
        })?;
        match coupon.check(Utc::now()) {
            CouponValidate::Valid => Ok(Some(coupon)),
            _ => Err(Error::Validate(validation_errors!({
                "coupon_code": ["unusable" => "Coupon is expired or used up"]
            }))
            .into()),
        }
    }

    /// Requested technician, or a random one when none is named
    fn assign_technician(&self, technician_id: Option<UserId>) -> ServiceResult<User> {
        let user_id = self.dynamic_context.user_id;
        let users_repo = self.static_context.repo_factory.create_users_repo(user_id);

        if let Some(technician_id) = technician_id {
            return self.technician(technician_id);
        }
        let technicians = users_repo.find_by_role(UserRole::Technician)?;
        thread_rng()
            .choose(&technicians)
            .cloned()
            .ok_or_else(|| Error::IllegalState("No technician available to assign to this service request".to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    use errors::tests::violation;
    use errors::{error_kind, status_code, Error};
    use models::*;
    use repos::repo_factory::tests::*;
    use repos::{ReposFactory, ReposFactoryImpl};
    use services::coupons::CouponsService;
    use services::service_requests::ServiceRequestsService;
    use services::users::UsersService;
    use services::wallets::WalletsService;
    use services::Service;

    fn money(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn estimate(cents: i64) -> NewRepairEstimate {
        NewRepairEstimate {
            cost: money(cents),
            notes: Some("Replace the motherboard".to_string()),
            ..Default::default()
        }
    }

    fn technician_stats(service: &Service<ReposFactoryImpl>) -> (i32, Decimal) {
        match service.get_user(MOCK_TECHNICIAN_ID).unwrap().unwrap().role {
            Role::Technician {
                completed_jobs,
                total_earnings,
                ..
            } => (completed_jobs, total_earnings),
            ref other => panic!("unexpected role {:?}", other),
        }
    }

    #[test]
    fn test_create_service_request() {
        let service = create_service(Some(MOCK_USER_ID));
        let request = service.create_service_request(new_service_request()).unwrap();
        assert_eq!(request.state(), ServiceRequestState::Pending);
        assert_eq!(request.customer_id(), MOCK_USER_ID);
        assert_eq!(request.technician_id(), MOCK_TECHNICIAN_ID);
        assert_eq!(service.service_requests_for_customer(MOCK_USER_ID).unwrap(), vec![request]);
    }

    #[test]
    fn test_random_technician_is_assigned() {
        let service = create_service(Some(MOCK_USER_ID));
        let request = service
            .create_service_request(NewServiceRequest {
                technician_id: None,
                ..new_service_request()
            })
            .unwrap();
        assert_eq!(request.technician_id(), MOCK_TECHNICIAN_ID);
    }

    #[test]
    fn test_create_service_request_rules() {
        let factory = mock_repo_factory();
        let customer = create_service_with(Some(MOCK_USER_ID), factory.clone());

        let e = customer
            .create_service_request(NewServiceRequest {
                payment_method_id: PaymentMethodId::new(),
                ..new_service_request()
            })
            .unwrap_err();
        assert_eq!(violation(&e, "payment_method_id").unwrap().0, "not_found");

        let e = customer
            .create_service_request(NewServiceRequest {
                coupon_code: Some(CouponCode::from("NOPE")),
                ..new_service_request()
            })
            .unwrap_err();
        assert_eq!(violation(&e, "coupon_code").unwrap().0, "not_found");

        let e = customer
            .create_service_request(NewServiceRequest {
                service_date: Utc::now().date_naive() - Duration::days(1),
                ..new_service_request()
            })
            .unwrap_err();
        assert_eq!(violation(&e, "service_date").unwrap().0, "not_past");

        let e = customer
            .create_service_request(NewServiceRequest {
                technician_id: Some(MOCK_OTHER_USER_ID),
                ..new_service_request()
            })
            .unwrap_err();
        assert_eq!(status_code(&e), 404);

        let technician = create_service_with(Some(MOCK_TECHNICIAN_ID), factory.clone());
        assert_eq!(status_code(&technician.create_service_request(new_service_request()).unwrap_err()), 403);
        assert!(customer.service_requests_for_customer(MOCK_USER_ID).unwrap().is_empty());
    }

    #[test]
    fn test_lifecycle_with_payment_and_report() {
        let factory = mock_repo_factory();
        let customer = create_service_with(Some(MOCK_USER_ID), factory.clone());
        let technician = create_service_with(Some(MOCK_TECHNICIAN_ID), factory.clone());
        let admin = create_service_with(Some(MOCK_ADMIN_ID), factory.clone());

        let coupon = admin
            .create_coupon(NewCoupon {
                discount_value: Some(Decimal::new(20, 2)),
                ..Default::default()
            })
            .unwrap();
        let customer_wallet = customer.create_wallet(MOCK_USER_ID, money(50000)).unwrap();
        let technician_wallet = technician.create_wallet(MOCK_TECHNICIAN_ID, money(0)).unwrap();

        let request = customer
            .create_service_request(NewServiceRequest {
                coupon_code: Some(coupon.code().clone()),
                ..new_service_request()
            })
            .unwrap();
        let request = technician.provide_estimate(request.id(), estimate(25000)).unwrap();
        assert_eq!(request.state(), ServiceRequestState::Estimated);

        let price = customer.service_request_price(request.id()).unwrap().unwrap();
        assert_eq!(price.discount_amount, money(5000));
        assert_eq!(price.final_price, money(20000));

        customer.accept_estimate(request.id(), Some("Please hurry".to_string())).unwrap();
        technician.start_service(request.id()).unwrap();
        let completed = technician.complete_service(request.id()).unwrap();
        assert_eq!(completed.state(), ServiceRequestState::Completed);
        assert_eq!(completed.paid_amount(), Some(money(20000)));

        assert_eq!(customer.get_balance(customer_wallet.id()).unwrap(), money(30000));
        assert_eq!(technician.get_balance(technician_wallet.id()).unwrap(), money(20000));
        assert_eq!(technician_stats(&admin), (1, money(20000)));

        let report = technician
            .create_service_report(
                request.id(),
                NewReport {
                    repair_details: "Replaced the motherboard".to_string(),
                    repair_summary: "Laptop boots again".to_string(),
                    completion_date_time: None,
                },
            )
            .unwrap();
        let stored = customer.get_service_request(request.id()).unwrap().unwrap();
        assert_eq!(stored.report_id(), Some(report.id()));
        assert_eq!(
            factory.create_reports_repo(None).get(report.id()).unwrap(),
            Some(report)
        );
    }

    #[test]
    fn test_failed_completion_changes_nothing() {
        let factory = mock_repo_factory();
        let customer = create_service_with(Some(MOCK_USER_ID), factory.clone());
        let technician = create_service_with(Some(MOCK_TECHNICIAN_ID), factory.clone());
        let request = mock_request_in_progress(&factory, money(40000));

        let customer_wallet = customer.create_wallet(MOCK_USER_ID, money(10000)).unwrap();
        technician.create_wallet(MOCK_TECHNICIAN_ID, money(0)).unwrap();

        let e = technician.complete_service(request.id()).unwrap_err();
        assert_eq!(status_code(&e), 422);
        let stored = customer.get_service_request(request.id()).unwrap().unwrap();
        assert_eq!(stored.state(), ServiceRequestState::InProgress);
        assert_eq!(stored.paid_amount(), None);
        assert_eq!(customer.get_balance(customer_wallet.id()).unwrap(), money(10000));
        assert_eq!(technician_stats(&technician), (0, money(0)));

        customer.deposit(customer_wallet.id(), money(30000), None).unwrap();
        technician.complete_service(request.id()).unwrap();
        assert_eq!(technician_stats(&technician), (1, money(40000)));
        assert!(technician.complete_service(request.id()).is_err());
        assert_eq!(technician_stats(&technician), (1, money(40000)));
    }

    #[test]
    fn test_prepaid_request_is_not_charged_again() {
        let factory = mock_repo_factory();
        let customer = create_service_with(Some(MOCK_USER_ID), factory.clone());
        let technician = create_service_with(Some(MOCK_TECHNICIAN_ID), factory.clone());
        let request = mock_request_in_progress(&factory, money(10000));
        let customer_wallet = customer.create_wallet(MOCK_USER_ID, money(10000)).unwrap();
        technician.create_wallet(MOCK_TECHNICIAN_ID, money(0)).unwrap();

        customer
            .process_service_payment(MOCK_USER_ID, MOCK_TECHNICIAN_ID, money(10000), request.id())
            .unwrap();
        let completed = technician.complete_service(request.id()).unwrap();
        assert_eq!(completed.paid_amount(), Some(money(10000)));
        assert_eq!(customer.get_balance(customer_wallet.id()).unwrap(), money(0));
        assert_eq!(technician_stats(&technician), (1, money(10000)));
    }

    #[test]
    fn test_only_parties_act_on_request() {
        let factory = mock_repo_factory();
        let customer = create_service_with(Some(MOCK_USER_ID), factory.clone());
        let technician = create_service_with(Some(MOCK_TECHNICIAN_ID), factory.clone());
        let stranger = create_service_with(Some(MOCK_OTHER_USER_ID), factory.clone());
        let admin = create_service_with(Some(MOCK_ADMIN_ID), factory.clone());
        let request = customer.create_service_request(new_service_request()).unwrap();

        assert_eq!(status_code(&stranger.get_service_request(request.id()).unwrap_err()), 403);
        assert!(admin.get_service_request(request.id()).unwrap().is_some());
        assert!(technician.get_service_request(request.id()).unwrap().is_some());

        assert_eq!(status_code(&customer.provide_estimate(request.id(), estimate(100)).unwrap_err()), 403);
        technician.provide_estimate(request.id(), estimate(100)).unwrap();
        assert_eq!(status_code(&technician.accept_estimate(request.id(), None).unwrap_err()), 403);
        assert_eq!(status_code(&stranger.reject_estimate(request.id(), None).unwrap_err()), 403);
        assert_eq!(status_code(&technician.start_service(request.id()).unwrap_err()), 409);
        assert_eq!(status_code(&customer.delete_service_request(request.id()).unwrap_err()), 409);
    }

    #[test]
    fn test_reject_then_edit_and_withdraw() {
        let factory = mock_repo_factory();
        let customer = create_service_with(Some(MOCK_USER_ID), factory.clone());
        let technician = create_service_with(Some(MOCK_TECHNICIAN_ID), factory.clone());
        let request = customer.create_service_request(new_service_request()).unwrap();

        technician.provide_estimate(request.id(), estimate(90000)).unwrap();
        let rejected = customer
            .reject_estimate(request.id(), Some("Too expensive".to_string()))
            .unwrap();
        assert_eq!(rejected.state(), ServiceRequestState::Rejected);
        assert_eq!(
            technician
                .service_requests_for_technician(MOCK_TECHNICIAN_ID, Some(ServiceRequestState::Rejected))
                .unwrap()
                .len(),
            1
        );

        let edited = customer
            .update_service_request(
                request.id(),
                NewServiceRequest {
                    issue_description: "Only the fan is noisy".to_string(),
                    ..new_service_request()
                },
            )
            .unwrap();
        assert_eq!(edited.state(), ServiceRequestState::Pending);
        assert!(edited.estimate().is_none());

        assert_eq!(customer.delete_service_request(request.id()).unwrap().id(), request.id());
        assert_eq!(customer.get_service_request(request.id()).unwrap(), None);
    }

    #[test]
    fn test_report_only_after_completion() {
        let factory = mock_repo_factory();
        let technician = create_service_with(Some(MOCK_TECHNICIAN_ID), factory.clone());
        let request = mock_request_in_progress(&factory, money(100));
        let payload = NewReport {
            repair_details: "Cleaned the contacts".to_string(),
            repair_summary: "Works".to_string(),
            completion_date_time: None,
        };

        let e = technician.create_service_report(request.id(), payload.clone()).unwrap_err();
        match error_kind(&e) {
            Some(Error::IllegalState(message)) => assert_eq!(message, "Cannot create report in in progress state"),
            other => panic!("unexpected kind {:?}", other),
        }
        assert!(factory.create_reports_repo(None).list().unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_answers_to_one_estimate() {
        let factory = mock_repo_factory();
        let customer = create_service_with(Some(MOCK_USER_ID), factory.clone());
        let technician = create_service_with(Some(MOCK_TECHNICIAN_ID), factory.clone());
        let request = customer.create_service_request(new_service_request()).unwrap();
        technician.provide_estimate(request.id(), estimate(5000)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let customer = create_service_with(Some(MOCK_USER_ID), factory.clone());
                let request_id = request.id();
                thread::spawn(move || {
                    if i % 2 == 0 {
                        customer.accept_estimate(request_id, None).is_ok()
                    } else {
                        customer.reject_estimate(request_id, None).is_ok()
                    }
                })
            })
            .collect();
        let answered = handles.into_iter().map(|h| h.join().unwrap()).filter(|ok| *ok).count();
        assert_eq!(answered, 1);
    }
}
