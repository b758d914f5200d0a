//! Service requests repo. Steps that change more than the request itself are stored
//! together with it under one lock.
use failure::Error as FailureError;

use errors::Error;
use models::*;
use repos::types::{RepoResult, Storage, Tables};

/// Search service requests, results are ordered by request date
#[derive(Clone, Debug)]
pub enum ServiceRequestSearch {
    Customer(UserId),
    Technician(UserId),
    TechnicianAndState(UserId, ServiceRequestState),
    Estimate(EstimateId),
}

impl ServiceRequestSearch {
    fn matches(&self, request: &ServiceRequest) -> bool {
        match *self {
            ServiceRequestSearch::Customer(customer_id) => request.customer_id() == customer_id,
            ServiceRequestSearch::Technician(technician_id) => request.technician_id() == technician_id,
            ServiceRequestSearch::TechnicianAndState(technician_id, state) => {
                request.technician_id() == technician_id && request.state() == state
            }
            ServiceRequestSearch::Estimate(estimate_id) => request.estimate().map(|e| e.id()) == Some(estimate_id),
        }
    }
}

/// Everything one step of a service request changed: the request, the wallets money moved
/// between and the users whose records were updated
#[derive(Debug, Clone)]
pub struct Settlement {
    pub service_request: ServiceRequest,
    /// State the request was loaded in, the settlement fails if it has changed since
    pub previous_state: ServiceRequestState,
    pub wallets: Vec<Wallet>,
    pub users: Vec<User>,
}

pub struct ServiceRequestsRepoImpl {
    pub storage: Storage,
    pub user_id: Option<UserId>,
}

pub trait ServiceRequestsRepo {
    /// Creates new service request
    fn create(&self, service_request: ServiceRequest) -> RepoResult<ServiceRequest>;

    /// Get service request
    fn get(&self, service_request_id: ServiceRequestId) -> RepoResult<Option<ServiceRequest>>;

    /// Search service requests
    fn find_by(&self, search: ServiceRequestSearch) -> RepoResult<Vec<ServiceRequest>>;

    /// Update service request
    fn update(&self, service_request: ServiceRequest) -> RepoResult<ServiceRequest>;

    /// Delete service request
    fn delete(&self, service_request_id: ServiceRequestId) -> RepoResult<Option<ServiceRequest>>;

    /// Stores report and the request it belongs to, a request gets one report
    fn attach_report(&self, service_request: ServiceRequest, report: Report) -> RepoResult<(ServiceRequest, Report)>;

    /// Stores request, wallets and users as one unit of work. Nothing is written unless every
    /// one of them exists, no wallet appears twice and the request is still in `previous_state`.
    fn settle(&self, settlement: Settlement) -> RepoResult<Settlement>;
}

impl ServiceRequestsRepoImpl {
    pub fn new(storage: Storage, user_id: Option<UserId>) -> Self {
        Self { storage, user_id }
    }

    fn check_stored(tables: &Tables, service_request: &ServiceRequest, previous_state: ServiceRequestState) -> RepoResult<()> {
        let stored = tables.service_requests.get(&service_request.id()).ok_or_else(|| {
            FailureError::from(Error::NotFound).context(format!("Service request {} not found", service_request.id()))
        })?;
        if stored.state() != previous_state {
            return Err(Error::IllegalState(format!(
                "Service request {} is {} now, not {}",
                stored.id(),
                stored.state(),
                previous_state
            ))
            .into());
        }
        if stored.paid_amount().is_some() && service_request.paid_amount() != stored.paid_amount() {
            return Err(Error::IllegalState(format!("Service request {} is already paid", stored.id())).into());
        }
        Ok(())
    }
}

impl ServiceRequestsRepo for ServiceRequestsRepoImpl {
    fn create(&self, service_request: ServiceRequest) -> RepoResult<ServiceRequest> {
        debug!("User {:?} creates service request {:?}.", self.user_id, service_request);
        let mut tables = self.storage.lock()?;
        tables.service_requests.insert(service_request.id(), service_request.clone());
        Ok(service_request)
    }

    fn get(&self, service_request_id: ServiceRequestId) -> RepoResult<Option<ServiceRequest>> {
        debug!("Find service request with id {}.", service_request_id);
        let tables = self.storage.lock()?;
        Ok(tables.service_requests.get(&service_request_id).cloned())
    }

    fn find_by(&self, search: ServiceRequestSearch) -> RepoResult<Vec<ServiceRequest>> {
        debug!("Find service requests by {:?}.", search);
        let tables = self.storage.lock()?;
        let mut service_requests: Vec<ServiceRequest> = tables
            .service_requests
            .values()
            .filter(|r| search.matches(r))
            .cloned()
            .collect();
        service_requests.sort_by_key(|r| (r.request_date(), r.updated_at()));
        Ok(service_requests)
    }

    fn update(&self, service_request: ServiceRequest) -> RepoResult<ServiceRequest> {
        debug!("Updating service request {:?}.", service_request);
        let mut tables = self.storage.lock()?;
        match tables.service_requests.get_mut(&service_request.id()) {
            Some(stored) => {
                *stored = service_request.clone();
                Ok(service_request)
            }
            None => Err(FailureError::from(Error::NotFound)
                .context(format!("Update service request {} error occurred", service_request.id()))
                .into()),
        }
    }

    fn delete(&self, service_request_id: ServiceRequestId) -> RepoResult<Option<ServiceRequest>> {
        debug!("Delete service request with id {}.", service_request_id);
        let mut tables = self.storage.lock()?;
        Ok(tables.service_requests.remove(&service_request_id))
    }

    fn attach_report(&self, service_request: ServiceRequest, report: Report) -> RepoResult<(ServiceRequest, Report)> {
        debug!("User {:?} attaches report {} to service request {}.", self.user_id, report.id(), service_request.id());
        let mut tables = self.storage.lock()?;
        let has_report = match tables.service_requests.get(&service_request.id()) {
            Some(stored) => stored.report_id().is_some(),
            None => {
                return Err(FailureError::from(Error::NotFound)
                    .context(format!("Service request {} not found", service_request.id()))
                    .into())
            }
        };
        if has_report {
            return Err(Error::IllegalState(format!("Service request {} already has a report", service_request.id())).into());
        }
        tables.reports.insert(report.id(), report.clone());
        tables.service_requests.insert(service_request.id(), service_request.clone());
        Ok((service_request, report))
    }

    fn settle(&self, settlement: Settlement) -> RepoResult<Settlement> {
        debug!(
            "User {:?} settles service request {}, wallets {:?}.",
            self.user_id,
            settlement.service_request.id(),
            settlement.wallets.iter().map(|w| w.id()).collect::<Vec<WalletId>>()
        );
        let mut tables = self.storage.lock()?;
        Self::check_stored(&tables, &settlement.service_request, settlement.previous_state)
            .and_then(|_| tables.check_wallets(&settlement.wallets))
            .and_then(|_| match settlement.users.iter().find(|u| !tables.users.contains_key(&u.id)) {
                Some(missing) => Err(FailureError::from(Error::NotFound)
                    .context(format!("User {} not found", missing.id))
                    .into()),
                None => Ok(()),
            })
            .map_err(|e| -> FailureError {
                e.context(format!("Settle service request {} error occurred", settlement.service_request.id()))
                    .into()
            })?;

        tables.store_wallets(&settlement.wallets);
        for user in &settlement.users {
            tables.users.insert(user.id, user.clone());
        }
        tables
            .service_requests
            .insert(settlement.service_request.id(), settlement.service_request.clone());
        Ok(settlement)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    use errors::status_code;

    use super::*;

    fn pending_request() -> ServiceRequest {
        ServiceRequest::new(
            UserId::new(),
            UserId::new(),
            NewServiceRequest {
                name: "Washing machine".to_string(),
                condition: "Old".to_string(),
                issue_description: "Leaks water".to_string(),
                service_date: Utc::now().date_naive() + Duration::days(1),
                technician_id: None,
                payment_method_id: PaymentMethodId::new(),
                coupon_code: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_settle_writes_nothing_when_a_wallet_is_missing() {
        let repo = ServiceRequestsRepoImpl::new(Storage::new(), None);
        let request = repo.create(pending_request()).unwrap();
        let mut wallet = Wallet::new(request.customer_id());
        repo.storage.lock().unwrap().wallets.insert(wallet.id(), wallet.clone());
        wallet.record(TransactionType::Deposit, Decimal::new(10, 0), "Top-up", None).unwrap();

        let mut paid = request.clone();
        paid.mark_paid(Decimal::new(10, 0)).unwrap();
        let e = repo
            .settle(Settlement {
                service_request: paid,
                previous_state: ServiceRequestState::Pending,
                wallets: vec![wallet.clone(), Wallet::new(request.technician_id())],
                users: vec![],
            })
            .unwrap_err();
        assert_eq!(status_code(&e), 404);

        let tables = repo.storage.lock().unwrap();
        assert!(tables.ledger.is_empty());
        assert_eq!(tables.wallets[&wallet.id()].balance(), Decimal::new(0, 0));
        assert_eq!(tables.service_requests[&request.id()].paid_amount(), None);
    }

    #[test]
    fn test_settle_rejects_stale_or_paid_requests() {
        let repo = ServiceRequestsRepoImpl::new(Storage::new(), None);
        let request = repo.create(pending_request()).unwrap();

        let e = repo
            .settle(Settlement {
                service_request: request.clone(),
                previous_state: ServiceRequestState::InProgress,
                wallets: vec![],
                users: vec![],
            })
            .unwrap_err();
        assert_eq!(status_code(&e), 409);

        let mut paid = request.clone();
        paid.mark_paid(Decimal::new(10, 0)).unwrap();
        let settlement = Settlement {
            service_request: paid,
            previous_state: ServiceRequestState::Pending,
            wallets: vec![],
            users: vec![],
        };
        repo.settle(settlement.clone()).unwrap();

        let mut paid_again = request.clone();
        paid_again.mark_paid(Decimal::new(20, 0)).unwrap();
        let e = repo
            .settle(Settlement {
                service_request: paid_again,
                ..settlement
            })
            .unwrap_err();
        assert_eq!(status_code(&e), 409);
        assert_eq!(repo.get(request.id()).unwrap().unwrap().paid_amount(), Some(Decimal::new(10, 0)));
    }

    #[test]
    fn test_one_report_per_request() {
        let repo = ServiceRequestsRepoImpl::new(Storage::new(), None);
        let mut request = pending_request();
        request
            .provide_estimate(RepairEstimate::new(NewRepairEstimate { cost: Decimal::new(100, 0), ..Default::default() }).unwrap())
            .unwrap();
        request.accept_estimate(None).unwrap();
        request.start_service().unwrap();
        request.complete_service().unwrap();
        let completed = repo.create(request).unwrap();

        let report = |details: &str| {
            let mut builder = ReportBuilder::new();
            builder
                .with_repair_details(details)
                .and_then(|builder| builder.with_repair_summary("Pump replaced"))
                .map(|builder| builder.completed_now())
                .and_then(|builder| builder.build())
                .unwrap()
        };

        let first = report("Replaced the pump");
        let mut with_first = completed.clone();
        with_first.attach_report(first.id()).unwrap();
        repo.attach_report(with_first, first.clone()).unwrap();

        // stale copy loaded before the first report was attached
        let second = report("Replaced the pump again");
        let mut with_second = completed.clone();
        with_second.attach_report(second.id()).unwrap();
        let e = repo.attach_report(with_second, second.clone()).unwrap_err();
        assert_eq!(status_code(&e), 409);

        let tables = repo.storage.lock().unwrap();
        assert!(tables.reports.contains_key(&first.id()));
        assert!(!tables.reports.contains_key(&second.id()));
        assert_eq!(tables.service_requests[&completed.id()].report_id(), Some(first.id()));
    }

    #[test]
    fn test_find_by_state() {
        let repo = ServiceRequestsRepoImpl::new(Storage::new(), None);
        let pending = repo.create(pending_request()).unwrap();
        let mut estimated = pending_request();
        estimated
            .provide_estimate(RepairEstimate::new(NewRepairEstimate { cost: Decimal::new(100, 0), ..Default::default() }).unwrap())
            .unwrap();
        let estimated = repo.create(estimated).unwrap();

        let found = repo
            .find_by(ServiceRequestSearch::TechnicianAndState(estimated.technician_id(), ServiceRequestState::Estimated))
            .unwrap();
        assert_eq!(found, vec![estimated.clone()]);
        assert!(repo
            .find_by(ServiceRequestSearch::TechnicianAndState(pending.technician_id(), ServiceRequestState::Estimated))
            .unwrap()
            .is_empty());

        let estimate_id = estimated.estimate().unwrap().id();
        assert_eq!(repo.find_by(ServiceRequestSearch::Estimate(estimate_id)).unwrap(), vec![estimated]);
    }
}
