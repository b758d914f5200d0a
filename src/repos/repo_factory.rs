use models::*;
use repos::*;

pub trait ReposFactory: Clone + Send + 'static {
    fn create_coupons_repo(&self, user_id: Option<UserId>) -> Box<CouponsRepo>;
    fn create_wallets_repo(&self, user_id: Option<UserId>) -> Box<WalletsRepo>;
    fn create_transactions_repo(&self, user_id: Option<UserId>) -> Box<TransactionsRepo>;
    fn create_reviews_repo(&self, user_id: Option<UserId>) -> Box<ReviewsRepo>;
    fn create_reports_repo(&self, user_id: Option<UserId>) -> Box<ReportsRepo>;
    fn create_users_repo(&self, user_id: Option<UserId>) -> Box<UsersRepo>;
    fn create_payment_methods_repo(&self, user_id: Option<UserId>) -> Box<PaymentMethodsRepo>;
    fn create_service_requests_repo(&self, user_id: Option<UserId>) -> Box<ServiceRequestsRepo>;
}

/// Factory over the shared in-memory storage; clones see the same data
#[derive(Clone, Default)]
pub struct ReposFactoryImpl {
    storage: Storage,
}

impl ReposFactoryImpl {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }
}

impl ReposFactory for ReposFactoryImpl {
    fn create_coupons_repo(&self, user_id: Option<UserId>) -> Box<CouponsRepo> {
        Box::new(CouponsRepoImpl::new(self.storage.clone(), user_id)) as Box<CouponsRepo>
    }
    fn create_wallets_repo(&self, user_id: Option<UserId>) -> Box<WalletsRepo> {
        Box::new(WalletsRepoImpl::new(self.storage.clone(), user_id)) as Box<WalletsRepo>
    }
    fn create_transactions_repo(&self, user_id: Option<UserId>) -> Box<TransactionsRepo> {
        Box::new(TransactionsRepoImpl::new(self.storage.clone(), user_id)) as Box<TransactionsRepo>
    }
    fn create_reviews_repo(&self, user_id: Option<UserId>) -> Box<ReviewsRepo> {
        Box::new(ReviewsRepoImpl::new(self.storage.clone(), user_id)) as Box<ReviewsRepo>
    }
    fn create_reports_repo(&self, user_id: Option<UserId>) -> Box<ReportsRepo> {
        Box::new(ReportsRepoImpl::new(self.storage.clone(), user_id)) as Box<ReportsRepo>
    }
    fn create_users_repo(&self, user_id: Option<UserId>) -> Box<UsersRepo> {
        Box::new(UsersRepoImpl::new(self.storage.clone(), user_id)) as Box<UsersRepo>
    }
    fn create_payment_methods_repo(&self, user_id: Option<UserId>) -> Box<PaymentMethodsRepo> {
        Box::new(PaymentMethodsRepoImpl::new(self.storage.clone(), user_id)) as Box<PaymentMethodsRepo>
    }
    fn create_service_requests_repo(&self, user_id: Option<UserId>) -> Box<ServiceRequestsRepo> {
        Box::new(ServiceRequestsRepoImpl::new(self.storage.clone(), user_id)) as Box<ServiceRequestsRepo>
    }
}
