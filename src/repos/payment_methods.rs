//! Payment methods repo, presents CRUD operations with payment methods
use failure::Error as FailureError;

use errors::Error;
use models::*;
use repos::types::{RepoResult, Storage};

pub struct PaymentMethodsRepoImpl {
    pub storage: Storage,
    pub user_id: Option<UserId>,
}

pub trait PaymentMethodsRepo {
    /// Creates new payment method
    fn create(&self, payment_method: PaymentMethod) -> RepoResult<PaymentMethod>;

    /// Get payment method
    fn get(&self, payment_method_id: PaymentMethodId) -> RepoResult<Option<PaymentMethod>>;

    /// List all payment methods ordered by name
    fn list(&self) -> RepoResult<Vec<PaymentMethod>>;

    /// Update payment method
    fn update(&self, payment_method: PaymentMethod) -> RepoResult<PaymentMethod>;

    /// Delete payment method
    fn delete(&self, payment_method_id: PaymentMethodId) -> RepoResult<Option<PaymentMethod>>;
}

impl PaymentMethodsRepoImpl {
    pub fn new(storage: Storage, user_id: Option<UserId>) -> Self {
        Self { storage, user_id }
    }
}

impl PaymentMethodsRepo for PaymentMethodsRepoImpl {
    fn create(&self, payment_method: PaymentMethod) -> RepoResult<PaymentMethod> {
        debug!("User {:?} creates payment method {:?}.", self.user_id, payment_method);
        let mut tables = self.storage.lock()?;
        tables.payment_methods.insert(payment_method.id, payment_method.clone());
        Ok(payment_method)
    }

    fn get(&self, payment_method_id: PaymentMethodId) -> RepoResult<Option<PaymentMethod>> {
        debug!("Find payment method with id {}.", payment_method_id);
        let tables = self.storage.lock()?;
        Ok(tables.payment_methods.get(&payment_method_id).cloned())
    }

    fn list(&self) -> RepoResult<Vec<PaymentMethod>> {
        debug!("Find all payment methods.");
        let tables = self.storage.lock()?;
        let mut payment_methods: Vec<PaymentMethod> = tables.payment_methods.values().cloned().collect();
        payment_methods.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(payment_methods)
    }

    fn update(&self, payment_method: PaymentMethod) -> RepoResult<PaymentMethod> {
        debug!("Updating payment method {:?}.", payment_method);
        let mut tables = self.storage.lock()?;
        match tables.payment_methods.get_mut(&payment_method.id) {
            Some(stored) => {
                *stored = payment_method.clone();
                Ok(payment_method)
            }
            None => Err(FailureError::from(Error::NotFound)
                .context(format!("Update payment method {} error occurred", payment_method.id))
                .into()),
        }
    }

    fn delete(&self, payment_method_id: PaymentMethodId) -> RepoResult<Option<PaymentMethod>> {
        debug!("Delete payment method with id {}.", payment_method_id);
        let mut tables = self.storage.lock()?;
        Ok(tables.payment_methods.remove(&payment_method_id))
    }
}
