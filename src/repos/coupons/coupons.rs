//! Coupons repo, presents CRUD operations with coupons keyed by code
use failure::Error as FailureError;

use errors::Error;
use models::*;
use repos::types::{RepoResult, Storage};

/// Coupons repository, responsible for handling coupon
pub struct CouponsRepoImpl {
    pub storage: Storage,
    pub user_id: Option<UserId>,
}

pub trait CouponsRepo {
    /// Creates new coupon
    fn create(&self, coupon: Coupon) -> RepoResult<Coupon>;

    /// List all coupons
    fn list(&self) -> RepoResult<Vec<Coupon>>;

    /// Get coupon by code
    fn get_by_code(&self, code: &CouponCode) -> RepoResult<Option<Coupon>>;

    /// Update coupon
    fn update(&self, coupon: Coupon) -> RepoResult<Coupon>;

    /// Delete coupon
    fn delete(&self, code: &CouponCode) -> RepoResult<Option<Coupon>>;
}

impl CouponsRepoImpl {
    pub fn new(storage: Storage, user_id: Option<UserId>) -> Self {
        Self { storage, user_id }
    }
}

impl CouponsRepo for CouponsRepoImpl {
    fn create(&self, coupon: Coupon) -> RepoResult<Coupon> {
        debug!("User {:?} creates new coupon {:?}.", self.user_id, coupon);
        let mut tables = self.storage.lock()?;
        if tables.coupons.contains_key(coupon.code()) {
            return Err(FailureError::from(Error::IllegalState(format!("Coupon with code {} already exists", coupon.code())))
                .context(format!("Creates new coupon: {:?} error occurred", coupon))
                .into());
        }
        tables.coupons.insert(coupon.code().clone(), coupon.clone());
        Ok(coupon)
    }

    fn list(&self) -> RepoResult<Vec<Coupon>> {
        debug!("Find all coupons.");
        let tables = self.storage.lock()?;
        let mut coupons: Vec<Coupon> = tables.coupons.values().cloned().collect();
        coupons.sort_by(|a, b| a.code().0.cmp(&b.code().0));
        Ok(coupons)
    }

    fn get_by_code(&self, code: &CouponCode) -> RepoResult<Option<Coupon>> {
        debug!("Find coupon by code {}.", code);
        let tables = self.storage.lock()?;
        Ok(tables.coupons.get(code).cloned())
    }

    fn update(&self, coupon: Coupon) -> RepoResult<Coupon> {
        debug!("Updating coupon {:?}.", coupon);
        let mut tables = self.storage.lock()?;
        match tables.coupons.get_mut(coupon.code()) {
            Some(stored) => {
                *stored = coupon.clone();
                Ok(coupon)
            }
            None => Err(FailureError::from(Error::NotFound)
                .context(format!("Update coupon with code {} error occurred", coupon.code()))
                .into()),
        }
    }

    fn delete(&self, code: &CouponCode) -> RepoResult<Option<Coupon>> {
        debug!("Delete coupon with code {}.", code);
        let mut tables = self.storage.lock()?;
        Ok(tables.coupons.remove(code))
    }
}
