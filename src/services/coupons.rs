//! Coupons Services, presents CRUD operations with coupons

use chrono::Utc;
use num_traits::Zero;
use rust_decimal::Decimal;

use errors::Error;
use models::*;
use repos::ReposFactory;
use services::types::ServiceResult;
use services::{fail_with, Service};

pub trait CouponsService {
    /// Creates new coupon, absent fields take configured defaults
    fn create_coupon(&self, payload: NewCoupon) -> ServiceResult<Coupon>;
    /// Returns all coupons
    fn list_coupons(&self) -> ServiceResult<Vec<Coupon>>;
    /// Returns coupon by code
    fn get_coupon(&self, code: CouponCode) -> ServiceResult<Option<Coupon>>;
    /// Update coupon, `None` when there's no such coupon
    fn update_coupon(&self, code: CouponCode, payload: UpdateCoupon) -> ServiceResult<Option<Coupon>>;
    /// Deletes coupon, returns the deleted one
    fn delete_coupon(&self, code: CouponCode) -> ServiceResult<Option<Coupon>>;
    /// Consumes one activation of coupon
    fn use_coupon(&self, code: CouponCode) -> ServiceResult<Coupon>;
    /// Validate coupon by coupon code
    fn check_coupon(&self, code: CouponCode) -> ServiceResult<Option<CouponValidate>>;
    /// Price preview, the coupon is not consumed
    fn calculate_price(&self, price: Decimal, code: Option<CouponCode>) -> ServiceResult<PriceBreakdown>;
}

impl<F: ReposFactory> CouponsService for Service<F> {
    fn create_coupon(&self, payload: NewCoupon) -> ServiceResult<Coupon> {
        let user_id = self.dynamic_context.user_id;
        let coupons_repo = self.static_context.repo_factory.create_coupons_repo(user_id);
        let config = &self.static_context.config.coupons;

        CouponBuilder::from_config(config)
            .and_then(|builder| builder.with_payload(payload))
            .map(CouponBuilder::build)
            .and_then(|coupon| coupons_repo.create(coupon))
            .map(|coupon| {
                info!("Coupon {} created, {} uses until {}.", coupon.code(), coupon.max_usage(), coupon.expiry_date());
                coupon
            })
            .map_err(|e| e.context("Service Coupons, create endpoint error occurred.").into())
    }

    fn list_coupons(&self) -> ServiceResult<Vec<Coupon>> {
        let user_id = self.dynamic_context.user_id;
        let coupons_repo = self.static_context.repo_factory.create_coupons_repo(user_id);

        coupons_repo
            .list()
            .map_err(|e| e.context("Service Coupons, list endpoint error occurred.").into())
    }

    fn get_coupon(&self, code: CouponCode) -> ServiceResult<Option<Coupon>> {
        let user_id = self.dynamic_context.user_id;
        let coupons_repo = self.static_context.repo_factory.create_coupons_repo(user_id);

        coupons_repo
            .get_by_code(&code)
            .map_err(|e| e.context("Service Coupons, get_coupon endpoint error occurred.").into())
    }

    fn update_coupon(&self, code: CouponCode, payload: UpdateCoupon) -> ServiceResult<Option<Coupon>> {
        let user_id = self.dynamic_context.user_id;
        let coupons_repo = self.static_context.repo_factory.create_coupons_repo(user_id);

        coupons_repo
            .get_by_code(&code)
            .and_then(|coupon| match coupon {
                Some(mut coupon) => {
                    coupon.apply(payload)?;
                    coupons_repo.update(coupon).map(Some)
                }
                None => Ok(None),
            })
            .map_err(|e| e.context("Service Coupons, update_coupon endpoint error occurred.").into())
    }

    fn delete_coupon(&self, code: CouponCode) -> ServiceResult<Option<Coupon>> {
        let user_id = self.dynamic_context.user_id;
        let coupons_repo = self.static_context.repo_factory.create_coupons_repo(user_id);

        coupons_repo
            .delete(&code)
            .map_err(|e| e.context("Service Coupons, delete_coupon endpoint error occurred.").into())
    }

    fn use_coupon(&self, code: CouponCode) -> ServiceResult<Coupon> {
        let user_id = self.dynamic_context.user_id;
        let coupons_repo = self.static_context.repo_factory.create_coupons_repo(user_id);

        coupons_repo
            .get_by_code(&code)
            .and_then(|coupon| coupon.ok_or_else(|| fail_with(Error::NotFound, format!("Coupon {} not found", code))))
            .and_then(|mut coupon| {
                coupon.redeem().map_err(|e| {
                    warn!("Coupon {} rejected: {}", coupon.code(), e);
                    e
                })?;
                coupons_repo.update(coupon)
            })
            .map_err(|e| e.context("Service Coupons, use_coupon endpoint error occurred.").into())
    }

    fn check_coupon(&self, code: CouponCode) -> ServiceResult<Option<CouponValidate>> {
        let user_id = self.dynamic_context.user_id;
        let coupons_repo = self.static_context.repo_factory.create_coupons_repo(user_id);

        coupons_repo
            .get_by_code(&code)
            .map(|coupon| coupon.map(|c| c.check(Utc::now())))
            .map_err(|e| e.context("Service Coupons, check_coupon endpoint error occurred.").into())
    }

    fn calculate_price(&self, price: Decimal, code: Option<CouponCode>) -> ServiceResult<PriceBreakdown> {
        self.price_breakdown(price, code)
            .map(|breakdown| {
                if breakdown.discount_amount > Decimal::zero() {
                    debug!("Price {} discounted to {}.", breakdown.original_price, breakdown.final_price);
                }
                breakdown
            })
            .map_err(|e| e.context("Service Coupons, calculate_price endpoint error occurred.").into())
    }
}

impl<F: ReposFactory> Service<F> {
    fn price_breakdown(&self, price: Decimal, code: Option<CouponCode>) -> ServiceResult<PriceBreakdown> {
        validate_non_negative_amount(&price).map_err(|e| Error::invalid("price", e))?;

        let code = match code {
            Some(code) => code,
            None => return Ok(PriceBreakdown::new(price, None)),
        };

        let user_id = self.dynamic_context.user_id;
        let coupons_repo = self.static_context.repo_factory.create_coupons_repo(user_id);
        let coupon = coupons_repo
            .get_by_code(&code)?
            .ok_or_else(|| fail_with(Error::NotFound, format!("Coupon {} not found", code)))?;

        match coupon.check(Utc::now()) {
            CouponValidate::Valid => Ok(PriceBreakdown::new(price, Some(&coupon))),
            CouponValidate::HasExpired => Err(Error::IllegalState("Coupon is expired".to_string()).into()),
            CouponValidate::NoActivationsAvailable => Err(Error::IllegalState("Coupon usage limit reached".to_string()).into()),
        }
    }
}
