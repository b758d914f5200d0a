//! Model coupons
use chrono::{DateTime, Duration, Months, Utc};
use failure::Error as FailureError;
use rust_decimal::Decimal;

use config::Coupons as CouponsConfig;
use errors::Error;
use models::types::CouponCode;
use models::validation_rules::*;

/// Discount voucher with bounded usage and expiry. Every setter re-runs the same
/// validation as the builder, so a coupon can't be mutated into an invalid state.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Coupon {
    code: CouponCode,
    discount_value: Decimal,
    max_usage: i32,
    usage_count: i32,
    expiry_date: DateTime<Utc>,
}

/// Result of checking whether a coupon can be used right now
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum CouponValidate {
    Valid,
    HasExpired,
    NoActivationsAvailable,
}

/// Payload for creating coupon, absent fields take configured defaults
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct NewCoupon {
    pub discount_value: Option<Decimal>,
    pub max_usage: Option<i32>,
    pub expiry_date: Option<DateTime<Utc>>,
}

/// Payload for updating coupon
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct UpdateCoupon {
    pub discount_value: Option<Decimal>,
    pub max_usage: Option<i32>,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl Coupon {
    pub fn code(&self) -> &CouponCode {
        &self.code
    }

    pub fn discount_value(&self) -> Decimal {
        self.discount_value
    }

    pub fn max_usage(&self) -> i32 {
        self.max_usage
    }

    pub fn usage_count(&self) -> i32 {
        self.usage_count
    }

    pub fn expiry_date(&self) -> DateTime<Utc> {
        self.expiry_date
    }

    pub fn set_code(&mut self, code: CouponCode) {
        self.code = code;
    }

    pub fn set_discount_value(&mut self, discount_value: Decimal) -> Result<(), FailureError> {
        validate_discount_value(&discount_value).map_err(|e| Error::invalid("discount_value", e))?;
        self.discount_value = discount_value;
        Ok(())
    }

    pub fn set_max_usage(&mut self, max_usage: i32) -> Result<(), FailureError> {
        validate_max_usage(max_usage).map_err(|e| Error::invalid("max_usage", e))?;
        if max_usage < self.usage_count {
            return Err(Error::Validate(validation_errors!({
                "max_usage": ["range" => "Max usage cannot be lower than the current usage count"]
            })).into());
        }
        self.max_usage = max_usage;
        Ok(())
    }

    pub fn set_expiry_date(&mut self, expiry_date: DateTime<Utc>) -> Result<(), FailureError> {
        validate_expiry_date(&expiry_date).map_err(|e| Error::invalid("expiry_date", e))?;
        self.expiry_date = expiry_date;
        Ok(())
    }

    /// Applies every present field of the payload; stops at the first invalid one
    pub fn apply(&mut self, payload: UpdateCoupon) -> Result<(), FailureError> {
        if let Some(discount_value) = payload.discount_value {
            self.set_discount_value(discount_value)?;
        }
        if let Some(max_usage) = payload.max_usage {
            self.set_max_usage(max_usage)?;
        }
        if let Some(expiry_date) = payload.expiry_date {
            self.set_expiry_date(expiry_date)?;
        }
        Ok(())
    }

    pub fn check(&self, now: DateTime<Utc>) -> CouponValidate {
        if self.expiry_date <= now {
            return CouponValidate::HasExpired;
        }

        if self.usage_count >= self.max_usage {
            return CouponValidate::NoActivationsAvailable;
        }

        CouponValidate::Valid
    }

    /// Consumes one activation of the coupon
    pub fn redeem(&mut self) -> Result<(), FailureError> {
        match self.check(Utc::now()) {
            CouponValidate::HasExpired => Err(Error::IllegalState("Coupon is expired".to_string()).into()),
            CouponValidate::NoActivationsAvailable => Err(Error::IllegalState("Coupon usage limit reached".to_string()).into()),
            CouponValidate::Valid => {
                self.usage_count += 1;
                debug!("Coupon {} redeemed, {} of {} uses.", self.code, self.usage_count, self.max_usage);
                Ok(())
            }
        }
    }
}

/// Accumulates coupon parameters, validating each one as soon as it is set
#[derive(Debug, Clone)]
pub struct CouponBuilder {
    discount_value: Decimal,
    max_usage: i32,
    expiry_date: DateTime<Utc>,
}

impl Default for CouponBuilder {
    fn default() -> Self {
        Self {
            discount_value: Decimal::new(10, 2),
            max_usage: 5,
            expiry_date: months_from_now(3),
        }
    }
}

impl CouponBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder seeded with configured defaults, which pass the same validators as any other value
    pub fn from_config(config: &CouponsConfig) -> Result<Self, FailureError> {
        Self::default()
            .discount_value(config.default_discount_value())
            .and_then(|builder| builder.max_usage(config.default_max_usage))
            .and_then(|builder| builder.expiry_date(months_from_now(config.default_validity_months)))
            .map_err(|e| e.context("Configured coupon defaults are invalid").into())
    }

    pub fn discount_value(mut self, discount_value: Decimal) -> Result<Self, FailureError> {
        validate_discount_value(&discount_value).map_err(|e| Error::invalid("discount_value", e))?;
        self.discount_value = discount_value;
        Ok(self)
    }

    pub fn max_usage(mut self, max_usage: i32) -> Result<Self, FailureError> {
        validate_max_usage(max_usage).map_err(|e| Error::invalid("max_usage", e))?;
        self.max_usage = max_usage;
        Ok(self)
    }

    pub fn expiry_date(mut self, expiry_date: DateTime<Utc>) -> Result<Self, FailureError> {
        validate_expiry_date(&expiry_date).map_err(|e| Error::invalid("expiry_date", e))?;
        self.expiry_date = expiry_date;
        Ok(self)
    }

    /// Applies every present field of the payload over the current values
    pub fn with_payload(self, payload: NewCoupon) -> Result<Self, FailureError> {
        let mut builder = self;
        if let Some(discount_value) = payload.discount_value {
            builder = builder.discount_value(discount_value)?;
        }
        if let Some(max_usage) = payload.max_usage {
            builder = builder.max_usage(max_usage)?;
        }
        if let Some(expiry_date) = payload.expiry_date {
            builder = builder.expiry_date(expiry_date)?;
        }
        Ok(builder)
    }

    pub fn build(self) -> Coupon {
        Coupon {
            code: CouponCode::generate(),
            discount_value: self.discount_value,
            max_usage: self.max_usage,
            usage_count: 0,
            expiry_date: self.expiry_date,
        }
    }
}

fn months_from_now(months: u32) -> DateTime<Utc> {
    let now = Utc::now();
    now.checked_add_months(Months::new(months))
        .unwrap_or_else(|| now + Duration::days(30 * i64::from(months)))
}
