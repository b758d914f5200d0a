//! Price calculation with an optional coupon applied
use num_traits::Zero;
use rust_decimal::{Decimal, RoundingStrategy};

use models::coupons::Coupon;
use models::types::CouponCode;

/// Price details shown to the customer before payment
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PriceBreakdown {
    pub original_price: Decimal,
    pub discount_amount: Decimal,
    pub final_price: Decimal,
    pub discount_percentage: Decimal,
    pub coupon_code: Option<CouponCode>,
}

impl PriceBreakdown {
    pub fn new(original_price: Decimal, coupon: Option<&Coupon>) -> Self {
        Self {
            original_price,
            discount_amount: calculate_discount_amount(original_price, coupon),
            final_price: calculate_final_price(original_price, coupon),
            discount_percentage: coupon
                .map(|c| c.discount_value() * Decimal::new(100, 0))
                .unwrap_or_else(Decimal::zero),
            coupon_code: coupon.map(|c| c.code().clone()),
        }
    }
}

/// Discount rounded to cents, half away from zero
pub fn calculate_discount_amount(original_price: Decimal, coupon: Option<&Coupon>) -> Decimal {
    match coupon {
        Some(coupon) => (original_price * coupon.discount_value()).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        None => Decimal::zero(),
    }
}

/// Price after discount, never negative
pub fn calculate_final_price(original_price: Decimal, coupon: Option<&Coupon>) -> Decimal {
    let final_price = original_price - calculate_discount_amount(original_price, coupon);
    if final_price < Decimal::zero() {
        Decimal::zero()
    } else {
        final_price
    }
}
