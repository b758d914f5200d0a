use std::borrow::Cow;
use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use num_traits::{One, Zero};
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

fn violation<M: Into<Cow<'static, str>>>(code: &'static str, message: M) -> ValidationError {
    ValidationError {
        code: Cow::from(code),
        message: Some(message.into()),
        params: HashMap::new(),
    }
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    lazy_static! {
        static ref PHONE_VALIDATION_RE: Regex = Regex::new(r"^\d+$").unwrap();
    }

    if PHONE_VALIDATION_RE.is_match(phone) {
        Ok(())
    } else {
        Err(violation("phone", "Phone number must be numeric"))
    }
}

pub fn validate_not_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        Err(violation("blank", "Value cannot be blank"))
    } else {
        Ok(())
    }
}

/// Money amounts moved through a wallet must be strictly positive
pub fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount > Decimal::zero() {
        Ok(())
    } else {
        Err(violation("positive", "Amount must be positive"))
    }
}

pub fn validate_non_negative_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        Err(violation("non_negative", "Amount cannot be negative"))
    } else {
        Ok(())
    }
}

/// Discount is a fraction of the price in `(0, 1]`
pub fn validate_discount_value(discount: &Decimal) -> Result<(), ValidationError> {
    if *discount > Decimal::zero() && *discount <= Decimal::one() {
        Ok(())
    } else {
        Err(violation("range", "Discount must be greater than 0 and at most 1"))
    }
}

pub fn validate_max_usage(max_usage: i32) -> Result<(), ValidationError> {
    if max_usage > 0 {
        Ok(())
    } else {
        Err(violation("range", "Max usage must be greater than 0"))
    }
}

pub fn validate_expiry_date(expiry_date: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *expiry_date > Utc::now() {
        Ok(())
    } else {
        Err(violation("future", "Expiry date must be in the future"))
    }
}

pub fn validate_not_in_future(moment: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *moment > Utc::now() {
        Err(violation("not_future", "Date/time cannot be in the future"))
    } else {
        Ok(())
    }
}

/// Planned work is scheduled for today or later
pub fn validate_not_in_past(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date < Utc::now().date_naive() {
        Err(violation("not_past", "Date cannot be in the past"))
    } else {
        Ok(())
    }
}

pub fn validate_rating(rating: i32) -> Result<(), ValidationError> {
    if rating >= 1 && rating <= 5 {
        Ok(())
    } else {
        Err(violation("range", "Rating must be between 1 and 5"))
    }
}

/// Length in characters, not bytes
pub fn validate_comment_length(comment: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let length = comment.chars().count();
    if length >= min && length <= max {
        Ok(())
    } else {
        Err(violation(
            "length",
            format!("Comment must be between {} and {} characters", min, max),
        ))
    }
}
