//! Config module contains the business policy of the marketplace: coupon defaults,
//! review rules. Values come from built-in defaults, `config/base.toml`,
//! `config/{RUN_MODE}.toml` and `REPAIRS_*` environment variables, in that order.
use std::env;

use config_crate::{Config as RawConfig, ConfigError, Environment, File};
use rust_decimal::Decimal;

/// Basic settings - coupon defaults and review rules
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub coupons: Coupons,
    pub reviews: Reviews,
}

/// Defaults applied to coupons created without explicit values
#[derive(Debug, Deserialize, Clone)]
pub struct Coupons {
    pub default_discount_percent: i64,
    pub default_max_usage: i32,
    pub default_validity_months: u32,
}

/// Review policy
#[derive(Debug, Deserialize, Clone)]
pub struct Reviews {
    pub edit_window_days: i64,
    pub min_comment_length: usize,
    pub max_comment_length: usize,
}

impl Coupons {
    /// Default discount as a fraction, e.g. `10` percent is `0.10`
    pub fn default_discount_value(&self) -> Decimal {
        Decimal::new(self.default_discount_percent, 2)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            coupons: Coupons {
                default_discount_percent: 10,
                default_max_usage: 5,
                default_validity_months: 3,
            },
            reviews: Reviews {
                edit_window_days: 7,
                min_comment_length: 10,
                max_comment_length: 5000,
            },
        }
    }
}

impl Config {
    /// Creates new app config struct
    /// #Examples
    /// ```
    /// use repairs_lib::config::*;
    ///
    /// let config = Config::new();
    /// ```
    pub fn new() -> Result<Self, ConfigError> {
        let mut s = RawConfig::new();

        s.set_default("coupons.default_discount_percent", 10i64)?;
        s.set_default("coupons.default_max_usage", 5i64)?;
        s.set_default("coupons.default_validity_months", 3i64)?;
        s.set_default("reviews.edit_window_days", 7i64)?;
        s.set_default("reviews.min_comment_length", 10i64)?;
        s.set_default("reviews.max_comment_length", 5000i64)?;

        s.merge(File::with_name("config/base").required(false))?;

        // Note that this file is _optional_
        let env = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        s.merge(File::with_name(&format!("config/{}", env)).required(false))?;

        // Add in settings from the environment (with a prefix of REPAIRS)
        s.merge(Environment::with_prefix("REPAIRS").separator("__"))?;

        s.try_into()
    }
}
