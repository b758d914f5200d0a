pub mod coupons;
pub mod price;

pub use self::coupons::*;
pub use self::price::*;
