//! Models contains all structures that are used in different
//! modules of the app

pub mod coupons;
pub mod payment_method;
pub mod report;
pub mod review;
pub mod service_requests;
pub mod types;
pub mod user;
pub mod validation_rules;
pub mod wallets;

pub use self::coupons::*;
pub use self::payment_method::*;
pub use self::report::*;
pub use self::review::*;
pub use self::service_requests::*;
pub use self::types::*;
pub use self::user::*;
pub use self::validation_rules::*;
pub use self::wallets::*;
