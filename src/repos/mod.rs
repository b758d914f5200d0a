//! Repos is a module responsible for storing and querying models
pub mod coupons;
pub mod payment_methods;
pub mod repo_factory;
pub mod reports;
pub mod reviews;
pub mod service_requests;
pub mod transactions;
pub mod types;
pub mod users;
pub mod wallets;

pub use self::coupons::*;
pub use self::payment_methods::*;
pub use self::repo_factory::*;
pub use self::reports::*;
pub use self::reviews::*;
pub use self::service_requests::*;
pub use self::transactions::*;
pub use self::types::*;
pub use self::users::*;
pub use self::wallets::*;
