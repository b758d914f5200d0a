pub mod transaction;
pub mod wallet;

pub use self::transaction::*;
pub use self::wallet::*;
