//! Identifiers shared by models, repos and services
use std::fmt;

use uuid::Uuid;

macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                $name(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                $name(id)
            }
        }
    };
}

uuid_id!(UserId);
uuid_id!(WalletId);
uuid_id!(TransactionId);
uuid_id!(ReviewId);
uuid_id!(ReportId);
uuid_id!(PaymentMethodId);
uuid_id!(ServiceRequestId);
uuid_id!(EstimateId);

/// Coupon code, the coupon's primary key
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CouponCode(pub String);

impl CouponCode {
    /// Fresh random code, 32 uppercase hex digits
    pub fn generate() -> Self {
        CouponCode(Uuid::new_v4().simple().to_string().to_uppercase())
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CouponCode {
    fn from(code: String) -> Self {
        CouponCode(code)
    }
}

impl<'a> From<&'a str> for CouponCode {
    fn from(code: &'a str) -> Self {
        CouponCode(code.to_string())
    }
}
