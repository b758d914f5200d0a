//! Model payment methods customers choose when requesting a repair
use chrono::{DateTime, Utc};
use failure::Error as FailureError;
use validator::Validate;

use errors::Error;
use models::types::PaymentMethodId;
use models::validation_rules::*;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub name: String,
    pub provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for creating payment method
#[derive(Serialize, Deserialize, Validate, Debug, Clone)]
pub struct NewPaymentMethod {
    #[validate(custom = "validate_not_blank")]
    pub name: String,
    #[validate(custom = "validate_not_blank")]
    pub provider: String,
}

/// Payload for updating payment method
#[derive(Serialize, Deserialize, Validate, Debug, Clone, Default)]
pub struct UpdatePaymentMethod {
    #[validate(custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(custom = "validate_not_blank")]
    pub provider: Option<String>,
}

impl PaymentMethod {
    pub fn new(payload: NewPaymentMethod) -> Result<Self, FailureError> {
        payload.validate().map_err(Error::Validate)?;
        Ok(Self {
            id: PaymentMethodId::new(),
            name: payload.name,
            provider: payload.provider,
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    /// Applies present fields, nothing changes if any of them is invalid
    pub fn apply(&mut self, payload: UpdatePaymentMethod) -> Result<(), FailureError> {
        payload.validate().map_err(Error::Validate)?;
        if let Some(name) = payload.name {
            self.name = name;
        }
        if let Some(provider) = payload.provider {
            self.provider = provider;
        }
        self.updated_at = Some(Utc::now());
        Ok(())
    }
}
