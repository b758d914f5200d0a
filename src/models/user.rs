//! Model users and their role-specific records
use failure::Error as FailureError;
use num_traits::Zero;
use rust_decimal::Decimal;
use validator::Validate;

use errors::Error;
use models::types::UserId;
use models::validation_rules::*;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Customer,
    Technician,
}

/// Role together with the data only that role carries
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer {
        address: String,
    },
    Technician {
        address: String,
        completed_jobs: i32,
        total_earnings: Decimal,
    },
}

impl Role {
    pub fn kind(&self) -> UserRole {
        match *self {
            Role::Admin => UserRole::Admin,
            Role::Customer { .. } => UserRole::Customer,
            Role::Technician { .. } => UserRole::Technician,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub phone_number: String,
    pub role: Role,
}

/// Payload for creating users
#[derive(Serialize, Deserialize, Validate, Debug, Clone)]
pub struct NewUser {
    #[validate(length(min = 1, message = "Full name cannot be empty"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(custom = "validate_phone")]
    pub phone_number: String,
    pub role: UserRole,
    pub address: Option<String>,
}

impl User {
    /// Validates payload; customers and technicians must have an address
    pub fn new(payload: NewUser) -> Result<Self, FailureError> {
        payload.validate().map_err(Error::Validate)?;

        let role = match (payload.role, payload.address) {
            (UserRole::Admin, _) => Role::Admin,
            (UserRole::Customer, Some(ref address)) if validate_not_blank(address).is_ok() => Role::Customer {
                address: address.clone(),
            },
            (UserRole::Technician, Some(ref address)) if validate_not_blank(address).is_ok() => Role::Technician {
                address: address.clone(),
                completed_jobs: 0,
                total_earnings: Decimal::zero(),
            },
            _ => {
                return Err(Error::Validate(validation_errors!({
                    "address": ["required" => "Address is required for customers and technicians"]
                })).into())
            }
        };

        Ok(Self {
            id: UserId::new(),
            full_name: payload.full_name,
            email: payload.email,
            password: payload.password,
            phone_number: payload.phone_number,
            role,
        })
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        self.role.kind() == role
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(UserRole::Admin)
    }

    pub fn is_technician(&self) -> bool {
        self.has_role(UserRole::Technician)
    }

    pub fn increment_completed_jobs(&mut self) -> Result<i32, FailureError> {
        let id = self.id;
        match self.role {
            Role::Technician { ref mut completed_jobs, .. } => {
                *completed_jobs = completed_jobs
                    .checked_add(1)
                    .ok_or_else(|| Error::IllegalState(format!("Completed jobs counter of {} overflows", id)))?;
                Ok(*completed_jobs)
            }
            _ => Err(not_a_technician(id)),
        }
    }

    /// Amount must not be negative, returns new total
    pub fn add_earnings(&mut self, amount: Decimal) -> Result<Decimal, FailureError> {
        validate_non_negative_amount(&amount).map_err(|e| Error::invalid("amount", e))?;
        let id = self.id;
        match self.role {
            Role::Technician { ref mut total_earnings, .. } => {
                *total_earnings = total_earnings
                    .checked_add(amount)
                    .ok_or_else(|| Error::IllegalState(format!("Earnings of {} overflow", id)))?;
                Ok(*total_earnings)
            }
            _ => Err(not_a_technician(id)),
        }
    }
}

fn not_a_technician(id: UserId) -> FailureError {
    Error::IllegalState(format!("User {} is not a technician", id)).into()
}
