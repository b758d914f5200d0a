//! Model service requests, from the customer's ask to the finished repair.
//!
//! Every step of the lifecycle is a method that either moves the request to its next
//! state or fails with `IllegalState` leaving the request untouched.
use chrono::{DateTime, NaiveDate, Utc};
use failure::Error as FailureError;
use rust_decimal::Decimal;
use validator::Validate;

use errors::Error;
use models::coupons::Coupon;
use models::service_requests::estimate::RepairEstimate;
use models::service_requests::state::ServiceRequestState;
use models::types::*;
use models::validation_rules::*;

/// Item brought in for repair
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Item {
    pub name: String,
    pub condition: String,
    pub issue_description: String,
}

/// Payload for creating or editing service request.
/// Without `technician_id` a technician is picked for the customer.
#[derive(Serialize, Deserialize, Validate, Debug, Clone)]
pub struct NewServiceRequest {
    #[validate(custom = "validate_not_blank")]
    pub name: String,
    #[validate(custom = "validate_not_blank")]
    pub condition: String,
    #[validate(custom = "validate_not_blank")]
    pub issue_description: String,
    #[validate(custom = "validate_not_in_past")]
    pub service_date: NaiveDate,
    pub technician_id: Option<UserId>,
    pub payment_method_id: PaymentMethodId,
    pub coupon_code: Option<CouponCode>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServiceRequest {
    id: ServiceRequestId,
    customer_id: UserId,
    technician_id: UserId,
    item: Item,
    request_date: NaiveDate,
    service_date: NaiveDate,
    payment_method_id: PaymentMethodId,
    coupon_code: Option<CouponCode>,
    estimate: Option<RepairEstimate>,
    report_id: Option<ReportId>,
    paid_amount: Option<Decimal>,
    state: ServiceRequestState,
    updated_at: DateTime<Utc>,
}

impl ServiceRequest {
    /// Pending request of customer, assigned to technician
    pub fn new(customer_id: UserId, technician_id: UserId, payload: NewServiceRequest) -> Result<Self, FailureError> {
        payload.validate().map_err(Error::Validate)?;
        if customer_id == technician_id {
            return Err(Error::IllegalState("Customer cannot repair their own request".to_string()).into());
        }

        Ok(Self {
            id: ServiceRequestId::new(),
            customer_id,
            technician_id,
            item: Item {
                name: payload.name,
                condition: payload.condition,
                issue_description: payload.issue_description,
            },
            request_date: Utc::now().date_naive(),
            service_date: payload.service_date,
            payment_method_id: payload.payment_method_id,
            coupon_code: payload.coupon_code,
            estimate: None,
            report_id: None,
            paid_amount: None,
            state: ServiceRequestState::Pending,
            updated_at: Utc::now(),
        })
    }

    pub fn id(&self) -> ServiceRequestId {
        self.id
    }

    pub fn customer_id(&self) -> UserId {
        self.customer_id
    }

    pub fn technician_id(&self) -> UserId {
        self.technician_id
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn request_date(&self) -> NaiveDate {
        self.request_date
    }

    pub fn service_date(&self) -> NaiveDate {
        self.service_date
    }

    pub fn payment_method_id(&self) -> PaymentMethodId {
        self.payment_method_id
    }

    pub fn coupon_code(&self) -> Option<&CouponCode> {
        self.coupon_code.as_ref()
    }

    pub fn estimate(&self) -> Option<&RepairEstimate> {
        self.estimate.as_ref()
    }

    pub fn report_id(&self) -> Option<ReportId> {
        self.report_id
    }

    pub fn paid_amount(&self) -> Option<Decimal> {
        self.paid_amount
    }

    pub fn state(&self) -> ServiceRequestState {
        self.state
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Both parties of the request
    pub fn involves(&self, user_id: UserId) -> bool {
        self.customer_id == user_id || self.technician_id == user_id
    }

    /// Replaces request details while it is pending or rejected. The assigned technician is kept,
    /// any estimate is dropped and the request starts over as pending.
    pub fn apply(&mut self, payload: NewServiceRequest) -> Result<(), FailureError> {
        if !self.state.is_editable() {
            return Err(illegal_transition("update request", self.state));
        }
        payload.validate().map_err(Error::Validate)?;

        self.item = Item {
            name: payload.name,
            condition: payload.condition,
            issue_description: payload.issue_description,
        };
        self.service_date = payload.service_date;
        self.payment_method_id = payload.payment_method_id;
        self.coupon_code = payload.coupon_code;
        self.estimate = None;
        self.transition(ServiceRequestState::Pending);
        Ok(())
    }

    /// Gives the first estimate or revises the one the customer hasn't answered yet
    pub fn provide_estimate(&mut self, estimate: RepairEstimate) -> Result<(), FailureError> {
        match self.state {
            ServiceRequestState::Pending | ServiceRequestState::Estimated => {
                self.estimate = Some(estimate);
                self.transition(ServiceRequestState::Estimated);
                Ok(())
            }
            state => Err(illegal_transition("provide estimate", state)),
        }
    }

    pub fn accept_estimate(&mut self, feedback: Option<String>) -> Result<(), FailureError> {
        self.answer_estimate("accept estimate", feedback, ServiceRequestState::Accepted)
    }

    pub fn reject_estimate(&mut self, feedback: Option<String>) -> Result<(), FailureError> {
        self.answer_estimate("reject estimate", feedback, ServiceRequestState::Rejected)
    }

    pub fn start_service(&mut self) -> Result<(), FailureError> {
        match self.state {
            ServiceRequestState::Accepted => {
                self.transition(ServiceRequestState::InProgress);
                Ok(())
            }
            state => Err(illegal_transition("start service", state)),
        }
    }

    pub fn complete_service(&mut self) -> Result<(), FailureError> {
        match self.state {
            ServiceRequestState::InProgress => {
                self.transition(ServiceRequestState::Completed);
                Ok(())
            }
            state => Err(illegal_transition("complete service", state)),
        }
    }

    /// Links the report of a completed repair, a request has at most one
    pub fn attach_report(&mut self, report_id: ReportId) -> Result<(), FailureError> {
        if self.state != ServiceRequestState::Completed {
            return Err(illegal_transition("create report", self.state));
        }
        if self.report_id.is_some() {
            return Err(Error::IllegalState(format!("Service request {} already has a report", self.id)).into());
        }
        self.report_id = Some(report_id);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// What the customer owes: the estimate's cost after the coupon, if there is an estimate
    pub fn amount_due(&self, coupon: Option<&Coupon>) -> Option<Decimal> {
        self.estimate.as_ref().map(|estimate| estimate.final_cost(coupon))
    }

    /// Records payment, a request is paid once
    pub fn mark_paid(&mut self, amount: Decimal) -> Result<(), FailureError> {
        if self.paid_amount.is_some() {
            return Err(Error::IllegalState(format!("Service request {} is already paid", self.id)).into());
        }
        self.paid_amount = Some(amount);
        self.updated_at = Utc::now();
        Ok(())
    }

    fn answer_estimate(&mut self, action: &str, feedback: Option<String>, next: ServiceRequestState) -> Result<(), FailureError> {
        if self.state != ServiceRequestState::Estimated {
            return Err(illegal_transition(action, self.state));
        }
        match self.estimate {
            Some(ref mut estimate) => estimate.set_customer_feedback(feedback),
            None => return Err(Error::IllegalState(format!("Cannot {}: service request {} has no estimate", action, self.id)).into()),
        }
        self.transition(next);
        Ok(())
    }

    fn transition(&mut self, next: ServiceRequestState) {
        debug!("Service request {} moves from {} to {}.", self.id, self.state, next);
        self.state = next;
        self.updated_at = Utc::now();
    }
}

fn illegal_transition(action: &str, state: ServiceRequestState) -> FailureError {
    Error::IllegalState(format!("Cannot {} in {} state", action, state)).into()
}
