//! Model repair estimates technicians give before work starts
use chrono::{Duration, NaiveDate, Utc};
use failure::Error as FailureError;
use rust_decimal::Decimal;

use errors::Error;
use models::coupons::{calculate_discount_amount, calculate_final_price, Coupon};
use models::types::EstimateId;
use models::validation_rules::*;

/// Technician's quote for a repair
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RepairEstimate {
    id: EstimateId,
    cost: Decimal,
    completion_date: NaiveDate,
    notes: Option<String>,
    customer_feedback: Option<String>,
    created_date: NaiveDate,
}

/// Payload for estimate, completion date defaults to tomorrow
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct NewRepairEstimate {
    pub cost: Decimal,
    pub completion_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl RepairEstimate {
    pub fn new(payload: NewRepairEstimate) -> Result<Self, FailureError> {
        validate_positive_amount(&payload.cost).map_err(|e| Error::invalid("cost", e))?;
        let today = Utc::now().date_naive();
        let completion_date = payload.completion_date.unwrap_or_else(|| today + Duration::days(1));
        validate_not_in_past(&completion_date).map_err(|e| Error::invalid("completion_date", e))?;

        Ok(Self {
            id: EstimateId::new(),
            cost: payload.cost,
            completion_date,
            notes: payload.notes,
            customer_feedback: None,
            created_date: today,
        })
    }

    pub fn id(&self) -> EstimateId {
        self.id
    }

    pub fn cost(&self) -> Decimal {
        self.cost
    }

    pub fn completion_date(&self) -> NaiveDate {
        self.completion_date
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_ref().map(|notes| notes.as_str())
    }

    pub fn customer_feedback(&self) -> Option<&str> {
        self.customer_feedback.as_ref().map(|feedback| feedback.as_str())
    }

    pub fn created_date(&self) -> NaiveDate {
        self.created_date
    }

    /// Cost the customer pays once the coupon is applied
    pub fn final_cost(&self, coupon: Option<&Coupon>) -> Decimal {
        calculate_final_price(self.cost, coupon)
    }

    pub fn discount_amount(&self, coupon: Option<&Coupon>) -> Decimal {
        calculate_discount_amount(self.cost, coupon)
    }

    pub(crate) fn set_customer_feedback(&mut self, feedback: Option<String>) {
        self.customer_feedback = feedback;
    }
}

#[cfg(test)]
mod tests {
    use errors::tests::violation;
    use models::coupons::CouponBuilder;

    use super::*;

    fn new_estimate(cents: i64) -> NewRepairEstimate {
        NewRepairEstimate {
            cost: Decimal::new(cents, 2),
            ..Default::default()
        }
    }

    #[test]
    fn test_completion_defaults_to_tomorrow() {
        let estimate = RepairEstimate::new(new_estimate(15000)).unwrap();
        assert_eq!(estimate.completion_date(), Utc::now().date_naive() + Duration::days(1));
        assert_eq!(estimate.cost(), Decimal::new(15000, 2));
        assert!(estimate.customer_feedback().is_none());
    }

    #[test]
    fn test_invalid_estimates() {
        let e = RepairEstimate::new(new_estimate(0)).unwrap_err();
        assert_eq!(violation(&e, "cost").unwrap().0, "positive");

        let e = RepairEstimate::new(NewRepairEstimate {
            completion_date: Some(Utc::now().date_naive() - Duration::days(2)),
            ..new_estimate(100)
        })
        .unwrap_err();
        assert_eq!(violation(&e, "completion_date").unwrap().0, "not_past");
    }

    #[test]
    fn test_final_cost_with_coupon() {
        let estimate = RepairEstimate::new(new_estimate(20000)).unwrap();
        let coupon = CouponBuilder::new()
            .discount_value(Decimal::new(25, 2))
            .unwrap()
            .build();

        assert_eq!(estimate.final_cost(None), Decimal::new(20000, 2));
        assert_eq!(estimate.discount_amount(Some(&coupon)), Decimal::new(5000, 2));
        assert_eq!(estimate.final_cost(Some(&coupon)), Decimal::new(15000, 2));
    }
}
