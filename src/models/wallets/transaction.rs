//! Model transactions, immutable ledger entries owned by a wallet
use chrono::{DateTime, Utc};
use failure::Error as FailureError;
use rust_decimal::Decimal;

use errors::Error;
use models::types::{TransactionId, WalletId};
use models::validation_rules::validate_positive_amount;

pub const MAX_DESCRIPTION_LENGTH: usize = 255;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Money added to wallet, e.g. top-up
    Deposit,
    /// Money taken out of wallet
    Withdrawal,
    /// Payment for a service
    Payment,
    /// Receipt of payment for a service
    Earning,
}

impl TransactionType {
    /// Whether the transaction adds money to its wallet
    pub fn is_credit(&self) -> bool {
        match *self {
            TransactionType::Deposit | TransactionType::Earning => true,
            TransactionType::Withdrawal | TransactionType::Payment => false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Transaction {
    id: TransactionId,
    wallet_id: WalletId,
    amount: Decimal,
    transaction_type: TransactionType,
    timestamp: DateTime<Utc>,
    description: String,
    related_wallet_id: Option<WalletId>,
}

impl Transaction {
    /// `related_wallet_id` is the counterpart wallet of a transfer
    pub fn new(
        wallet_id: WalletId,
        amount: Decimal,
        transaction_type: TransactionType,
        description: &str,
        related_wallet_id: Option<WalletId>,
    ) -> Result<Self, FailureError> {
        validate_positive_amount(&amount).map_err(|e| Error::invalid("amount", e))?;
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(Error::Validate(validation_errors!({
                "description": ["length" => format!("Description cannot be longer than {} characters", MAX_DESCRIPTION_LENGTH)]
            })).into());
        }

        Ok(Self {
            id: TransactionId::new(),
            wallet_id,
            amount,
            transaction_type,
            timestamp: Utc::now(),
            description: description.to_string(),
            related_wallet_id,
        })
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn wallet_id(&self) -> WalletId {
        self.wallet_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn related_wallet_id(&self) -> Option<WalletId> {
        self.related_wallet_id
    }

    /// Ownership edge, set only by the wallet that takes the transaction
    pub(crate) fn attach_to(&mut self, wallet_id: WalletId) {
        self.wallet_id = wallet_id;
    }
}

#[cfg(test)]
mod tests {
    use std::iter;

    use serde_json;

    use errors::tests::violation;

    use super::*;

    #[test]
    fn test_new_transaction() {
        let wallet_id = WalletId::new();
        let related = WalletId::new();
        let tx = Transaction::new(wallet_id, Decimal::new(2500, 2), TransactionType::Payment, "Payment for service", Some(related)).unwrap();
        assert_eq!(tx.wallet_id(), wallet_id);
        assert_eq!(tx.amount(), Decimal::new(2500, 2));
        assert_eq!(tx.transaction_type(), TransactionType::Payment);
        assert_eq!(tx.related_wallet_id(), Some(related));
        assert!(tx.timestamp() <= Utc::now());
    }

    #[test]
    fn test_amount_must_be_positive() {
        for amount in &[Decimal::new(0, 0), Decimal::new(-100, 2)] {
            let e = Transaction::new(WalletId::new(), *amount, TransactionType::Deposit, "", None).unwrap_err();
            assert_eq!(violation(&e, "amount").unwrap().0, "positive");
        }
    }

    #[test]
    fn test_description_length() {
        let long: String = iter::repeat('a').take(MAX_DESCRIPTION_LENGTH + 1).collect();
        let e = Transaction::new(WalletId::new(), Decimal::new(1, 0), TransactionType::Deposit, &long, None).unwrap_err();
        assert_eq!(violation(&e, "description").unwrap().0, "length");
    }

    #[test]
    fn test_credit_types() {
        assert!(TransactionType::Deposit.is_credit());
        assert!(TransactionType::Earning.is_credit());
        assert!(!TransactionType::Withdrawal.is_credit());
        assert!(!TransactionType::Payment.is_credit());
    }

    #[test]
    fn test_type_wire_format() {
        assert_eq!(serde_json::to_string(&TransactionType::Withdrawal).unwrap(), "\"WITHDRAWAL\"");
    }
}
