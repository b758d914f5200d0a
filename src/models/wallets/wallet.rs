//! Model wallets, per-user balance with an append-only transaction history
use chrono::{DateTime, Utc};
use failure::Error as FailureError;
use num_traits::Zero;
use rust_decimal::Decimal;

use errors::Error;
use models::types::{UserId, WalletId};
use models::validation_rules::*;
use models::wallets::{Transaction, TransactionType};

/// Balance never goes below zero; failed operations leave it untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Wallet {
    id: WalletId,
    user_id: UserId,
    balance: Decimal,
    transactions: Vec<Transaction>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Creates new empty wallet for user
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: WalletId::new(),
            user_id,
            balance: Decimal::zero(),
            transactions: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    /// Wallet with an opening balance that has no ledger entry behind it
    pub fn with_balance(user_id: UserId, balance: Decimal) -> Result<Self, FailureError> {
        validate_non_negative_amount(&balance).map_err(|e| Error::invalid("balance", e))?;
        let mut wallet = Self::new(user_id);
        wallet.balance = balance;
        Ok(wallet)
    }

    pub fn id(&self) -> WalletId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Adds amount to the balance and returns the new balance.
    /// Doesn't record a transaction, see `record`.
    pub fn deposit(&mut self, amount: Decimal) -> Result<Decimal, FailureError> {
        validate_positive_amount(&amount).map_err(|e| Error::invalid("amount", e))?;
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| Error::IllegalState(format!("Deposit of {} overflows wallet {}", amount, self.id)))?;
        self.set_balance(balance);
        Ok(self.balance)
    }

    /// Subtracts amount from the balance and returns the new balance.
    /// Doesn't record a transaction, see `record`.
    pub fn withdraw(&mut self, amount: Decimal) -> Result<Decimal, FailureError> {
        validate_positive_amount(&amount).map_err(|e| Error::invalid("amount", e))?;
        if self.balance < amount {
            warn!("Withdrawal of {} from wallet {} rejected, balance is {}.", amount, self.id, self.balance);
            return Err(Error::InsufficientFunds.into());
        }
        let balance = self.balance - amount;
        self.set_balance(balance);
        Ok(self.balance)
    }

    /// Appends transaction to the history and makes this wallet its owner.
    /// Balance is not adjusted.
    pub fn add_transaction(&mut self, mut transaction: Transaction) {
        transaction.attach_to(self.id);
        self.transactions.push(transaction);
    }

    /// Moves money and records the matching transaction in one step: either both the
    /// balance and the history change, or neither does.
    pub fn record(
        &mut self,
        transaction_type: TransactionType,
        amount: Decimal,
        description: &str,
        related_wallet_id: Option<WalletId>,
    ) -> Result<Transaction, FailureError> {
        let transaction = Transaction::new(self.id, amount, transaction_type, description, related_wallet_id)?;

        if transaction_type.is_credit() {
            self.deposit(amount)?;
        } else {
            self.withdraw(amount)?;
        }

        debug!(
            "Wallet {} recorded {:?} of {}, balance {}.",
            self.id, transaction_type, amount, self.balance
        );
        self.transactions.push(transaction.clone());
        Ok(transaction)
    }

    fn set_balance(&mut self, balance: Decimal) {
        self.balance = balance;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use errors::tests::violation;
    use errors::{error_kind, Error};

    use super::*;

    fn wallet_with(cents: i64) -> Wallet {
        Wallet::with_balance(UserId::new(), Decimal::new(cents, 2)).unwrap()
    }

    #[test]
    fn test_new_wallet_is_empty() {
        let wallet = Wallet::new(UserId::new());
        assert_eq!(wallet.balance(), Decimal::zero());
        assert!(wallet.transactions().is_empty());
    }

    #[test]
    fn test_negative_opening_balance() {
        let e = Wallet::with_balance(UserId::new(), Decimal::new(-1, 2)).unwrap_err();
        assert!(violation(&e, "balance").is_some());
    }

    #[test]
    fn test_deposit_requires_positive_amount() {
        let mut wallet = wallet_with(10000);
        for amount in &[Decimal::new(-1, 0), Decimal::zero()] {
            let e = wallet.deposit(*amount).unwrap_err();
            assert_eq!(violation(&e, "amount").unwrap().0, "positive");
        }
        assert_eq!(wallet.balance(), Decimal::new(10000, 2));
    }

    #[test]
    fn test_withdraw_more_than_balance() {
        let mut wallet = wallet_with(10000);
        let e = wallet.withdraw(Decimal::new(15000, 2)).unwrap_err();
        match error_kind(&e) {
            Some(Error::InsufficientFunds) => {}
            other => panic!("unexpected kind {:?}", other),
        }
        assert_eq!(wallet.balance(), Decimal::new(10000, 2));

        assert_eq!(wallet.withdraw(Decimal::new(5000, 2)).unwrap(), Decimal::new(5000, 2));
        assert_eq!(wallet.balance(), Decimal::new(5000, 2));
    }

    #[test]
    fn test_withdraw_whole_balance() {
        let mut wallet = wallet_with(4250);
        assert_eq!(wallet.withdraw(Decimal::new(4250, 2)).unwrap(), Decimal::zero());
    }

    #[test]
    fn test_deposit_then_withdraw_restores_balance() {
        let mut wallet = wallet_with(1234);
        let amount = Decimal::new(9999, 2);
        wallet.deposit(amount).unwrap();
        wallet.withdraw(amount).unwrap();
        assert_eq!(wallet.balance(), Decimal::new(1234, 2));
    }

    #[test]
    fn test_add_transaction_takes_ownership() {
        let mut wallet = wallet_with(0);
        let foreign = Transaction::new(WalletId::new(), Decimal::new(1, 0), TransactionType::Deposit, "top-up", None).unwrap();
        wallet.add_transaction(foreign);
        assert_eq!(wallet.transactions().len(), 1);
        assert_eq!(wallet.transactions()[0].wallet_id(), wallet.id());
        assert_eq!(wallet.balance(), Decimal::zero());
    }

    #[test]
    fn test_record_moves_money_and_history_together() {
        let mut wallet = wallet_with(10000);
        let tx = wallet.record(TransactionType::Payment, Decimal::new(3000, 2), "Payment for service", None).unwrap();
        assert_eq!(wallet.balance(), Decimal::new(7000, 2));
        assert_eq!(wallet.transactions(), &[tx.clone()][..]);
        assert_eq!(tx.wallet_id(), wallet.id());

        wallet.record(TransactionType::Earning, Decimal::new(500, 2), "Refund", None).unwrap();
        assert_eq!(wallet.balance(), Decimal::new(7500, 2));
        assert_eq!(wallet.transactions().len(), 2);
    }

    #[test]
    fn test_failed_record_changes_nothing() {
        let mut wallet = wallet_with(1000);
        assert!(wallet.record(TransactionType::Withdrawal, Decimal::new(1001, 2), "Too much", None).is_err());
        assert!(wallet.record(TransactionType::Deposit, Decimal::zero(), "Nothing", None).is_err());
        assert_eq!(wallet.balance(), Decimal::new(1000, 2));
        assert!(wallet.transactions().is_empty());
    }
}
