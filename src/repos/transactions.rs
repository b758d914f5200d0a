//! Transactions repo, read side of the wallet ledger
use chrono::{DateTime, Utc};

use models::*;
use repos::types::{RepoResult, Storage};

/// Search transactions, results keep ledger order
#[derive(Clone, Debug)]
pub enum TransactionSearch {
    Wallet(WalletId),
    WalletAndType(WalletId, TransactionType),
    /// Both ends inclusive
    WalletAndPeriod(WalletId, DateTime<Utc>, DateTime<Utc>),
    /// Transactions of the first wallet whose counterpart is the second one
    BetweenWallets(WalletId, WalletId),
}

impl TransactionSearch {
    fn matches(&self, transaction: &Transaction) -> bool {
        match *self {
            TransactionSearch::Wallet(wallet_id) => transaction.wallet_id() == wallet_id,
            TransactionSearch::WalletAndType(wallet_id, transaction_type) => {
                transaction.wallet_id() == wallet_id && transaction.transaction_type() == transaction_type
            }
            TransactionSearch::WalletAndPeriod(wallet_id, from, to) => {
                transaction.wallet_id() == wallet_id && transaction.timestamp() >= from && transaction.timestamp() <= to
            }
            TransactionSearch::BetweenWallets(wallet_id, related_wallet_id) => {
                transaction.wallet_id() == wallet_id && transaction.related_wallet_id() == Some(related_wallet_id)
            }
        }
    }
}

pub struct TransactionsRepoImpl {
    pub storage: Storage,
    pub user_id: Option<UserId>,
}

pub trait TransactionsRepo {
    /// Get transaction
    fn get(&self, transaction_id: TransactionId) -> RepoResult<Option<Transaction>>;

    /// Search transactions
    fn find_by(&self, search: TransactionSearch) -> RepoResult<Vec<Transaction>>;
}

impl TransactionsRepoImpl {
    pub fn new(storage: Storage, user_id: Option<UserId>) -> Self {
        Self { storage, user_id }
    }
}

impl TransactionsRepo for TransactionsRepoImpl {
    fn get(&self, transaction_id: TransactionId) -> RepoResult<Option<Transaction>> {
        debug!("Find transaction with id {}.", transaction_id);
        let tables = self.storage.lock()?;
        Ok(tables.ledger.iter().find(|t| t.id() == transaction_id).cloned())
    }

    fn find_by(&self, search: TransactionSearch) -> RepoResult<Vec<Transaction>> {
        debug!("Get transactions by search: {:?}.", search);
        let tables = self.storage.lock()?;
        Ok(tables.ledger.iter().filter(|t| search.matches(t)).cloned().collect())
    }
}
