use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use failure::Error as FailureError;

use errors::Error;
use models::*;

/// Repos layer Result
pub type RepoResult<T> = Result<T, FailureError>;

/// Tables of the in-memory store
#[derive(Default, Debug)]
pub struct Tables {
    pub coupons: HashMap<CouponCode, Coupon>,
    pub wallets: HashMap<WalletId, Wallet>,
    pub ledger: Vec<Transaction>,
    pub ledger_ids: HashSet<TransactionId>,
    pub reviews: HashMap<ReviewId, Review>,
    pub reports: HashMap<ReportId, Report>,
    pub users: HashMap<UserId, User>,
    pub payment_methods: HashMap<PaymentMethodId, PaymentMethod>,
    pub service_requests: HashMap<ServiceRequestId, ServiceRequest>,
}

impl Tables {
    /// Copies wallet's transactions that aren't in the ledger yet
    pub fn sync_ledger(&mut self, wallet: &Wallet) {
        for transaction in wallet.transactions() {
            if self.ledger_ids.insert(transaction.id()) {
                self.ledger.push(transaction.clone());
            }
        }
    }

    /// Wallets can be stored together only if each of them exists and appears once
    pub fn check_wallets(&self, wallets: &[Wallet]) -> RepoResult<()> {
        let mut seen = HashSet::new();
        for wallet in wallets {
            if !seen.insert(wallet.id()) {
                return Err(FailureError::from(Error::IllegalState(format!(
                    "Wallet {} is saved twice in one unit of work",
                    wallet.id()
                )))
                .context(format!("Save wallet {} error occurred", wallet.id()))
                .into());
            }
            if !self.wallets.contains_key(&wallet.id()) {
                return Err(FailureError::from(Error::NotFound)
                    .context(format!("Save wallet {} error occurred", wallet.id()))
                    .into());
            }
        }
        Ok(())
    }

    /// Stores checked wallets with their new transactions
    pub fn store_wallets(&mut self, wallets: &[Wallet]) {
        for wallet in wallets {
            self.sync_ledger(wallet);
            self.wallets.insert(wallet.id(), wallet.clone());
        }
    }
}

/// Shared in-memory store, every repo call holds the lock for its whole unit of work
#[derive(Clone, Default)]
pub struct Storage(Arc<Mutex<Tables>>);

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self) -> RepoResult<MutexGuard<Tables>> {
        self.0.lock().map_err(|_| format_err!("Storage lock is poisoned"))
    }
}
