//! Wallets repo. Saving a wallet also appends its new transactions to the ledger
use failure::Error as FailureError;

use errors::Error;
use models::*;
use repos::types::{RepoResult, Storage};

pub struct WalletsRepoImpl {
    pub storage: Storage,
    pub user_id: Option<UserId>,
}

pub trait WalletsRepo {
    /// Creates new wallet together with its opening transactions
    fn create(&self, wallet: Wallet) -> RepoResult<Wallet>;

    /// Get wallet
    fn get(&self, wallet_id: WalletId) -> RepoResult<Option<Wallet>>;

    /// Get wallet of user
    fn get_by_user(&self, user_id: UserId) -> RepoResult<Option<Wallet>>;

    /// Stores wallet and its new transactions as one unit of work
    fn save(&self, wallet: Wallet) -> RepoResult<Wallet>;

    /// Stores several wallets as one unit of work, nothing is written if any of them is missing
    /// or appears twice
    fn save_all(&self, wallets: Vec<Wallet>) -> RepoResult<Vec<Wallet>>;
}

impl WalletsRepoImpl {
    pub fn new(storage: Storage, user_id: Option<UserId>) -> Self {
        Self { storage, user_id }
    }
}

impl WalletsRepo for WalletsRepoImpl {
    fn create(&self, wallet: Wallet) -> RepoResult<Wallet> {
        debug!("User {:?} creates wallet {} for user {}.", self.user_id, wallet.id(), wallet.user_id());
        let mut tables = self.storage.lock()?;
        if tables.wallets.values().any(|w| w.user_id() == wallet.user_id()) {
            return Err(FailureError::from(Error::IllegalState("User already has a wallet".to_string()))
                .context(format!("Create wallet for user {} error occurred", wallet.user_id()))
                .into());
        }
        tables.sync_ledger(&wallet);
        tables.wallets.insert(wallet.id(), wallet.clone());
        Ok(wallet)
    }

    fn get(&self, wallet_id: WalletId) -> RepoResult<Option<Wallet>> {
        debug!("Find wallet with id {}.", wallet_id);
        let tables = self.storage.lock()?;
        Ok(tables.wallets.get(&wallet_id).cloned())
    }

    fn get_by_user(&self, user_id: UserId) -> RepoResult<Option<Wallet>> {
        debug!("Find wallet of user {}.", user_id);
        let tables = self.storage.lock()?;
        Ok(tables.wallets.values().find(|w| w.user_id() == user_id).cloned())
    }

    fn save(&self, wallet: Wallet) -> RepoResult<Wallet> {
        self.save_all(vec![wallet]).and_then(|mut wallets| {
            wallets
                .pop()
                .ok_or_else(|| format_err!("Saved wallet is missing from the result"))
        })
    }

    fn save_all(&self, wallets: Vec<Wallet>) -> RepoResult<Vec<Wallet>> {
        debug!(
            "Saving wallets {:?}.",
            wallets.iter().map(|w| w.id()).collect::<Vec<WalletId>>()
        );
        let mut tables = self.storage.lock()?;
        tables.check_wallets(&wallets)?;
        tables.store_wallets(&wallets);
        Ok(wallets)
    }
}
