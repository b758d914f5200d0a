//! Transactions Services, read-only queries over wallet ledgers

use chrono::{DateTime, Utc};

use errors::Error;
use models::*;
use repos::{ReposFactory, TransactionSearch};
use services::types::ServiceResult;
use services::{fail_with, Service};

pub trait TransactionsService {
    /// Returns transaction by id
    fn get_transaction(&self, transaction_id: TransactionId) -> ServiceResult<Option<Transaction>>;
    /// Returns all transactions of wallet
    fn transactions_for_wallet(&self, wallet_id: WalletId) -> ServiceResult<Vec<Transaction>>;
    /// Returns transactions of wallet having type
    fn transactions_for_wallet_by_type(&self, wallet_id: WalletId, transaction_type: TransactionType) -> ServiceResult<Vec<Transaction>>;
    /// Returns transactions of wallet made between `from` and `to`, both inclusive
    fn transactions_for_wallet_in_period(
        &self,
        wallet_id: WalletId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ServiceResult<Vec<Transaction>>;
    /// Returns transactions of wallet whose counterpart is `related_wallet_id`
    fn transactions_between(&self, wallet_id: WalletId, related_wallet_id: WalletId) -> ServiceResult<Vec<Transaction>>;
}

impl<F: ReposFactory> TransactionsService for Service<F> {
    fn get_transaction(&self, transaction_id: TransactionId) -> ServiceResult<Option<Transaction>> {
        let user_id = self.dynamic_context.user_id;
        let transactions_repo = self.static_context.repo_factory.create_transactions_repo(user_id);

        transactions_repo
            .get(transaction_id)
            .and_then(|transaction| {
                if let Some(ref transaction) = transaction {
                    self.owned_wallet(transaction.wallet_id())?;
                }
                Ok(transaction)
            })
            .map_err(|e| e.context("Service Transactions, get_transaction endpoint error occurred.").into())
    }

    fn transactions_for_wallet(&self, wallet_id: WalletId) -> ServiceResult<Vec<Transaction>> {
        self.search_transactions(wallet_id, TransactionSearch::Wallet(wallet_id))
            .map_err(|e| e.context("Service Transactions, transactions_for_wallet endpoint error occurred.").into())
    }

    fn transactions_for_wallet_by_type(&self, wallet_id: WalletId, transaction_type: TransactionType) -> ServiceResult<Vec<Transaction>> {
        self.search_transactions(wallet_id, TransactionSearch::WalletAndType(wallet_id, transaction_type))
            .map_err(|e| {
                e.context("Service Transactions, transactions_for_wallet_by_type endpoint error occurred.")
                    .into()
            })
    }

    fn transactions_for_wallet_in_period(
        &self,
        wallet_id: WalletId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ServiceResult<Vec<Transaction>> {
        if from > to {
            return Err(Error::Validate(validation_errors!({
                "from": ["range" => "Start of period must not be after its end"]
            })).into());
        }

        self.search_transactions(wallet_id, TransactionSearch::WalletAndPeriod(wallet_id, from, to))
            .map_err(|e| {
                e.context("Service Transactions, transactions_for_wallet_in_period endpoint error occurred.")
                    .into()
            })
    }

    fn transactions_between(&self, wallet_id: WalletId, related_wallet_id: WalletId) -> ServiceResult<Vec<Transaction>> {
        let user_id = self.dynamic_context.user_id;
        let wallets_repo = self.static_context.repo_factory.create_wallets_repo(user_id);

        wallets_repo
            .get(related_wallet_id)
            .and_then(|related| related.ok_or_else(|| fail_with(Error::NotFound, format!("Wallet {} not found", related_wallet_id))))
            .and_then(|_| self.search_transactions(wallet_id, TransactionSearch::BetweenWallets(wallet_id, related_wallet_id)))
            .map_err(|e| e.context("Service Transactions, transactions_between endpoint error occurred.").into())
    }
}

impl<F: ReposFactory> Service<F> {
    fn search_transactions(&self, wallet_id: WalletId, search: TransactionSearch) -> ServiceResult<Vec<Transaction>> {
        let user_id = self.dynamic_context.user_id;
        let transactions_repo = self.static_context.repo_factory.create_transactions_repo(user_id);

        self.owned_wallet(wallet_id)?;
        transactions_repo.find_by(search)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    use errors::status_code;
    use errors::tests::violation;
    use models::*;
    use repos::repo_factory::tests::*;
    use services::transactions::TransactionsService;
    use services::wallets::WalletsService;

    #[test]
    fn test_period_is_inclusive() {
        let service = create_service(Some(MOCK_USER_ID));
        let wallet = service.create_wallet(MOCK_USER_ID, Decimal::new(500, 2)).unwrap();
        let wallet = service.deposit(wallet.id(), Decimal::new(100, 2), None).unwrap();
        let first = wallet.transactions()[0].timestamp();
        let last = wallet.transactions()[1].timestamp();

        let found = service.transactions_for_wallet_in_period(wallet.id(), first, last).unwrap();
        assert_eq!(found.len(), 2);

        let found = service
            .transactions_for_wallet_in_period(wallet.id(), last + Duration::seconds(1), Utc::now() + Duration::days(1))
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_reversed_period() {
        let service = create_service(Some(MOCK_USER_ID));
        let wallet = service.create_wallet(MOCK_USER_ID, Decimal::new(0, 0)).unwrap();
        let now = Utc::now();
        let e = service
            .transactions_for_wallet_in_period(wallet.id(), now, now - Duration::days(1))
            .unwrap_err();
        assert_eq!(violation(&e, "from").unwrap().0, "range");
    }

    #[test]
    fn test_unknown_wallet() {
        let service = create_service(Some(MOCK_USER_ID));
        let e = service.transactions_for_wallet(WalletId::new()).unwrap_err();
        assert_eq!(status_code(&e), 404);
    }

    #[test]
    fn test_get_transaction() {
        let service = create_service(Some(MOCK_USER_ID));
        let wallet = service.create_wallet(MOCK_USER_ID, Decimal::new(700, 2)).unwrap();
        let transaction = wallet.transactions()[0].clone();
        assert_eq!(service.get_transaction(transaction.id()).unwrap(), Some(transaction));
        assert_eq!(service.get_transaction(TransactionId::new()).unwrap(), None);
    }
}
