//! Wallets Services, balances and money movement between users

use num_traits::Zero;
use rust_decimal::Decimal;

use errors::Error;
use models::*;
use repos::{ReposFactory, Settlement};
use services::types::ServiceResult;
use services::{fail_with, Service};

/// Both sides of a processed service payment
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServicePayment {
    pub payment: Transaction,
    pub earning: Transaction,
}

pub trait WalletsService {
    /// Creates wallet for user, a positive initial balance is recorded as a deposit
    fn create_wallet(&self, user_id: UserId, initial_balance: Decimal) -> ServiceResult<Wallet>;
    /// Returns wallet by id
    fn get_wallet(&self, wallet_id: WalletId) -> ServiceResult<Option<Wallet>>;
    /// Returns wallet of user
    fn get_wallet_by_user(&self, user_id: UserId) -> ServiceResult<Option<Wallet>>;
    /// Returns current balance
    fn get_balance(&self, wallet_id: WalletId) -> ServiceResult<Decimal>;
    /// Adds money to wallet
    fn deposit(&self, wallet_id: WalletId, amount: Decimal, description: Option<String>) -> ServiceResult<Wallet>;
    /// Takes money out of wallet
    fn withdraw(&self, wallet_id: WalletId, amount: Decimal, description: Option<String>) -> ServiceResult<Wallet>;
    /// Moves payment for a service request from customer's wallet to technician's wallet and adds it
    /// to the technician's earnings, all stored together with the request marked as paid
    fn process_service_payment(
        &self,
        customer_id: UserId,
        technician_id: UserId,
        amount: Decimal,
        service_request_id: ServiceRequestId,
    ) -> ServiceResult<ServicePayment>;
}

impl<F: ReposFactory> WalletsService for Service<F> {
    fn create_wallet(&self, user_id: UserId, initial_balance: Decimal) -> ServiceResult<Wallet> {
        let current_user_id = self.dynamic_context.user_id;
        let users_repo = self.static_context.repo_factory.create_users_repo(current_user_id);
        let wallets_repo = self.static_context.repo_factory.create_wallets_repo(current_user_id);

        self.check_owner_or_admin(user_id)
            .and_then(|_| {
                let user = users_repo
                    .get(user_id)?
                    .ok_or_else(|| fail_with(Error::NotFound, format!("User {} not found", user_id)))?;
                if user.is_admin() {
                    return Err(fail_with(Error::Forbidden, "Admins cannot own wallets"));
                }
                if wallets_repo.get_by_user(user_id)?.is_some() {
                    return Err(Error::IllegalState("User already has a wallet".to_string()).into());
                }
                validate_non_negative_amount(&initial_balance).map_err(|e| Error::invalid("initial_balance", e))?;

                let mut wallet = Wallet::new(user_id);
                if initial_balance > Decimal::zero() {
                    wallet.record(TransactionType::Deposit, initial_balance, "Initial deposit", None)?;
                }
                wallets_repo.create(wallet)
            })
            .map(|wallet| {
                info!("Wallet {} created for user {} with balance {}.", wallet.id(), user_id, wallet.balance());
                wallet
            })
            .map_err(|e| e.context("Service Wallets, create endpoint error occurred.").into())
    }

    fn get_wallet(&self, wallet_id: WalletId) -> ServiceResult<Option<Wallet>> {
        let user_id = self.dynamic_context.user_id;
        let wallets_repo = self.static_context.repo_factory.create_wallets_repo(user_id);

        wallets_repo
            .get(wallet_id)
            .and_then(|wallet| {
                if let Some(ref wallet) = wallet {
                    self.check_owner_or_admin(wallet.user_id())?;
                }
                Ok(wallet)
            })
            .map_err(|e| e.context("Service Wallets, get_wallet endpoint error occurred.").into())
    }

    fn get_wallet_by_user(&self, user_id: UserId) -> ServiceResult<Option<Wallet>> {
        let current_user_id = self.dynamic_context.user_id;
        let wallets_repo = self.static_context.repo_factory.create_wallets_repo(current_user_id);

        self.check_owner_or_admin(user_id)
            .and_then(|_| wallets_repo.get_by_user(user_id))
            .map_err(|e| e.context("Service Wallets, get_wallet_by_user endpoint error occurred.").into())
    }

    fn get_balance(&self, wallet_id: WalletId) -> ServiceResult<Decimal> {
        self.owned_wallet(wallet_id)
            .map(|wallet| wallet.balance())
            .map_err(|e| e.context("Service Wallets, get_balance endpoint error occurred.").into())
    }

    fn deposit(&self, wallet_id: WalletId, amount: Decimal, description: Option<String>) -> ServiceResult<Wallet> {
        let user_id = self.dynamic_context.user_id;
        let wallets_repo = self.static_context.repo_factory.create_wallets_repo(user_id);
        let description = description.unwrap_or_else(|| "Deposit".to_string());

        self.owned_wallet(wallet_id)
            .and_then(|mut wallet| {
                wallet.record(TransactionType::Deposit, amount, &description, None)?;
                wallets_repo.save(wallet)
            })
            .map(|wallet| {
                info!("Deposited {} to wallet {}, balance {}.", amount, wallet_id, wallet.balance());
                wallet
            })
            .map_err(|e| e.context("Service Wallets, deposit endpoint error occurred.").into())
    }

    fn withdraw(&self, wallet_id: WalletId, amount: Decimal, description: Option<String>) -> ServiceResult<Wallet> {
        let user_id = self.dynamic_context.user_id;
        let wallets_repo = self.static_context.repo_factory.create_wallets_repo(user_id);
        let description = description.unwrap_or_else(|| "Withdrawal".to_string());

        self.owned_wallet(wallet_id)
            .and_then(|mut wallet| {
                wallet.record(TransactionType::Withdrawal, amount, &description, None)?;
                wallets_repo.save(wallet)
            })
            .map(|wallet| {
                info!("Withdrew {} from wallet {}, balance {}.", amount, wallet_id, wallet.balance());
                wallet
            })
            .map_err(|e| e.context("Service Wallets, withdraw endpoint error occurred.").into())
    }

    fn process_service_payment(
        &self,
        customer_id: UserId,
        technician_id: UserId,
        amount: Decimal,
        service_request_id: ServiceRequestId,
    ) -> ServiceResult<ServicePayment> {
        let user_id = self.dynamic_context.user_id;
        let service_requests_repo = self.static_context.repo_factory.create_service_requests_repo(user_id);

        check_distinct_parties(customer_id, technician_id)
            .and_then(|_| self.check_owner_or_admin(customer_id))
            .and_then(|_| {
                let mut service_request = service_requests_repo
                    .get(service_request_id)?
                    .ok_or_else(|| fail_with(Error::NotFound, format!("Service request {} not found", service_request_id)))?;
                if service_request.customer_id() != customer_id || service_request.technician_id() != technician_id {
                    return Err(Error::IllegalState(format!(
                        "Service request {} is not between customer {} and technician {}",
                        service_request_id, customer_id, technician_id
                    ))
                    .into());
                }
                let mut technician = self.technician(technician_id)?;
                let previous_state = service_request.state();

                let (wallets, payment) = self.charge_for_service(&mut service_request, &mut technician, amount)?;
                service_requests_repo.settle(Settlement {
                    service_request,
                    previous_state,
                    wallets,
                    users: vec![technician],
                })?;
                Ok(payment)
            })
            .map(|payment| {
                info!(
                    "Service request {} paid: {} from customer {} to technician {}.",
                    service_request_id, amount, customer_id, technician_id
                );
                payment
            })
            .map_err(|e| e.context("Service Wallets, process_service_payment endpoint error occurred.").into())
    }
}

impl<F: ReposFactory> Service<F> {
    /// Existing wallet the acting user may operate on
    pub(crate) fn owned_wallet(&self, wallet_id: WalletId) -> ServiceResult<Wallet> {
        let user_id = self.dynamic_context.user_id;
        let wallets_repo = self.static_context.repo_factory.create_wallets_repo(user_id);

        let wallet = wallets_repo
            .get(wallet_id)?
            .ok_or_else(|| fail_with(Error::NotFound, format!("Wallet {} not found", wallet_id)))?;
        self.check_owner_or_admin(wallet.user_id())?;
        Ok(wallet)
    }

    /// Moves `amount` from the customer's wallet to the technician's, adds it to the technician's
    /// earnings and marks the request paid. Nothing is stored, the caller settles the returned wallets.
    pub(crate) fn charge_for_service(
        &self,
        service_request: &mut ServiceRequest,
        technician: &mut User,
        amount: Decimal,
    ) -> ServiceResult<(Vec<Wallet>, ServicePayment)> {
        let user_id = self.dynamic_context.user_id;
        let wallets_repo = self.static_context.repo_factory.create_wallets_repo(user_id);
        let customer_id = service_request.customer_id();
        check_distinct_parties(customer_id, technician.id)?;

        let mut customer_wallet = wallets_repo
            .get_by_user(customer_id)?
            .ok_or_else(|| fail_with(Error::NotFound, format!("Wallet of customer {} not found", customer_id)))?;
        let mut technician_wallet = wallets_repo
            .get_by_user(technician.id)?
            .ok_or_else(|| fail_with(Error::NotFound, format!("Wallet of technician {} not found", technician.id)))?;

        let payment = customer_wallet.record(
            TransactionType::Payment,
            amount,
            &format!("Payment for service #{}", service_request.id()),
            Some(technician_wallet.id()),
        )?;
        let earning = technician_wallet.record(
            TransactionType::Earning,
            amount,
            &format!("Payment received for service #{}", service_request.id()),
            Some(customer_wallet.id()),
        )?;
        technician.add_earnings(amount)?;
        service_request.mark_paid(amount)?;

        Ok((vec![customer_wallet, technician_wallet], ServicePayment { payment, earning }))
    }
}

/// Money never moves from a user to themselves
fn check_distinct_parties(customer_id: UserId, technician_id: UserId) -> ServiceResult<()> {
    if customer_id == technician_id {
        Err(Error::IllegalState(format!("User {} cannot pay themselves for a service", customer_id)).into())
    } else {
        Ok(())
    }
}
