//! Users Services, registration and technician records

use rust_decimal::Decimal;

use errors::Error;
use models::*;
use repos::ReposFactory;
use services::types::ServiceResult;
use services::{fail_with, Service};

pub trait UsersService {
    /// Registers new user
    fn create_user(&self, payload: NewUser) -> ServiceResult<User>;
    /// Returns user by id
    fn get_user(&self, user_id: UserId) -> ServiceResult<Option<User>>;
    /// Returns all technicians
    fn list_technicians(&self) -> ServiceResult<Vec<User>>;
    /// Counts one more finished job for technician
    fn increment_completed_jobs(&self, technician_id: UserId) -> ServiceResult<User>;
    /// Adds to technician's total earnings
    fn add_earnings(&self, technician_id: UserId, amount: Decimal) -> ServiceResult<User>;
}

impl<F: ReposFactory> UsersService for Service<F> {
    fn create_user(&self, payload: NewUser) -> ServiceResult<User> {
        let user_id = self.dynamic_context.user_id;
        let users_repo = self.static_context.repo_factory.create_users_repo(user_id);

        users_repo
            .email_exists(&payload.email)
            .and_then(|exists| {
                if exists {
                    return Err(Error::Validate(validation_errors!({
                        "email": ["email" => "Email already exists"]
                    })).into());
                }
                User::new(payload)
            })
            .and_then(|user| users_repo.create(user))
            .map(|user| {
                info!("User {} registered as {:?}.", user.id, user.role.kind());
                user
            })
            .map_err(|e| e.context("Service Users, create endpoint error occurred.").into())
    }

    fn get_user(&self, user_id: UserId) -> ServiceResult<Option<User>> {
        let current_user_id = self.dynamic_context.user_id;
        let users_repo = self.static_context.repo_factory.create_users_repo(current_user_id);

        users_repo
            .get(user_id)
            .map_err(|e| e.context("Service Users, get endpoint error occurred.").into())
    }

    fn list_technicians(&self) -> ServiceResult<Vec<User>> {
        let user_id = self.dynamic_context.user_id;
        let users_repo = self.static_context.repo_factory.create_users_repo(user_id);

        users_repo
            .find_by_role(UserRole::Technician)
            .map_err(|e| e.context("Service Users, list_technicians endpoint error occurred.").into())
    }

    fn increment_completed_jobs(&self, technician_id: UserId) -> ServiceResult<User> {
        self.update_technician(technician_id, |technician| technician.increment_completed_jobs().map(|_| ()))
            .map_err(|e| e.context("Service Users, increment_completed_jobs endpoint error occurred.").into())
    }

    fn add_earnings(&self, technician_id: UserId, amount: Decimal) -> ServiceResult<User> {
        self.update_technician(technician_id, |technician| technician.add_earnings(amount).map(|_| ()))
            .map_err(|e| e.context("Service Users, add_earnings endpoint error occurred.").into())
    }
}

impl<F: ReposFactory> Service<F> {
    /// Technician records are maintained by the technician themselves or an admin
    fn update_technician<U>(&self, technician_id: UserId, update: U) -> ServiceResult<User>
    where
        U: FnOnce(&mut User) -> ServiceResult<()>,
    {
        let user_id = self.dynamic_context.user_id;
        let users_repo = self.static_context.repo_factory.create_users_repo(user_id);

        self.check_owner_or_admin(technician_id)?;
        let mut technician = users_repo
            .get(technician_id)?
            .ok_or_else(|| fail_with(Error::NotFound, format!("User {} not found", technician_id)))?;
        update(&mut technician)?;
        users_repo.update(technician)
    }
}
