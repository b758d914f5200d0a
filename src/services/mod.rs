//! Services is a core layer for the app business logic like
//! validation, authorization, etc.

pub mod context;
pub mod coupons;
pub mod estimates;
pub mod payment_methods;
pub mod reports;
pub mod reviews;
pub mod service_requests;
pub mod transactions;
pub mod types;
pub mod users;
pub mod wallets;

pub use self::context::*;
pub use self::coupons::*;
pub use self::estimates::*;
pub use self::payment_methods::*;
pub use self::reports::*;
pub use self::reviews::*;
pub use self::service_requests::*;
pub use self::transactions::*;
pub use self::types::*;
pub use self::users::*;
pub use self::wallets::*;

use std::fmt::Display;

use failure::Error as FailureError;

use errors::Error;
use models::*;
use repos::ReposFactory;

/// Service
pub struct Service<F: ReposFactory> {
    pub static_context: StaticContext<F>,
    pub dynamic_context: DynamicContext,
}

impl<F: ReposFactory> Service<F> {
    /// Create a new service
    pub fn new(static_context: StaticContext<F>, dynamic_context: DynamicContext) -> Self {
        Self {
            static_context,
            dynamic_context,
        }
    }

    /// Acting user, unauthorized requests are forbidden
    fn current_user(&self) -> ServiceResult<User> {
        let user_id = self.dynamic_context.user_id.ok_or_else(|| fail_with(Error::Forbidden, "Request has no user"))?;
        let users_repo = self.static_context.repo_factory.create_users_repo(Some(user_id));
        users_repo
            .get(user_id)?
            .ok_or_else(|| fail_with(Error::Forbidden, format!("Acting user {} not found", user_id)))
    }

    /// Acting user, who must be an admin
    fn check_admin(&self) -> ServiceResult<User> {
        let user = self.current_user()?;
        if user.is_admin() {
            Ok(user)
        } else {
            Err(fail_with(Error::Forbidden, format!("User {} is not an admin", user.id)))
        }
    }

    /// Fails with `Forbidden` unless the acting user is `owner_id` or an admin
    fn check_owner_or_admin(&self, owner_id: UserId) -> ServiceResult<()> {
        if self.dynamic_context.user_id == Some(owner_id) {
            return Ok(());
        }
        let user = self.current_user()?;
        if user.is_admin() {
            Ok(())
        } else {
            warn!("User {} is denied access to resources of user {}.", user.id, owner_id);
            Err(fail_with(Error::Forbidden, format!("User {} does not own the resource", user.id)))
        }
    }
}

/// Domain error with a message explaining it
fn fail_with<D: Display + Send + Sync + 'static>(kind: Error, message: D) -> FailureError {
    FailureError::from(kind).context(message).into()
}
