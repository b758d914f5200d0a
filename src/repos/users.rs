//! Users repo
use failure::Error as FailureError;

use errors::Error;
use models::*;
use repos::types::{RepoResult, Storage};

pub struct UsersRepoImpl {
    pub storage: Storage,
    pub user_id: Option<UserId>,
}

pub trait UsersRepo {
    /// Creates new user
    fn create(&self, user: User) -> RepoResult<User>;

    /// Get user
    fn get(&self, user_id: UserId) -> RepoResult<Option<User>>;

    /// Checks if email is already taken, case insensitive
    fn email_exists(&self, email: &str) -> RepoResult<bool>;

    /// Users having role, ordered by full name
    fn find_by_role(&self, role: UserRole) -> RepoResult<Vec<User>>;

    /// Update user
    fn update(&self, user: User) -> RepoResult<User>;
}

impl UsersRepoImpl {
    pub fn new(storage: Storage, user_id: Option<UserId>) -> Self {
        Self { storage, user_id }
    }
}

impl UsersRepo for UsersRepoImpl {
    fn create(&self, user: User) -> RepoResult<User> {
        debug!("Create user {} with role {:?}.", user.id, user.role.kind());
        let mut tables = self.storage.lock()?;
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn get(&self, user_id: UserId) -> RepoResult<Option<User>> {
        debug!("Find user with id {}.", user_id);
        let tables = self.storage.lock()?;
        Ok(tables.users.get(&user_id).cloned())
    }

    fn email_exists(&self, email: &str) -> RepoResult<bool> {
        debug!("Check if email {} exists.", email);
        let email = email.to_lowercase();
        let tables = self.storage.lock()?;
        Ok(tables.users.values().any(|u| u.email.to_lowercase() == email))
    }

    fn find_by_role(&self, role: UserRole) -> RepoResult<Vec<User>> {
        debug!("Find users with role {:?}.", role);
        let tables = self.storage.lock()?;
        let mut users: Vec<User> = tables.users.values().filter(|u| u.has_role(role)).cloned().collect();
        users.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    fn update(&self, user: User) -> RepoResult<User> {
        debug!("Updating user {}.", user.id);
        let mut tables = self.storage.lock()?;
        match tables.users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(user)
            }
            None => Err(FailureError::from(Error::NotFound)
                .context(format!("Update user with id {} error occurred", user.id))
                .into()),
        }
    }
}
