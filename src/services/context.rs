use std::sync::Arc;

use config::Config;
use models::UserId;
use repos::repo_factory::ReposFactory;

/// Static context for all app, shared by every request
#[derive(Clone)]
pub struct StaticContext<F: ReposFactory> {
    pub config: Arc<Config>,
    pub repo_factory: F,
}

impl<F: ReposFactory> StaticContext<F> {
    pub fn new(config: Arc<Config>, repo_factory: F) -> Self {
        Self { config, repo_factory }
    }
}

/// Dynamic context for each request, carries the acting user
#[derive(Clone, Debug, Default)]
pub struct DynamicContext {
    pub user_id: Option<UserId>,
}

impl DynamicContext {
    pub fn new(user_id: Option<UserId>) -> Self {
        Self { user_id }
    }
}
