use crate::config::Config;
use crate::store::{TaskStore, UserStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub tasks: Arc<dyn TaskStore>,
    pub users: Arc<dyn UserStore>,
    pub config: Config,
}

impl AppState {
    /// Serve both users and tasks from a single backend.
    pub fn with_store<S>(store: Arc<S>, config: Config) -> Self
    where
        S: TaskStore + UserStore + 'static,
    {
        AppState {
            tasks: store.clone(),
            users: store,
            config,
        }
    }
}
