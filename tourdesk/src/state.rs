//! Shared application state

use std::sync::Arc;

use crate::config::Config;
use crate::store::Store;

/// State handed to every handler; cheap to clone
#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<Config>,
    store: Store,
}

impl AppState {
    pub fn new(config: Config, store: Store) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}
