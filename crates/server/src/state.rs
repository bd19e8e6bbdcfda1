use std::sync::Arc;

use servicedesk_core::{ClientStore, Config, OrderStore, SqliteDeskStore, StoreError, TicketStore};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<SqliteDeskStore>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<SqliteDeskStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clients(&self) -> &dyn ClientStore {
        self.store.as_ref()
    }

    pub fn tickets(&self) -> &dyn TicketStore {
        self.store.as_ref()
    }

    pub fn orders(&self) -> &dyn OrderStore {
        self.store.as_ref()
    }

    /// Create any missing tables.
    pub fn setup(&self) -> Result<(), StoreError> {
        self.store.ensure_schema()
    }
}
