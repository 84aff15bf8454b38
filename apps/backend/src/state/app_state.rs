//! Shared application state: every service borrows its collaborators from
//! here. Cloning is cheap (one `Arc`).

use std::sync::Arc;

use crate::config::GameConfig;
use crate::domain::deck;
use crate::infra::{
    CardCatalog, DisconnectGraceScheduler, EventPublisher, GeneratedCatalog, InProcessEventBus,
    MemorySessionStore, SessionLockRegistry, SessionStore,
};

struct Inner {
    config: GameConfig,
    store: Arc<dyn SessionStore>,
    catalog: Arc<dyn CardCatalog>,
    publisher: Arc<dyn EventPublisher>,
    locks: SessionLockRegistry,
    grace: DisconnectGraceScheduler,
}

#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

impl AppState {
    pub fn builder() -> StateBuilder {
        StateBuilder::new()
    }

    pub fn config(&self) -> &GameConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &dyn SessionStore {
        self.inner.store.as_ref()
    }

    pub fn catalog(&self) -> &dyn CardCatalog {
        self.inner.catalog.as_ref()
    }

    pub fn publisher(&self) -> &dyn EventPublisher {
        self.inner.publisher.as_ref()
    }

    pub fn locks(&self) -> &SessionLockRegistry {
        &self.inner.locks
    }

    pub fn grace(&self) -> &DisconnectGraceScheduler {
        &self.inner.grace
    }
}

/// Builder for creating AppState instances (used in both tests and main).
pub struct StateBuilder {
    config: GameConfig,
    store: Option<Arc<dyn SessionStore>>,
    catalog: Option<Arc<dyn CardCatalog>>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            config: GameConfig::default(),
            store: None,
            catalog: None,
            publisher: None,
        }
    }

    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn CardCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn build(self) -> AppState {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemorySessionStore::new()));
        let catalog = self.catalog.unwrap_or_else(|| {
            Arc::new(GeneratedCatalog::new(deck::deck_codes(&self.config)))
        });
        let publisher = self
            .publisher
            .unwrap_or_else(|| Arc::new(InProcessEventBus::new()));
        AppState {
            inner: Arc::new(Inner {
                config: self.config,
                store,
                catalog,
                publisher,
                locks: SessionLockRegistry::new(),
                grace: DisconnectGraceScheduler::new(),
            }),
        }
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
