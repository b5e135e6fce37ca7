use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::db::{CatalogRepository, EventRepository, MemoryStore, ProfileRepository};
use crate::services::providers::TextGenerator;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogRepository>,
    pub events: Arc<dyn EventRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub generator: Option<Arc<dyn TextGenerator>>,
    /// Fixed seed makes every ranking reproducible
    pub rng_seed: Option<u64>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Creates state backed by a fresh in-memory store
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    /// Uses one store for catalog, events and profile
    pub fn with_store<S>(store: S) -> Self
    where
        S: CatalogRepository + EventRepository + ProfileRepository + 'static,
    {
        let store = Arc::new(store);
        Self {
            catalog: store.clone(),
            events: store.clone(),
            profiles: store,
            generator: None,
            rng_seed: None,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn rng(&self) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
