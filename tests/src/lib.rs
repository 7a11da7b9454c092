
use listmap::{manager::Builder, Entity, Manager, Registry};
use listmap_repository_memory::MemoryRepository;

use std::sync::{Arc, Once};
use tracing_subscriber::EnvFilter;

/// A memory repository plus a registry of its own, so tests never share
/// entity maps or items.
pub struct ListmapTest {
    pub repo: MemoryRepository,
    pub registry: Registry,
}

impl ListmapTest {
    pub fn new() -> Self {
        init_tracing();
        Self {
            repo: MemoryRepository::new(),
            registry: Registry::new(),
        }
    }

    pub fn builder<T: Entity>(&self) -> Builder<T> {
        Manager::builder(Arc::new(self.repo.clone())).registry(self.registry.clone())
    }

    pub fn manager<T: Entity>(&self) -> Manager<T> {
        self.builder().build().unwrap()
    }
}

impl Default for ListmapTest {
    fn default() -> Self {
        Self::new()
    }
}

/// Installs a test-writer subscriber once per process. Filter with
/// `RUST_LOG`, e.g. `RUST_LOG=listmap=debug`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
