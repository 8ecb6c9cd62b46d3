use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use catalog_sync::cache::{CatalogApi, CatalogSource, SourceError};
use catalog_sync::catalog::{CatalogEntity, CatalogService, Product, Project};
use catalog_sync::model::{Connection, InMemoryModelStore};
use catalog_sync::sequence::SequenceAllocator;
use catalog_sync::storage::InMemoryObjectStore;

type Catalog = CatalogService<InMemoryModelStore, SequenceAllocator<InMemoryModelStore>, InMemoryObjectStore>;

/// One in-process backend shared by several contexts. Each context gets its
/// own `Backend` handle so fetches can be counted per context.
#[derive(Clone)]
pub struct Backend {
    catalog: Arc<Catalog>,
    fetches: Arc<AtomicUsize>,
    fail_projects: Arc<AtomicBool>,
}

impl Backend {
    pub fn new() -> Self {
        let conn = Arc::new(Connection::ready(InMemoryModelStore::new()));
        let catalog = CatalogService::new(
            Arc::clone(&conn),
            SequenceAllocator::new(conn),
            InMemoryObjectStore::new("https://cdn.example.com"),
        );
        Self {
            catalog: Arc::new(catalog),
            fetches: Arc::new(AtomicUsize::new(0)),
            fail_projects: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Another context's view of the same backend, with its own counters.
    pub fn handle(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            fetches: Arc::new(AtomicUsize::new(0)),
            fail_projects: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn fail_projects(&self, fail: bool) {
        self.fail_projects.store(fail, Ordering::SeqCst);
    }
}

impl CatalogSource for Backend {
    async fn list_products(&self) -> Result<Vec<Product>, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.catalog.list_products().await
    }

    async fn list_projects(&self) -> Result<Vec<Project>, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_projects.load(Ordering::SeqCst) {
            return Err(SourceError::Transport("connection reset".into()));
        }
        self.catalog.list_projects().await
    }
}

impl CatalogApi for Backend {
    async fn create_entity<E: CatalogEntity>(&self, input: &E::New) -> Result<E, SourceError> {
        self.catalog.create_entity::<E>(input).await
    }

    async fn update_entity<E: CatalogEntity>(&self, id: u64, patch: &E::Patch) -> Result<E, SourceError> {
        self.catalog.update_entity::<E>(id, patch).await
    }

    async fn delete_entity<E: CatalogEntity>(&self, id: u64) -> Result<(), SourceError> {
        self.catalog.delete_entity::<E>(id).await
    }
}
