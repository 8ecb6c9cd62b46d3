use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use catalog_sync::catalog::{CatalogService, NewProduct, NewProject};
use catalog_sync::model::{Connection, InMemoryModelStore, ModelError};
use catalog_sync::sequence::{IdAllocator, SequenceAllocator};
use catalog_sync::storage::InMemoryObjectStore;

pub const PUBLIC_BASE: &str = "https://cdn.example.com";

/// Allocator that records how often it was asked for an id.
#[derive(Clone)]
pub struct CountingAllocator {
    inner: SequenceAllocator<InMemoryModelStore>,
    pub calls: Arc<AtomicUsize>,
}

impl CountingAllocator {
    pub fn new(inner: SequenceAllocator<InMemoryModelStore>) -> Self {
        Self {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IdAllocator for CountingAllocator {
    fn next_id(&self, sequence: &str) -> Result<u64, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.next_id(sequence)
    }
}

pub type Catalog = CatalogService<InMemoryModelStore, CountingAllocator, InMemoryObjectStore>;

pub struct Fixture {
    pub catalog: Catalog,
    pub store: InMemoryModelStore,
    pub objects: InMemoryObjectStore,
    pub allocator: CountingAllocator,
    pub connects: Arc<AtomicUsize>,
}

impl Fixture {
    /// A catalog whose store connection opens lazily and counts connects.
    pub fn new() -> Self {
        let store = InMemoryModelStore::new();
        let connects = Arc::new(AtomicUsize::new(0));

        let backing = store.clone();
        let counter = Arc::clone(&connects);
        let conn = Arc::new(Connection::lazy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(backing.clone())
        }));

        let allocator = CountingAllocator::new(SequenceAllocator::new(Arc::clone(&conn)));
        let objects = InMemoryObjectStore::new(PUBLIC_BASE);
        let catalog = CatalogService::new(conn, allocator.clone(), objects.clone());

        Self {
            catalog,
            store,
            objects,
            allocator,
            connects,
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

pub fn new_product(title: &str) -> NewProduct {
    NewProduct {
        title: Some(title.into()),
        short: Some(format!("{} in short", title)),
        ..Default::default()
    }
}

pub fn new_project(title: &str, gallery: &[&str]) -> NewProject {
    NewProject {
        title: Some(title.into()),
        summary: Some(format!("{} summary", title)),
        gallery: Some(gallery.iter().map(|g| g.to_string()).collect()),
        ..Default::default()
    }
}
