//! Per-collection cache state.

use super::message::{CacheMessage, EntityKey};
use crate::catalog::{CatalogEntity, Product, Project};

/// Load state of one collection.
///
/// `Idle -> Loading -> {Ready, Error}`; any refresh moves `Ready` or
/// `Error` back to `Loading`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Error(String),
}

/// An ordered replica of one collection.
#[derive(Debug, Clone)]
pub struct Collection<E> {
    items: Vec<E>,
    state: LoadState,
}

impl<E> Default for Collection<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            state: LoadState::Idle,
        }
    }
}

impl<E: CatalogEntity> Collection<E> {
    pub fn from_items(items: Vec<E>) -> Self {
        Self {
            items,
            state: LoadState::Ready,
        }
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Error(msg) => Some(msg),
            _ => None,
        }
    }

    pub(crate) fn begin_load(&mut self) {
        self.state = LoadState::Loading;
    }

    /// Replace the whole sequence with a fresh listing.
    pub(crate) fn replace(&mut self, items: Vec<E>) {
        self.items = items;
        self.state = LoadState::Ready;
    }

    /// Record a failed listing; the current items stay.
    pub(crate) fn fail(&mut self, message: String) {
        self.state = LoadState::Error(message);
    }

    /// Replace the entry with the same key in place, or prepend.
    pub fn upsert(&mut self, item: E) {
        let key = key_of(&item);
        match self.items.iter().position(|e| key_of(e) == key) {
            Some(idx) => self.items[idx] = item,
            None => self.items.insert(0, item),
        }
    }

    /// Drop every entry whose key matches. Returns how many were removed.
    pub fn remove(&mut self, key: &EntityKey) -> usize {
        let before = self.items.len();
        self.items.retain(|e| &key_of(e) != key);
        before - self.items.len()
    }
}

fn key_of<E: CatalogEntity>(item: &E) -> EntityKey {
    EntityKey::from(item.numeric_id())
}

/// Both collections held by a cache.
#[derive(Debug, Clone, Default)]
pub struct CacheState {
    pub products: Collection<Product>,
    pub projects: Collection<Project>,
}

/// Entities the cache holds, and how each maps to its collection and
/// broadcast messages.
pub trait CachedEntity: CatalogEntity {
    fn collection(state: &CacheState) -> &Collection<Self>;
    fn collection_mut(state: &mut CacheState) -> &mut Collection<Self>;
    fn upsert_message(item: Self) -> CacheMessage;
    fn remove_message(key: EntityKey) -> CacheMessage;
}

impl CachedEntity for Product {
    fn collection(state: &CacheState) -> &Collection<Self> {
        &state.products
    }

    fn collection_mut(state: &mut CacheState) -> &mut Collection<Self> {
        &mut state.products
    }

    fn upsert_message(item: Self) -> CacheMessage {
        CacheMessage::ProductUpsert { payload: item }
    }

    fn remove_message(key: EntityKey) -> CacheMessage {
        CacheMessage::ProductRemove { numeric_id: key }
    }
}

impl CachedEntity for Project {
    fn collection(state: &CacheState) -> &Collection<Self> {
        &state.projects
    }

    fn collection_mut(state: &mut CacheState) -> &mut Collection<Self> {
        &mut state.projects
    }

    fn upsert_message(item: Self) -> CacheMessage {
        CacheMessage::ProjectUpsert { payload: item }
    }

    fn remove_message(key: EntityKey) -> CacheMessage {
        CacheMessage::ProjectRemove { numeric_id: key }
    }
}
