//! Typed view of one collection of a `ModelStore`, addressed by any
//! displayable id (numeric catalog ids, counter names).

use std::cmp::Ordering;
use std::fmt::Display;
use std::marker::PhantomData;

use super::{Model, ModelError, ModelStore, Versioned};

pub struct ModelRepository<'a, S, M> {
    store: &'a S,
    _marker: PhantomData<M>,
}

impl<'a, S: ModelStore, M: Model> ModelRepository<'a, S, M> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Document under `id` together with its version.
    pub fn get(&self, id: impl Display) -> Result<Option<Versioned<M>>, ModelError> {
        self.store.get_model(&id.to_string())
    }

    /// Document under `id`, version dropped.
    pub fn load(&self, id: impl Display) -> Result<Option<M>, ModelError> {
        Ok(self.get(id)?.map(|v| v.data))
    }

    /// Store a new document. Returns its first version.
    pub fn insert(&self, model: &M) -> Result<u64, ModelError> {
        Ok(self.store.insert_model(model)?.version)
    }

    /// Overwrite a document read at `expected_version`.
    ///
    /// Fails with `ConcurrencyConflict` when another writer got there first.
    pub fn replace(&self, model: &M, expected_version: u64) -> Result<u64, ModelError> {
        Ok(self.store.update_model(model, expected_version)?.version)
    }

    /// Returns false when nothing was stored under `id`.
    pub fn remove(&self, id: impl Display) -> Result<bool, ModelError> {
        self.store.delete_model::<M>(&id.to_string())
    }

    /// Every document of the collection, ordered by `compare`.
    pub fn all_sorted_by<F>(&self, mut compare: F) -> Result<Vec<M>, ModelError>
    where
        F: FnMut(&M, &M) -> Ordering,
    {
        let mut items: Vec<M> = self
            .store
            .find_models::<M>(&|_| true)?
            .into_iter()
            .map(|v| v.data)
            .collect();
        items.sort_by(|a, b| compare(a, b));
        Ok(items)
    }
}

/// `store.models::<M>()` on any `ModelStore`.
pub trait ModelsExt: ModelStore + Sized {
    fn models<M: Model>(&self) -> ModelRepository<'_, Self, M> {
        ModelRepository::new(self)
    }
}

impl<S: ModelStore> ModelsExt for S {}
