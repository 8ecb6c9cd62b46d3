//! InMemoryModelStore - HashMap-backed document store for tests and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use super::{Model, ModelError, ModelStore, Versioned, COUNTER_COLLECTION};

/// Internal stored representation of a model.
struct StoredModel {
    bytes: Vec<u8>,
    version: u64,
}

/// Wire shape of a counter row. Mirrors `sequence::Counter`.
#[derive(Serialize, Deserialize)]
struct CounterRow {
    name: String,
    value: u64,
}

/// In-memory document store backed by a HashMap.
///
/// Storage key is `"COLLECTION:id"`. Clone-friendly via Arc: clones share
/// the same storage, which is how several request handlers (or threads)
/// see one database.
#[derive(Clone)]
pub struct InMemoryModelStore {
    storage: Arc<RwLock<HashMap<String, StoredModel>>>,
}

impl Default for InMemoryModelStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryModelStore {
    /// Create a new empty model store.
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn make_key(collection: &str, id: &str) -> String {
        format!("{}:{}", collection, id)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, StoredModel>>, ModelError> {
        self.storage
            .read()
            .map_err(|_| ModelError::Storage("lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, StoredModel>>, ModelError> {
        self.storage
            .write()
            .map_err(|_| ModelError::Storage("lock poisoned".into()))
    }

    /// Number of documents stored in a collection.
    pub fn count(&self, collection: &str) -> Result<usize, ModelError> {
        let prefix = format!("{}:", collection);
        Ok(self.read()?.keys().filter(|k| k.starts_with(&prefix)).count())
    }
}

impl ModelStore for InMemoryModelStore {
    fn get_model<M: Model>(&self, id: &str) -> Result<Option<Versioned<M>>, ModelError> {
        let key = Self::make_key(M::COLLECTION, id);
        let storage = self.read()?;

        match storage.get(&key) {
            Some(stored) => {
                let data: M = serde_json::from_slice(&stored.bytes)?;
                Ok(Some(Versioned {
                    data,
                    version: stored.version,
                }))
            }
            None => Ok(None),
        }
    }

    fn save_model<M: Model>(&self, model: &M) -> Result<Versioned<M>, ModelError> {
        let key = Self::make_key(M::COLLECTION, &model.id());
        let bytes = serde_json::to_vec(model)?;

        let mut storage = self.write()?;
        let new_version = storage.get(&key).map(|s| s.version + 1).unwrap_or(1);

        storage.insert(
            key,
            StoredModel {
                bytes,
                version: new_version,
            },
        );

        Ok(Versioned {
            data: model.clone(),
            version: new_version,
        })
    }

    fn insert_model<M: Model>(&self, model: &M) -> Result<Versioned<M>, ModelError> {
        let id = model.id();
        let key = Self::make_key(M::COLLECTION, &id);
        let bytes = serde_json::to_vec(model)?;

        let mut storage = self.write()?;

        if let Some(existing) = storage.get(&key) {
            return Err(ModelError::ConcurrencyConflict {
                collection: M::COLLECTION.to_string(),
                id,
                expected: 0,
                actual: existing.version,
            });
        }

        storage.insert(key, StoredModel { bytes, version: 1 });

        Ok(Versioned {
            data: model.clone(),
            version: 1,
        })
    }

    fn update_model<M: Model>(
        &self,
        model: &M,
        expected_version: u64,
    ) -> Result<Versioned<M>, ModelError> {
        let id = model.id();
        let key = Self::make_key(M::COLLECTION, &id);
        let bytes = serde_json::to_vec(model)?;

        let mut storage = self.write()?;

        let actual_version = match storage.get(&key) {
            Some(stored) => stored.version,
            None => {
                return Err(ModelError::NotFound {
                    collection: M::COLLECTION.to_string(),
                    id,
                })
            }
        };

        if actual_version != expected_version {
            return Err(ModelError::ConcurrencyConflict {
                collection: M::COLLECTION.to_string(),
                id,
                expected: expected_version,
                actual: actual_version,
            });
        }

        let new_version = actual_version + 1;
        storage.insert(
            key,
            StoredModel {
                bytes,
                version: new_version,
            },
        );

        Ok(Versioned {
            data: model.clone(),
            version: new_version,
        })
    }

    fn delete_model<M: Model>(&self, id: &str) -> Result<bool, ModelError> {
        let key = Self::make_key(M::COLLECTION, id);
        Ok(self.write()?.remove(&key).is_some())
    }

    fn find_models<M: Model>(
        &self,
        predicate: &dyn Fn(&M) -> bool,
    ) -> Result<Vec<Versioned<M>>, ModelError> {
        let storage = self.read()?;

        let prefix = format!("{}:", M::COLLECTION);
        let mut results = Vec::new();

        for (key, stored) in storage.iter() {
            if key.starts_with(&prefix) {
                if let Ok(data) = serde_json::from_slice::<M>(&stored.bytes) {
                    if predicate(&data) {
                        results.push(Versioned {
                            data,
                            version: stored.version,
                        });
                    }
                }
            }
        }

        Ok(results)
    }

    fn increment_counter(&self, name: &str) -> Result<u64, ModelError> {
        let key = Self::make_key(COUNTER_COLLECTION, name);

        // Read and write happen under one write guard.
        let mut storage = self.write()?;

        let (prior, version) = match storage.get(&key) {
            Some(stored) => {
                let row: CounterRow = serde_json::from_slice(&stored.bytes)?;
                (row.value, stored.version)
            }
            None => (0, 0),
        };

        let value = prior + 1;
        let bytes = serde_json::to_vec(&CounterRow {
            name: name.to_string(),
            value,
        })?;

        storage.insert(
            key,
            StoredModel {
                bytes,
                version: version + 1,
            },
        );

        Ok(value)
    }
}
