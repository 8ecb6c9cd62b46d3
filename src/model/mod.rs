//! Models - Document storage for catalog records and counters.
//!
//! Models provide a simple CRUD abstraction for storing typed documents,
//! plus the one atomic primitive the sequence allocator relies on:
//! increment-and-fetch on a named counter row.
//!
//! ## Example
//!
//! ```ignore
//! use catalog_sync::model::{Model, InMemoryModelStore, ModelsExt};
//!
//! #[derive(Serialize, Deserialize, Clone)]
//! struct Banner {
//!     pub id: String,
//!     pub text: String,
//! }
//!
//! impl Model for Banner {
//!     const COLLECTION: &'static str = "banners";
//!     fn id(&self) -> String { self.id.clone() }
//! }
//!
//! let store = InMemoryModelStore::new();
//! store.models::<Banner>().insert(&banner)?;
//! let loaded: Option<Banner> = store.models::<Banner>().load("home")?;
//! ```

mod connection;
mod in_memory;
mod model_repository;
mod store;

use serde::{de::DeserializeOwned, Serialize};
use std::fmt;

/// Collection holding one row per named sequence.
pub const COUNTER_COLLECTION: &str = "counters";

/// Trait for types that can be stored as models.
pub trait Model: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// The collection name for this model type (e.g., "products", "projects").
    /// Maps to a collection in MongoDB, a table in SQL, a key prefix in KV stores, etc.
    const COLLECTION: &'static str;

    /// Returns the logical identifier for this model instance.
    fn id(&self) -> String;
}

/// A versioned wrapper around model data for optimistic concurrency control.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub data: T,
    pub version: u64,
}

/// Error type for model store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Optimistic concurrency conflict.
    ConcurrencyConflict {
        collection: String,
        id: String,
        expected: u64,
        actual: u64,
    },
    /// Serialization/deserialization error.
    Serde(String),
    /// Storage-level error (unreachable, lock poisoned, ...).
    Storage(String),
    /// Model not found.
    NotFound { collection: String, id: String },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::ConcurrencyConflict {
                collection,
                id,
                expected,
                actual,
            } => write!(
                f,
                "concurrency conflict on {}:{} (expected version {}, actual {})",
                collection, id, expected, actual
            ),
            ModelError::Serde(msg) => write!(f, "model serialization error: {}", msg),
            ModelError::Storage(msg) => write!(f, "model storage error: {}", msg),
            ModelError::NotFound { collection, id } => {
                write!(f, "model not found: {}:{}", collection, id)
            }
        }
    }
}

impl std::error::Error for ModelError {}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serde(err.to_string())
    }
}

pub use connection::Connection;
pub use in_memory::InMemoryModelStore;
pub use model_repository::{ModelRepository, ModelsExt};
pub use store::ModelStore;
