//! ModelStore - Abstract document storage for models.

use super::{Model, ModelError, Versioned};

/// Abstract document storage for models.
pub trait ModelStore: Send + Sync {
    /// Get a model by ID. Returns None if not found.
    fn get_model<M: Model>(&self, id: &str) -> Result<Option<Versioned<M>>, ModelError>;

    /// Upsert a model (insert or update, no version check).
    fn save_model<M: Model>(&self, model: &M) -> Result<Versioned<M>, ModelError>;

    /// Insert a new model. Fails if it already exists.
    fn insert_model<M: Model>(&self, model: &M) -> Result<Versioned<M>, ModelError>;

    /// Update an existing model with optimistic concurrency control.
    fn update_model<M: Model>(
        &self,
        model: &M,
        expected_version: u64,
    ) -> Result<Versioned<M>, ModelError>;

    /// Delete a model by ID. Returns true if it existed.
    fn delete_model<M: Model>(&self, id: &str) -> Result<bool, ModelError>;

    /// Find models matching a predicate.
    fn find_models<M: Model>(
        &self,
        predicate: &dyn Fn(&M) -> bool,
    ) -> Result<Vec<Versioned<M>>, ModelError>;

    /// Atomically increment the counter row `name` and return the new value.
    ///
    /// A missing row is created with an implied prior value of 0, so the
    /// first call for a name returns 1. Implementations must perform the
    /// read and the write as one storage-level operation (`$inc` with
    /// upsert, `UPDATE .. RETURNING`, `INCR`, ...).
    fn increment_counter(&self, name: &str) -> Result<u64, ModelError>;
}
