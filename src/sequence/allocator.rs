use std::sync::Arc;

use tracing::debug;

use crate::model::{Connection, ModelError, ModelStore};

/// Anything that can mint the next id of a named sequence.
///
/// The catalog service depends on this seam rather than on the concrete
/// allocator so tests can observe (or forbid) allocation.
pub trait IdAllocator: Send + Sync {
    fn next_id(&self, sequence: &str) -> Result<u64, ModelError>;
}

/// Allocates ids through the store's atomic increment-and-fetch.
pub struct SequenceAllocator<S> {
    conn: Arc<Connection<S>>,
}

impl<S> Clone for SequenceAllocator<S> {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}

impl<S: ModelStore> SequenceAllocator<S> {
    pub fn new(conn: Arc<Connection<S>>) -> Self {
        Self { conn }
    }

    /// Increment `sequence` and return the new value (1 for a new sequence).
    pub fn next_id(&self, sequence: &str) -> Result<u64, ModelError> {
        if sequence.trim().is_empty() {
            return Err(ModelError::Storage("sequence name must not be empty".into()));
        }
        let store = self.conn.ensure_connected()?;
        let id = store.increment_counter(sequence)?;
        debug!(sequence, id, "allocated sequence id");
        Ok(id)
    }
}

impl<S: ModelStore> IdAllocator for SequenceAllocator<S> {
    fn next_id(&self, sequence: &str) -> Result<u64, ModelError> {
        SequenceAllocator::next_id(self, sequence)
    }
}
