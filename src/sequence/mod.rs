//! Sequences - human-readable, monotonically increasing display ids.
//!
//! Each named sequence ("products", "projects", ...) is backed by one
//! `Counter` row in the document store. `SequenceAllocator::next_id` relies
//! entirely on the store's atomic increment; the allocator itself holds no
//! lock, so any number of request handlers may share it.
//!
//! Ids that were allocated but never used (because the following insert
//! failed) are skipped for good. Sequences are allowed to have gaps.

mod allocator;

use serde::{Deserialize, Serialize};

use crate::model::{Model, COUNTER_COLLECTION};

pub use allocator::{IdAllocator, SequenceAllocator};

/// One row per named sequence. `value` is the last issued id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub name: String,
    pub value: u64,
}

impl Model for Counter {
    const COLLECTION: &'static str = COUNTER_COLLECTION;

    fn id(&self) -> String {
        self.name.clone()
    }
}
