pub mod auth;
pub mod bus;
pub mod cache;
pub mod catalog;
mod clock;
pub mod config;
#[cfg(feature = "http")]
pub mod http;
pub mod model;
pub mod sequence;
pub mod storage;

pub use cache::{CacheMessage, CacheOptions, CatalogCache, CatalogEditor, HostContext, LoadState};
pub use catalog::{CatalogError, CatalogService, NewProduct, NewProject, Product, Project};
pub use model::{Connection, ModelError, ModelStore};
pub use sequence::{IdAllocator, SequenceAllocator};
pub use storage::{ObjectStore, PresignedUpload};

// Re-export the EventEmitter from the event_emitter_rs crate
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
