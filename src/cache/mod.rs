//! Client-side catalog cache, kept in step across contexts.
//!
//! Each open context (a browser tab, a desktop window, a kiosk) holds a
//! `CatalogCache`: an ordered replica of `products` and `projects` loaded
//! from the listing endpoints. Contexts converge in two ways:
//!
//! - **Broadcast**: after the backend confirms a mutation, the context that
//!   made it applies the result locally and posts a `CacheMessage` on the
//!   shared channel. Every other context applies the message without
//!   refetching.
//! - **Revalidation**: a context refetches both collections when it
//!   regains focus, and on a fixed interval while it is visible. This
//!   catches messages missed while closed or mutations made elsewhere.
//!
//! ## Example
//!
//! ```ignore
//! let queue = InMemoryQueue::new();
//! let options = CacheOptions::default();
//! let cache = CatalogCache::with_queue(
//!     HttpCatalogApi::new("http://localhost:8080").with_token(token),
//!     &queue,
//!     &options,
//! );
//!
//! let host = HostContext::new();
//! let revalidation = cache.start(host.clone(), options);
//!
//! let editor = CatalogEditor::new(cache.clone());
//! let product: Product = editor.create(&new_product).await?;
//!
//! host.focus(); // refreshes both collections
//! let stats = revalidation.stop().await?;
//! ```

#[allow(clippy::module_inception)]
mod cache;
mod channel;
mod editor;
mod host;
#[cfg(feature = "http")]
mod http_api;
mod local;
mod message;
mod revalidate;
mod source;
mod state;

pub use cache::CatalogCache;
pub use channel::CacheChannel;
pub use editor::CatalogEditor;
pub use host::HostContext;
#[cfg(feature = "http")]
pub use http_api::HttpCatalogApi;
pub use message::{CacheMessage, EntityKey};
pub use revalidate::{CacheOptions, RevalidationHandle, RevalidationStats};
pub use source::{CatalogApi, CatalogSource, SourceError};
pub use state::{CacheState, CachedEntity, Collection, LoadState};
