//! Connection - Owned, lazily established handle to a model store.

use std::sync::{Arc, Mutex};

use tracing::{error, info};

use super::{ModelError, ModelStore};

type Connector<S> = Box<dyn Fn() -> Result<S, ModelError> + Send + Sync>;

/// A lazily-initialized store handle with idempotent `ensure_connected`.
///
/// The first successful `ensure_connected` runs the connector and caches the
/// resulting store; later calls return the cached handle without touching
/// the connector. A failed attempt caches nothing, so the next call retries.
///
/// Share one `Arc<Connection<S>>` between every component that talks to the
/// same database (the sequence allocator and the catalog service).
///
/// ## Example
///
/// ```ignore
/// let conn = Arc::new(Connection::lazy(|| MongoStore::connect(&uri)));
/// let ids = SequenceAllocator::new(conn.clone());
/// let catalog = CatalogService::new(conn, ids, objects);
/// ```
pub struct Connection<S> {
    connector: Connector<S>,
    handle: Mutex<Option<Arc<S>>>,
}

impl<S: ModelStore> Connection<S> {
    /// Create a connection that will run `connector` on first use.
    pub fn lazy<F>(connector: F) -> Self
    where
        F: Fn() -> Result<S, ModelError> + Send + Sync + 'static,
    {
        Self {
            connector: Box::new(connector),
            handle: Mutex::new(None),
        }
    }

    /// Wrap an already-open store.
    pub fn ready(store: S) -> Self
    where
        S: Clone + 'static,
    {
        let handle = Arc::new(store.clone());
        Self {
            connector: Box::new(move || Ok(store.clone())),
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Return the store, connecting first if no handle is cached yet.
    pub fn ensure_connected(&self) -> Result<Arc<S>, ModelError> {
        let mut handle = self
            .handle
            .lock()
            .map_err(|_| ModelError::Storage("connection lock poisoned".into()))?;

        if let Some(store) = handle.as_ref() {
            return Ok(Arc::clone(store));
        }

        match (self.connector)() {
            Ok(store) => {
                info!("document store connected");
                let store = Arc::new(store);
                *handle = Some(Arc::clone(&store));
                Ok(store)
            }
            Err(err) => {
                error!(error = %err, "document store connection failed");
                Err(err)
            }
        }
    }

    /// Whether a handle has been established.
    pub fn is_connected(&self) -> bool {
        self.handle.lock().map(|h| h.is_some()).unwrap_or(false)
    }
}
