//! CatalogCache - the in-process replica of both collections.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[cfg(feature = "emitter")]
use event_emitter_rs::EventEmitter;
#[cfg(feature = "emitter")]
use std::sync::Mutex;
use tracing::{debug, warn};

use super::channel::CacheChannel;
use super::message::{CacheMessage, EntityKey};
use super::revalidate::{self, CacheOptions, RevalidationHandle};
use super::source::{CatalogSource, SourceError};
use super::state::{CacheState, CachedEntity, LoadState};
use super::HostContext;
use crate::bus::{BroadcastChannel, InMemoryQueue};
use crate::catalog::{Product, Project};

/// Client-side replica of `products` and `projects`.
///
/// Cloning yields another handle to the same replica. The cache never
/// holds a lock across an await point, so handles can be used from any
/// task.
pub struct CatalogCache<Src> {
    inner: Arc<Inner<Src>>,
}

struct Inner<Src> {
    source: Src,
    channel: Option<Box<dyn CacheChannel>>,
    state: RwLock<CacheState>,
    in_flight: AtomicUsize,
    #[cfg(feature = "emitter")]
    emitter: Mutex<EventEmitter>,
}

impl<Src> Clone for CatalogCache<Src> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Keeps `loading` true while a refresh runs, including one that is
/// cancelled mid-await.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        InFlight(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<Src: CatalogSource> CatalogCache<Src> {
    /// A cache that does not talk to other contexts.
    pub fn new(source: Src) -> Self {
        Self::build(source, None)
    }

    /// A cache that posts its mutations on `channel` and applies what
    /// other contexts post there.
    pub fn with_channel<C: CacheChannel + 'static>(source: Src, channel: C) -> Self {
        Self::build(source, Some(Box::new(channel)))
    }

    /// A cache on the in-process channel named by `options.channel_name`.
    pub fn with_queue(source: Src, queue: &InMemoryQueue, options: &CacheOptions) -> Self {
        Self::with_channel(
            source,
            BroadcastChannel::in_memory(options.channel_name.clone(), queue),
        )
    }

    fn build(source: Src, channel: Option<Box<dyn CacheChannel>>) -> Self {
        if channel.is_none() {
            debug!("cache created without a broadcast channel");
        }
        Self {
            inner: Arc::new(Inner {
                source,
                channel,
                state: RwLock::new(CacheState::default()),
                in_flight: AtomicUsize::new(0),
                #[cfg(feature = "emitter")]
                emitter: Mutex::new(EventEmitter::new()),
            }),
        }
    }

    pub fn source(&self) -> &Src {
        &self.inner.source
    }

    /// Name of the broadcast channel, if the cache has one.
    pub fn channel_name(&self) -> Option<&str> {
        self.inner.channel.as_deref().map(|channel| channel.name())
    }

    /// Start focus and interval revalidation plus channel draining on the
    /// current tokio runtime.
    pub fn start(&self, host: HostContext, options: CacheOptions) -> RevalidationHandle {
        revalidate::spawn(self.clone(), host, options)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn products(&self) -> Vec<Product> {
        self.items::<Product>()
    }

    pub fn projects(&self) -> Vec<Project> {
        self.items::<Project>()
    }

    /// Current items of one collection.
    pub fn items<E: CachedEntity>(&self) -> Vec<E> {
        E::collection(&self.read()).items().to_vec()
    }

    pub fn load_state<E: CachedEntity>(&self) -> LoadState {
        E::collection(&self.read()).state().clone()
    }

    /// True while at least one refresh is running.
    pub fn is_loading(&self) -> bool {
        self.inner.in_flight.load(Ordering::SeqCst) > 0
    }

    /// The latest refresh error of either collection, products first.
    pub fn error(&self) -> Option<String> {
        let state = self.read();
        state
            .products
            .error()
            .or_else(|| state.projects.error())
            .map(str::to_string)
    }

    // ------------------------------------------------------------------
    // Refresh
    // ------------------------------------------------------------------

    /// Fetch both collections concurrently.
    ///
    /// Each collection is replaced on success; on failure it keeps its
    /// items and records the error. Overlapping calls are not merged.
    pub async fn refresh_all(&self) {
        tokio::join!(self.refresh_products(), self.refresh_projects());
    }

    pub async fn refresh_products(&self) {
        let _guard = InFlight::enter(&self.inner.in_flight);
        self.begin_load::<Product>();
        let result = self.inner.source.list_products().await;
        self.apply_listing(result);
    }

    pub async fn refresh_projects(&self) {
        let _guard = InFlight::enter(&self.inner.in_flight);
        self.begin_load::<Project>();
        let result = self.inner.source.list_projects().await;
        self.apply_listing(result);
    }

    fn begin_load<E: CachedEntity>(&self) {
        E::collection_mut(&mut self.write()).begin_load();
    }

    fn apply_listing<E: CachedEntity>(&self, result: Result<Vec<E>, SourceError>) {
        match result {
            Ok(items) => {
                debug!(collection = E::COLLECTION, count = items.len(), "collection refreshed");
                E::collection_mut(&mut self.write()).replace(items);
            }
            Err(err) => {
                warn!(collection = E::COLLECTION, error = %err, "collection refresh failed");
                E::collection_mut(&mut self.write()).fail(err.to_string());
            }
        }
        self.notify(E::COLLECTION);
    }

    // ------------------------------------------------------------------
    // Local mutations
    // ------------------------------------------------------------------

    /// Insert or replace an entity by numeric id.
    pub fn upsert<E: CachedEntity>(&self, item: E) {
        E::collection_mut(&mut self.write()).upsert(item);
        self.notify(E::COLLECTION);
    }

    /// Drop the entity with this numeric id, if cached.
    pub fn remove<E: CachedEntity>(&self, key: impl Into<EntityKey>) {
        let key = key.into();
        let removed = E::collection_mut(&mut self.write()).remove(&key);
        if removed > 0 {
            self.notify(E::COLLECTION);
        }
    }

    pub fn upsert_product(&self, product: Product) {
        self.upsert(product)
    }

    pub fn upsert_project(&self, project: Project) {
        self.upsert(project)
    }

    pub fn remove_product(&self, key: impl Into<EntityKey>) {
        self.remove::<Product>(key)
    }

    pub fn remove_project(&self, key: impl Into<EntityKey>) {
        self.remove::<Project>(key)
    }

    // ------------------------------------------------------------------
    // Cross-context messages
    // ------------------------------------------------------------------

    /// Post a message to the other contexts. Never fails.
    pub fn broadcast(&self, message: &CacheMessage) {
        let channel = match &self.inner.channel {
            Some(channel) => channel,
            None => {
                debug!("broadcast skipped, no channel");
                return;
            }
        };
        if let Err(err) = channel.send_message(message) {
            debug!(error = %err, "broadcast failed");
        }
    }

    /// Apply a message received from another context.
    pub async fn handle_message(&self, message: CacheMessage) {
        match message {
            CacheMessage::RefreshAll => self.refresh_all().await,
            CacheMessage::ProductUpsert { payload } => self.upsert(payload),
            CacheMessage::ProjectUpsert { payload } => self.upsert(payload),
            CacheMessage::ProductRemove { numeric_id } => self.remove::<Product>(numeric_id),
            CacheMessage::ProjectRemove { numeric_id } => self.remove::<Project>(numeric_id),
            CacheMessage::Unknown => debug!("ignoring message with unknown type"),
        }
    }

    /// Apply every message waiting on the channel. Returns how many were
    /// handled.
    pub async fn drain_messages(&self) -> usize {
        let mut handled = 0;
        while let Some(message) = self.next_message() {
            self.handle_message(message).await;
            handled += 1;
        }
        handled
    }

    fn next_message(&self) -> Option<CacheMessage> {
        let channel = self.inner.channel.as_ref()?;
        match channel.next_message() {
            Ok(message) => message,
            Err(err) => {
                debug!(error = %err, "channel receive failed");
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Change listeners
    // ------------------------------------------------------------------

    /// Call `listener` with the collection name each time `collection`
    /// (`"products"` or `"projects"`) changes. Listeners run on their own
    /// threads. Returns the listener id.
    #[cfg(feature = "emitter")]
    pub fn on_change<F>(&self, collection: &str, listener: F) -> Option<String>
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        let mut emitter = self.inner.emitter.lock().ok()?;
        Some(emitter.on(collection, listener))
    }

    #[cfg(feature = "emitter")]
    fn notify(&self, collection: &str) {
        if let Ok(mut emitter) = self.inner.emitter.lock() {
            emitter.emit(collection, collection.to_string());
        }
    }

    #[cfg(not(feature = "emitter"))]
    fn notify(&self, _collection: &str) {}

    // ------------------------------------------------------------------
    // Lock helpers
    // ------------------------------------------------------------------

    // A panic while holding the lock cannot leave a collection half
    // written, so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
