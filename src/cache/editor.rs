//! Admin mutations that keep the cache and the other contexts in step.

use tracing::info;

use super::message::{CacheMessage, EntityKey};
use super::source::{CatalogApi, SourceError};
use super::state::CachedEntity;
use super::CatalogCache;

/// Runs a mutation against the backend, then applies the confirmed result
/// to the local cache and posts it to the other contexts.
///
/// Nothing is applied before the backend answers, so a failed call leaves
/// every cache unchanged.
pub struct CatalogEditor<A> {
    cache: CatalogCache<A>,
}

impl<A: CatalogApi> CatalogEditor<A> {
    pub fn new(cache: CatalogCache<A>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &CatalogCache<A> {
        &self.cache
    }

    pub async fn create<E: CachedEntity>(&self, input: &E::New) -> Result<E, SourceError> {
        let created: E = self.cache.source().create_entity::<E>(input).await?;
        info!(kind = E::KIND, numeric_id = created.numeric_id(), "created");
        self.publish_upsert(created.clone());
        Ok(created)
    }

    pub async fn update<E: CachedEntity>(&self, id: u64, patch: &E::Patch) -> Result<E, SourceError> {
        let updated: E = self.cache.source().update_entity::<E>(id, patch).await?;
        info!(kind = E::KIND, numeric_id = id, "updated");
        self.publish_upsert(updated.clone());
        Ok(updated)
    }

    pub async fn delete<E: CachedEntity>(&self, id: u64) -> Result<(), SourceError> {
        self.cache.source().delete_entity::<E>(id).await?;
        info!(kind = E::KIND, numeric_id = id, "deleted");
        self.cache.remove::<E>(id);
        self.cache.broadcast(&E::remove_message(EntityKey::from(id)));
        Ok(())
    }

    /// Ask every context, this one included, to reload from the backend.
    pub async fn refresh_everywhere(&self) {
        self.cache.broadcast(&CacheMessage::RefreshAll);
        self.cache.refresh_all().await;
    }

    fn publish_upsert<E: CachedEntity>(&self, item: E) {
        self.cache.upsert(item.clone());
        self.cache.broadcast(&E::upsert_message(item));
    }
}
