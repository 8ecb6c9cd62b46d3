//! CatalogService - create, update, delete and list catalog entities.

use std::sync::Arc;

use tracing::{info, warn};

use super::{CatalogEntity, CatalogError, ValidationError};
use crate::clock::now_millis;
use crate::model::{Connection, ModelError, ModelStore, ModelsExt};
use crate::sequence::IdAllocator;
use crate::storage::{upload_key, ObjectStore, PresignedUpload};

/// Attempts at a read-patch-write cycle before giving up on a contended entity.
const MAX_UPDATE_ATTEMPTS: usize = 3;

/// Outcome of deleting an entity and its gallery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    /// Gallery objects deleted from object storage.
    pub removed_images: usize,
    /// Gallery URLs outside the object store's public base.
    pub skipped_images: usize,
    /// Keys whose deletion failed; the entity was deleted regardless.
    pub failed_images: Vec<String>,
}

/// Catalog operations over an injected document store, id allocator and
/// object store.
///
/// The service holds no in-process lock: id uniqueness comes from the
/// allocator's atomic increment, update safety from the store's versioned
/// writes.
pub struct CatalogService<S, A, O> {
    conn: Arc<Connection<S>>,
    ids: A,
    objects: O,
}

impl<S: ModelStore, A: IdAllocator, O: ObjectStore> CatalogService<S, A, O> {
    pub fn new(conn: Arc<Connection<S>>, ids: A, objects: O) -> Self {
        Self { conn, ids, objects }
    }

    pub fn objects(&self) -> &O {
        &self.objects
    }

    /// All entities of a kind, newest first.
    pub fn list<E: CatalogEntity>(&self) -> Result<Vec<E>, CatalogError> {
        let store = self.conn.ensure_connected()?;
        let items = store.models::<E>().all_sorted_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.numeric_id().cmp(&a.numeric_id()))
        })?;
        Ok(items)
    }

    /// Entities whose text fields contain `query`, newest first.
    pub fn search<E: CatalogEntity>(&self, query: &str) -> Result<Vec<E>, CatalogError> {
        let mut items = self.list::<E>()?;
        items.retain(|e| e.matches(query));
        Ok(items)
    }

    pub fn get<E: CatalogEntity>(&self, id: u64) -> Result<E, CatalogError> {
        check_id(id)?;
        let store = self.conn.ensure_connected()?;
        store
            .models::<E>()
            .load(id)?
            .ok_or(CatalogError::NotFound { kind: E::KIND, id })
    }

    /// Validate, allocate a numeric id, then persist.
    ///
    /// Validation failures touch neither the allocator nor the store. An id
    /// allocated for an insert that then fails stays unused.
    pub fn create<E: CatalogEntity>(&self, input: E::New) -> Result<E, CatalogError> {
        E::validate_new(&input)?;

        let numeric_id = self
            .ids
            .next_id(E::SEQUENCE)
            .map_err(CatalogError::Allocation)?;

        let entity = E::from_new(input, numeric_id, now_millis());
        let store = self.conn.ensure_connected()?;
        store.models::<E>().insert(&entity)?;

        info!(kind = E::KIND, numeric_id, "created catalog entity");
        Ok(entity)
    }

    /// Overwrite the fields present in `patch`.
    pub fn update<E: CatalogEntity>(&self, id: u64, patch: E::Patch) -> Result<E, CatalogError> {
        check_id(id)?;
        E::validate_patch(&patch)?;
        let store = self.conn.ensure_connected()?;
        let records = store.models::<E>();

        let mut attempt = 0;
        loop {
            attempt += 1;

            let current = records
                .get(id)?
                .ok_or(CatalogError::NotFound { kind: E::KIND, id })?;

            let mut entity = current.data;
            entity.apply_patch(patch.clone());
            entity.set_updated_at(now_millis());

            match records.replace(&entity, current.version) {
                Ok(_) => {
                    info!(kind = E::KIND, numeric_id = id, "updated catalog entity");
                    return Ok(entity);
                }
                Err(ModelError::ConcurrencyConflict { .. }) if attempt < MAX_UPDATE_ATTEMPTS => {
                    continue;
                }
                Err(ModelError::NotFound { .. }) => {
                    return Err(CatalogError::NotFound { kind: E::KIND, id });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Delete an entity, removing its gallery objects first.
    ///
    /// Image deletion is best-effort: each failure is logged and recorded
    /// in the report, and neither the remaining images nor the record
    /// deletion are affected.
    pub fn delete<E: CatalogEntity>(&self, id: u64) -> Result<DeleteReport, CatalogError> {
        let entity = self.get::<E>(id)?;
        let mut report = DeleteReport::default();

        for url in entity.gallery() {
            let key = match self.objects.key_from_url(url) {
                Some(key) => key,
                None => {
                    report.skipped_images += 1;
                    continue;
                }
            };
            match self.objects.delete(&key) {
                Ok(()) => report.removed_images += 1,
                Err(err) => {
                    warn!(kind = E::KIND, numeric_id = id, key = %key, error = %err, "gallery image delete failed");
                    report.failed_images.push(key);
                }
            }
        }

        let store = self.conn.ensure_connected()?;
        if !store.models::<E>().remove(id)? {
            return Err(CatalogError::NotFound { kind: E::KIND, id });
        }

        info!(
            kind = E::KIND,
            numeric_id = id,
            removed_images = report.removed_images,
            failed_images = report.failed_images.len(),
            "deleted catalog entity"
        );
        Ok(report)
    }

    /// Presign an upload of `filename` into `folder` (default `uploads`).
    pub fn presign_upload(
        &self,
        folder: Option<&str>,
        filename: &str,
        content_type: &str,
    ) -> Result<PresignedUpload, CatalogError> {
        if filename.trim().is_empty() {
            return Err(ValidationError::MissingField("filename").into());
        }
        if content_type.trim().is_empty() {
            return Err(ValidationError::MissingField("contentType").into());
        }
        let key = upload_key(folder, filename, now_millis());
        Ok(self.objects.presign_upload(&key, content_type)?)
    }
}

fn check_id(id: u64) -> Result<(), CatalogError> {
    if id == 0 {
        return Err(ValidationError::InvalidId(id.to_string()).into());
    }
    Ok(())
}

/// Parse a path segment into a numeric id.
#[cfg_attr(not(feature = "http"), allow(dead_code))]
pub(crate) fn parse_id(raw: &str) -> Result<u64, CatalogError> {
    match raw.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::InvalidId(raw.to_string()).into()),
    }
}
