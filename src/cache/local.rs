//! The catalog service as a cache backend, for single-process deployments
//! and tests.

use super::source::{CatalogApi, CatalogSource, SourceError};
use crate::catalog::{CatalogEntity, CatalogService, Product, Project};
use crate::model::ModelStore;
use crate::sequence::IdAllocator;
use crate::storage::ObjectStore;

impl<S, A, O> CatalogSource for CatalogService<S, A, O>
where
    S: ModelStore + 'static,
    A: IdAllocator + 'static,
    O: ObjectStore + 'static,
{
    async fn list_products(&self) -> Result<Vec<Product>, SourceError> {
        Ok(self.list::<Product>()?)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, SourceError> {
        Ok(self.list::<Project>()?)
    }
}

impl<S, A, O> CatalogApi for CatalogService<S, A, O>
where
    S: ModelStore + 'static,
    A: IdAllocator + 'static,
    O: ObjectStore + 'static,
{
    async fn create_entity<E: CatalogEntity>(&self, input: &E::New) -> Result<E, SourceError> {
        Ok(self.create::<E>(input.clone())?)
    }

    async fn update_entity<E: CatalogEntity>(&self, id: u64, patch: &E::Patch) -> Result<E, SourceError> {
        Ok(self.update::<E>(id, patch.clone())?)
    }

    async fn delete_entity<E: CatalogEntity>(&self, id: u64) -> Result<(), SourceError> {
        self.delete::<E>(id)?;
        Ok(())
    }
}
