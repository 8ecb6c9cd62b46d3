//! Backend contract of the cache: listing endpoints and mutations.

use std::error::Error;
use std::fmt;
use std::future::Future;

use crate::catalog::{CatalogEntity, CatalogError, Product, Project};

/// Error type for backend calls made by the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The request never got a response.
    Transport(String),
    /// The backend answered with a failure status.
    Status { status: u16, message: String },
    /// The response body had an unexpected shape.
    Decode(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Transport(msg) => write!(f, "transport error: {}", msg),
            SourceError::Status { status, message } => write!(f, "{} ({})", message, status),
            SourceError::Decode(msg) => write!(f, "unexpected response: {}", msg),
        }
    }
}

impl Error for SourceError {}

impl From<CatalogError> for SourceError {
    fn from(err: CatalogError) -> Self {
        SourceError::Status {
            status: err.status_code(),
            message: err.to_string(),
        }
    }
}

/// The listing endpoints a cache loads from.
pub trait CatalogSource: Send + Sync + 'static {
    fn list_products(&self) -> impl Future<Output = Result<Vec<Product>, SourceError>> + Send;
    fn list_projects(&self) -> impl Future<Output = Result<Vec<Project>, SourceError>> + Send;
}

/// Mutation endpoints. Each call resolves to the canonical record the
/// backend stored.
pub trait CatalogApi: CatalogSource {
    fn create_entity<E: CatalogEntity>(
        &self,
        input: &E::New,
    ) -> impl Future<Output = Result<E, SourceError>> + Send;

    fn update_entity<E: CatalogEntity>(
        &self,
        id: u64,
        patch: &E::Patch,
    ) -> impl Future<Output = Result<E, SourceError>> + Send;

    fn delete_entity<E: CatalogEntity>(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<(), SourceError>> + Send;
}
