//! Catalog - products and projects, and the service that manages them.
//!
//! Both entity kinds share one shape: a public `numeric_id` stamped once
//! from a named sequence, a non-empty title, an ordered gallery whose first
//! URL is the cover image, and kind-specific fields. `CatalogEntity`
//! captures that shape so the service, the HTTP layer and the client cache
//! handle both kinds with the same code.
//!
//! ## Example
//!
//! ```ignore
//! let catalog = CatalogService::new(conn.clone(), SequenceAllocator::new(conn), objects);
//!
//! let product: Product = catalog.create(NewProduct {
//!     title: Some("Line follower".into()),
//!     short: Some("Entry-level robot kit".into()),
//!     ..Default::default()
//! })?;
//! assert_eq!(product.numeric_id, 1);
//!
//! catalog.update::<Product>(1, ProductPatch { title: Some("Line follower v2".into()), ..Default::default() })?;
//! catalog.delete::<Product>(1)?;
//! ```

mod error;
mod filter;
mod product;
mod project;
mod service;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::model::Model;

pub use error::{CatalogError, ValidationError};
pub use filter::{filter_projects, search};
pub use product::{NewProduct, Product, ProductPatch};
pub use project::{NewProject, Project, ProjectPatch, ProjectStatus};
pub use service::{CatalogService, DeleteReport};
#[cfg(feature = "http")]
pub(crate) use service::parse_id;

/// A `[key, value]` row of an entity's specification table.
pub type SpecPair = (String, String);

/// Shared behaviour of products and projects.
pub trait CatalogEntity: Model + 'static {
    /// Sequence the numeric id is drawn from.
    const SEQUENCE: &'static str;
    /// Singular name, used as the JSON envelope key (`"product"`).
    const KIND: &'static str;

    /// Creation input.
    type New: DeserializeOwned + Serialize + Clone + Send + Sync;
    /// Partial update input; absent fields are left untouched.
    type Patch: DeserializeOwned + Serialize + Clone + Send + Sync;

    fn numeric_id(&self) -> u64;
    fn title(&self) -> &str;
    fn gallery(&self) -> &[String];
    fn created_at(&self) -> u64;
    fn set_updated_at(&mut self, at: u64);

    /// The cover image, if the gallery has any.
    fn cover(&self) -> Option<&str> {
        self.gallery().first().map(String::as_str)
    }

    /// Check required fields of a creation input.
    fn validate_new(input: &Self::New) -> Result<(), ValidationError>;

    /// Build the entity from a validated input.
    fn from_new(input: Self::New, numeric_id: u64, now: u64) -> Self;

    /// Reject patches that would blank a required field.
    fn validate_patch(patch: &Self::Patch) -> Result<(), ValidationError>;

    /// Overwrite the fields present in `patch`.
    fn apply_patch(&mut self, patch: Self::Patch);

    /// Case-insensitive substring match against the entity's text fields.
    fn matches(&self, query: &str) -> bool;
}

/// `true` if `field` lower-cased contains `needle` (already lower-cased).
pub(crate) fn contains_folded(field: &str, needle: &str) -> bool {
    field.to_lowercase().contains(needle)
}

pub(crate) fn required(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(ValidationError::MissingField(field)),
    }
}

pub(crate) fn not_blank(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ValidationError::MissingField(field)),
        _ => Ok(()),
    }
}
