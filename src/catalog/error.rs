//! Error types for catalog operations.

use std::error::Error;
use std::fmt;

use crate::model::ModelError;
use crate::storage::StorageError;

/// Input rejected before any storage or allocator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is absent or blank.
    MissingField(&'static str),
    /// A project needs at least one gallery image.
    EmptyGallery,
    /// The id in the path is not a positive integer.
    InvalidId(String),
    /// The body could not be decoded into the expected shape.
    Malformed(String),
    /// A project status filter outside the known statuses.
    UnknownStatus(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingField(field) => write!(f, "{} is required", field),
            ValidationError::EmptyGallery => write!(f, "gallery must contain at least one image"),
            ValidationError::InvalidId(id) => write!(f, "invalid id: {}", id),
            ValidationError::Malformed(msg) => write!(f, "malformed input: {}", msg),
            ValidationError::UnknownStatus(status) => write!(f, "unknown status: {}", status),
        }
    }
}

impl Error for ValidationError {}

/// Error type for catalog service operations.
#[derive(Debug)]
pub enum CatalogError {
    /// Input failed validation; nothing was allocated or written.
    Validation(ValidationError),
    /// No entity of `kind` with this numeric id.
    NotFound { kind: &'static str, id: u64 },
    /// The sequence allocator failed; nothing was written.
    Allocation(ModelError),
    /// The document store failed.
    Storage(ModelError),
    /// Object storage failed on a non-best-effort path (presigning).
    Objects(StorageError),
    /// Missing or invalid credentials for a mutation.
    Unauthorized(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Validation(e) => write!(f, "{}", e),
            CatalogError::NotFound { kind, id } => write!(f, "{} {} not found", kind, id),
            CatalogError::Allocation(e) => write!(f, "id allocation failed: {}", e),
            CatalogError::Storage(e) => write!(f, "storage error: {}", e),
            CatalogError::Objects(e) => write!(f, "{}", e),
            CatalogError::Unauthorized(msg) => write!(f, "unauthorized: {}", msg),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CatalogError::Validation(e) => Some(e),
            CatalogError::Allocation(e) | CatalogError::Storage(e) => Some(e),
            CatalogError::Objects(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for CatalogError {
    fn from(err: ValidationError) -> Self {
        CatalogError::Validation(err)
    }
}

impl From<ModelError> for CatalogError {
    fn from(err: ModelError) -> Self {
        CatalogError::Storage(err)
    }
}

impl From<StorageError> for CatalogError {
    fn from(err: StorageError) -> Self {
        CatalogError::Objects(err)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Validation(ValidationError::Malformed(err.to_string()))
    }
}

impl CatalogError {
    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            CatalogError::Validation(_) => 400,
            CatalogError::NotFound { .. } => 404,
            CatalogError::Unauthorized(_) => 401,
            CatalogError::Objects(StorageError::InvalidKey(_)) => 400,
            CatalogError::Objects(_) => 502,
            CatalogError::Allocation(_) | CatalogError::Storage(_) => 500,
        }
    }
}
