//! Authorization for catalog mutations.
//!
//! Every create, update, delete and upload request passes through an
//! `Authorizer` before reaching the catalog service. Reads are public.
//! Issuing credentials (login) is outside this crate; deployments put a
//! real identity provider behind the trait.

mod session;

use crate::catalog::CatalogError;

pub use session::Session;

/// Decides whether a request may mutate the catalog.
pub trait Authorizer: Send + Sync {
    fn authorize(&self, session: &Session) -> Result<(), CatalogError>;
}

/// Accepts requests carrying `Authorization: Bearer <token>` with one
/// configured admin token.
pub struct StaticTokenAuthorizer {
    token: String,
}

impl StaticTokenAuthorizer {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl Authorizer for StaticTokenAuthorizer {
    fn authorize(&self, session: &Session) -> Result<(), CatalogError> {
        match session.bearer_token() {
            Some(token) if constant_time_eq(token.as_bytes(), self.token.as_bytes()) => Ok(()),
            Some(_) => Err(CatalogError::Unauthorized("invalid token".into())),
            None => Err(CatalogError::Unauthorized("missing bearer token".into())),
        }
    }
}

/// Rejects every mutation. Used when no admin credential is configured.
pub struct DenyAll;

impl Authorizer for DenyAll {
    fn authorize(&self, _session: &Session) -> Result<(), CatalogError> {
        Err(CatalogError::Unauthorized("mutations are disabled".into()))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
