//! The fetch collaborator seam.
//!
//! A [`RelationFetcher`] resolves an entity key to its direct relation list:
//! an actor's movies or a movie's cast. In production that is a network
//! round trip, so everything above this trait goes through
//! [`crate::RelationCache`].

use data_loader::{EntityKey, RelatedEntity};
use std::sync::Arc;
use thiserror::Error;

/// Errors a fetcher can report for a single key
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The key does not resolve to any entity
    #[error("No entity found for {key}")]
    NotFound { key: EntityKey },

    /// The source could not be reached or returned unusable data
    #[error("Relations for {key} unavailable: {reason}")]
    Unavailable { key: EntityKey, reason: String },
}

impl FetchError {
    pub fn key(&self) -> &EntityKey {
        match self {
            FetchError::NotFound { key } | FetchError::Unavailable { key, .. } => key,
        }
    }
}

/// Resolves an entity key to its ordered relation list.
///
/// ## Contract
/// - Idempotent: the same key always yields the same list within a process run
/// - Safe to cache indefinitely per key
/// - `Send + Sync` so one fetcher can serve parallel searches
pub trait RelationFetcher: Send + Sync {
    fn fetch_relations(&self, key: &EntityKey) -> Result<Vec<RelatedEntity>, FetchError>;
}

impl<T: RelationFetcher + ?Sized> RelationFetcher for &T {
    fn fetch_relations(&self, key: &EntityKey) -> Result<Vec<RelatedEntity>, FetchError> {
        (**self).fetch_relations(key)
    }
}

impl<T: RelationFetcher + ?Sized> RelationFetcher for Arc<T> {
    fn fetch_relations(&self, key: &EntityKey) -> Result<Vec<RelatedEntity>, FetchError> {
        (**self).fetch_relations(key)
    }
}

impl<T: RelationFetcher + ?Sized> RelationFetcher for Box<T> {
    fn fetch_relations(&self, key: &EntityKey) -> Result<Vec<RelatedEntity>, FetchError> {
        (**self).fetch_relations(key)
    }
}
