//! Fetcher backed by a loaded [`FilmographyIndex`].
//!
//! A person key resolves to the actor's movies, a title key to the movie's
//! cast. Used by the CLI against a local dataset and by tests.

use crate::fetcher::{FetchError, RelationFetcher};
use data_loader::{EntityKey, EntityKind, FilmographyIndex, RelatedEntity, RelationQuery};
use std::sync::Arc;
use tracing::trace;

#[derive(Clone)]
pub struct IndexFetcher {
    index: Arc<FilmographyIndex>,
}

impl IndexFetcher {
    pub fn new(index: Arc<FilmographyIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &FilmographyIndex {
        &self.index
    }
}

impl RelationFetcher for IndexFetcher {
    fn fetch_relations(&self, key: &EntityKey) -> Result<Vec<RelatedEntity>, FetchError> {
        let query = RelationQuery::all();
        let relations = match self.index.entity_kind(key) {
            Some(EntityKind::Person) => self.index.movies_by_actor(key, &query),
            Some(EntityKind::Title) => self.index.actors_by_movie(key, &query),
            None => None,
        };

        let relations = relations.ok_or_else(|| FetchError::NotFound { key: key.clone() })?;
        trace!(key = %key, count = relations.len(), "Resolved relations from index");
        Ok(relations)
    }
}
