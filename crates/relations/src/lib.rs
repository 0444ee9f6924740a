//! # Relations Crate
//!
//! Everything between the distance search and the place relation lists
//! come from.
//!
//! ## Components
//!
//! ### RelationFetcher
//! The collaborator interface: `fetch_relations(key)` returns an entity's
//! direct relation list (an actor's movies, a movie's cast) or a
//! [`FetchError`]. Each call may be a network round trip.
//!
//! ### RelationCache
//! Explicit memoizing cache owning a fetcher. Consulted before every fetch,
//! never fetches the same key twice concurrently, optionally LRU-bounded.
//!
//! ### IndexFetcher
//! A fetcher that answers from a loaded `FilmographyIndex`.
//!
//! ## Example Usage
//!
//! ```ignore
//! use relations::{IndexFetcher, RelationCache};
//! use data_loader::{EntityKey, FilmographyIndex};
//! use std::sync::Arc;
//!
//! let index = Arc::new(FilmographyIndex::load_from_files(Path::new("data/sample"))?);
//! let cache = RelationCache::new(IndexFetcher::new(index));
//!
//! let movies = cache.get(&EntityKey::parse("/name/nm0000138/")?)?;
//! println!("{} movies, cache stats: {:?}", movies.len(), cache.stats());
//! ```

pub mod fetcher;
pub mod cache;
pub mod index_fetcher;

pub use fetcher::{FetchError, RelationFetcher};
pub use cache::{CacheStats, RelationCache};
pub use index_fetcher::IndexFetcher;

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{EntityKey, FilmographyIndex};
    use std::sync::Arc;

    #[test]
    fn test_cache_over_empty_index() {
        let cache = RelationCache::new(IndexFetcher::new(Arc::new(FilmographyIndex::new())));
        let err = cache.get(&EntityKey::new("/name/nm1/")).unwrap_err();
        assert_eq!(err.key().as_str(), "/name/nm1/");
        assert_eq!(cache.stats().failures, 1);
    }

    #[test]
    fn test_shared_fetcher_through_arc() {
        let fetcher = Arc::new(IndexFetcher::new(Arc::new(FilmographyIndex::new())));
        let cache = RelationCache::new(Arc::clone(&fetcher));
        assert!(cache.is_empty());
        assert_eq!(Arc::strong_count(&fetcher), 2);
    }
}
