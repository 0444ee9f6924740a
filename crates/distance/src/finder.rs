//! Distance Finder - bounded actor-to-actor distance search
//!
//! Finds how many "shared movie" links separate two actors, expanding from
//! both ends by at most one extra step.
//!
//! ## Algorithm
//! 1. Level 0: if the two actors share a movie, the distance is 1.
//! 2. Level 1: zip the start actor's movies with the end actor's movies
//!    (first `movie_limit` of each). For every movie pair, zip their casts
//!    (first `actor_limit` of each). For every actor pair `(e1, e2)`:
//!    - skip the pair if both are already in the graph
//!    - otherwise connect `start -> e1` and `end -> e2` for whichever is new
//!    - if `e1` shares a movie with `end`, connect them and report the
//!      shortest path length; symmetrically `e2` with `start`
//! 3. Otherwise report [`Distance::Beyond`] (3 or more).
//!
//! Zipping positionally instead of exploring the cross product keeps the
//! number of fetches linear in the limits. It can miss a distance-2 link
//! that is not aligned positionally; that case reports `Beyond`.

use crate::error::Result;
use crate::graph::DistanceGraph;
use crate::limits::SearchLimits;
use data_loader::{EntityKey, RelatedEntity, Relations};
use relations::{RelationCache, RelationFetcher};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, instrument};

/// Outcome of a distance query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Distance {
    /// A chain of exactly this many links was found
    Exact(u32),
    /// No link found within the explored depth: 3 or more, or unknown
    Beyond,
}

impl Distance {
    /// Value reported when the search gives up
    pub const FALLBACK: u32 = 3;

    /// Numeric distance; `Beyond` reads as [`Distance::FALLBACK`]
    pub fn value(self) -> u32 {
        match self {
            Distance::Exact(n) => n,
            Distance::Beyond => Self::FALLBACK,
        }
    }

    pub fn is_exact(self) -> bool {
        matches!(self, Distance::Exact(_))
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Exact(n) => write!(f, "{}", n),
            Distance::Beyond => write!(f, "{}+", Self::FALLBACK),
        }
    }
}

/// Distance together with the witness graph built while finding it
#[derive(Debug, Clone)]
pub struct DistanceTrace {
    pub distance: Distance,
    pub graph: DistanceGraph,
}

impl DistanceTrace {
    /// Chain of keys linking the endpoints, if the graph connects them
    pub fn witness(&self, start: &EntityKey, end: &EntityKey) -> Option<Vec<EntityKey>> {
        self.graph.shortest_path(start, end)
    }
}

/// Runs distance queries against a shared relation cache.
///
/// The finder itself holds no state between queries; the cache is what
/// amortizes fetches across them.
pub struct DistanceFinder<'c, F> {
    cache: &'c RelationCache<F>,
}

impl<F> Clone for DistanceFinder<'_, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F> Copy for DistanceFinder<'_, F> {}

impl<'c, F: RelationFetcher> DistanceFinder<'c, F> {
    pub fn new(cache: &'c RelationCache<F>) -> Self {
        Self { cache }
    }

    /// Distance between two actors.
    ///
    /// Limits are validated before anything is fetched; `None` means unbounded.
    pub fn find_distance(
        &self,
        start: &EntityKey,
        end: &EntityKey,
        actor_limit: Option<i64>,
        movie_limit: Option<i64>,
    ) -> Result<Distance> {
        let limits = SearchLimits::try_new(actor_limit, movie_limit)?;
        self.find_distance_within(start, end, &limits)
    }

    /// Distance between two actors with pre-validated limits
    pub fn find_distance_within(
        &self,
        start: &EntityKey,
        end: &EntityKey,
        limits: &SearchLimits,
    ) -> Result<Distance> {
        Ok(self.trace(start, end, limits)?.distance)
    }

    /// Run the search and keep the witness graph
    #[instrument(skip_all, fields(start = %start, end = %end))]
    pub fn trace(
        &self,
        start: &EntityKey,
        end: &EntityKey,
        limits: &SearchLimits,
    ) -> Result<DistanceTrace> {
        let mut graph = DistanceGraph::new();

        if start == end {
            graph.add_node(start.clone());
            return Ok(DistanceTrace {
                distance: Distance::Exact(0),
                graph,
            });
        }

        // Level 0: unbounded, these lists are needed whole for the membership tests
        let start_movies = self.cache.get(start)?;
        let end_movies = self.cache.get(end)?;
        let start_movie_keys = key_set(&start_movies);
        let end_movie_keys = key_set(&end_movies);

        if shares_any(&end_movies, &start_movie_keys) {
            debug!("Endpoints share a movie");
            graph.add_edge(start, end);
            if let Some(distance) = graph.shortest_path_len(start, end) {
                return Ok(DistanceTrace {
                    distance: Distance::Exact(distance),
                    graph,
                });
            }
        }

        // Level 1: pair movies, then pair their casts
        let movie_pairs = start_movies
            .iter()
            .take(limits.movies())
            .zip(end_movies.iter().take(limits.movies()));

        for (start_movie, end_movie) in movie_pairs {
            let start_cast = self.cache.get(&start_movie.key)?;
            let end_cast = self.cache.get(&end_movie.key)?;

            let actor_pairs = start_cast
                .iter()
                .take(limits.actors())
                .zip(end_cast.iter().take(limits.actors()));

            for (actor_1, actor_2) in actor_pairs {
                let known_1 = graph.contains_node(&actor_1.key);
                let known_2 = graph.contains_node(&actor_2.key);
                if known_1 && known_2 {
                    continue;
                }
                if !known_1 {
                    graph.add_edge(start, &actor_1.key);
                }
                if !known_2 {
                    graph.add_edge(end, &actor_2.key);
                }

                let actor_1_movies = self.cache.get(&actor_1.key)?;
                let actor_2_movies = self.cache.get(&actor_2.key)?;

                if shares_any(&actor_1_movies, &end_movie_keys) {
                    graph.add_edge(&actor_1.key, end);
                    if let Some(distance) = graph.shortest_path_len(start, end) {
                        debug!(via = %actor_1.key, distance, "Linked through start-side co-star");
                        return Ok(DistanceTrace {
                            distance: Distance::Exact(distance),
                            graph,
                        });
                    }
                }
                if shares_any(&actor_2_movies, &start_movie_keys) {
                    graph.add_edge(&actor_2.key, start);
                    if let Some(distance) = graph.shortest_path_len(start, end) {
                        debug!(via = %actor_2.key, distance, "Linked through end-side co-star");
                        return Ok(DistanceTrace {
                            distance: Distance::Exact(distance),
                            graph,
                        });
                    }
                }
            }
        }

        debug!(nodes = graph.node_count(), "No link within explored depth");
        Ok(DistanceTrace {
            distance: Distance::Beyond,
            graph,
        })
    }
}

fn key_set(relations: &Relations) -> HashSet<&EntityKey> {
    relations.iter().map(|r| &r.key).collect()
}

fn shares_any(relations: &[RelatedEntity], keys: &HashSet<&EntityKey>) -> bool {
    relations.iter().any(|r| keys.contains(&r.key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DistanceError;
    use relations::FetchError;
    use std::collections::HashMap;

    /// Fixed relation map; unknown keys fail like an unreachable page
    #[derive(Default)]
    struct MapFetcher {
        relations: HashMap<EntityKey, Vec<RelatedEntity>>,
    }

    impl MapFetcher {
        fn with(mut self, key: &str, related: &[&str]) -> Self {
            let list = related
                .iter()
                .map(|r| RelatedEntity::new(r.to_string(), *r))
                .collect();
            self.relations.insert(EntityKey::new(key), list);
            self
        }
    }

    impl RelationFetcher for MapFetcher {
        fn fetch_relations(&self, key: &EntityKey) -> std::result::Result<Vec<RelatedEntity>, FetchError> {
            self.relations
                .get(key)
                .cloned()
                .ok_or_else(|| FetchError::Unavailable {
                    key: key.clone(),
                    reason: "404".to_string(),
                })
        }
    }

    fn key(s: &str) -> EntityKey {
        EntityKey::new(s)
    }

    #[test]
    fn test_shared_movie_is_distance_one() {
        let cache = RelationCache::new(
            MapFetcher::default()
                .with("a", &["m1", "m2"])
                .with("b", &["m2", "m3"]),
        );
        let finder = DistanceFinder::new(&cache);

        let distance = finder.find_distance(&key("a"), &key("b"), None, None).unwrap();
        assert_eq!(distance, Distance::Exact(1));
        assert_eq!(cache.stats().fetches, 2);
    }

    #[test]
    fn test_self_distance_is_zero_without_fetching() {
        let cache = RelationCache::new(MapFetcher::default());
        let finder = DistanceFinder::new(&cache);

        let distance = finder.find_distance(&key("a"), &key("a"), None, None).unwrap();
        assert_eq!(distance, Distance::Exact(0));
        assert_eq!(cache.stats().fetches, 0);
    }

    #[test]
    fn test_co_star_link_is_distance_two() {
        // a -- m1 -- x -- m3 -- b
        let cache = RelationCache::new(
            MapFetcher::default()
                .with("a", &["m1"])
                .with("b", &["m3"])
                .with("m1", &["a", "x"])
                .with("m3", &["b", "y"])
                .with("x", &["m1", "m3"])
                .with("y", &["m3"]),
        );
        let finder = DistanceFinder::new(&cache);

        let trace = finder
            .trace(&key("a"), &key("b"), &SearchLimits::unbounded())
            .unwrap();
        assert_eq!(trace.distance, Distance::Exact(2));
        assert_eq!(
            trace.witness(&key("a"), &key("b")).unwrap(),
            vec![key("a"), key("x"), key("b")]
        );
    }

    #[test]
    fn test_invalid_limit_fetches_nothing() {
        let cache = RelationCache::new(MapFetcher::default().with("a", &["m1"]));
        let finder = DistanceFinder::new(&cache);

        let err = finder
            .find_distance(&key("a"), &key("b"), None, Some(0))
            .unwrap_err();
        assert!(matches!(err, DistanceError::InvalidLimit { name: "movie_limit", value: 0 }));
        assert_eq!(cache.stats().fetches, 0);
    }

    #[test]
    fn test_fetch_failure_aborts_query() {
        let cache = RelationCache::new(MapFetcher::default().with("a", &["m1"]));
        let finder = DistanceFinder::new(&cache);

        let err = finder
            .find_distance(&key("a"), &key("ghost"), None, None)
            .unwrap_err();
        match err {
            DistanceError::FetchFailure { key: failed, .. } => assert_eq!(failed, key("ghost")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_distance_display() {
        assert_eq!(Distance::Exact(2).to_string(), "2");
        assert_eq!(Distance::Beyond.to_string(), "3+");
        assert_eq!(Distance::Beyond.value(), 3);
        assert!(!Distance::Beyond.is_exact());
    }
}
