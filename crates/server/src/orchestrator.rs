//! # Distance Orchestrator
//!
//! Runs distance queries off the async runtime and fans batches out in
//! parallel:
//! 1. Single queries run the finder on the blocking pool
//! 2. Pairwise batches deduplicate the actor list, then evaluate every
//!    unordered pair with rayon on the blocking pool
//! 3. All queries share one relation cache, so a relation list is fetched
//!    at most once no matter how many pairs need it
//!
//! The result of a batch is an [`ActorDistanceGraph`]: one edge per actor
//! pair, labelled with the distance found.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use data_loader::EntityKey;
use distance::{Distance, DistanceFinder, DistanceTrace, SearchLimits};
use relations::{CacheStats, RelationCache, RelationFetcher};

/// Distance between one pair of actors
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistanceEdge {
    pub source: EntityKey,
    pub target: EntityKey,
    /// Numeric distance; 3 when no link was found within the explored depth
    pub distance: u32,
    /// False when `distance` is the fallback value rather than a found chain
    pub exact: bool,
}

impl DistanceEdge {
    fn new(source: EntityKey, target: EntityKey, distance: Distance) -> Self {
        Self {
            source,
            target,
            distance: distance.value(),
            exact: distance.is_exact(),
        }
    }

    fn connects(&self, a: &EntityKey, b: &EntityKey) -> bool {
        (&self.source == a && &self.target == b) || (&self.source == b && &self.target == a)
    }
}

/// Complete graph over a set of actors with distance-labelled edges
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActorDistanceGraph {
    pub actors: Vec<EntityKey>,
    pub edges: Vec<DistanceEdge>,
}

impl ActorDistanceGraph {
    /// Edges of one distance, or every edge for `None`
    pub fn edges_at(&self, distance: Option<u32>) -> Vec<&DistanceEdge> {
        self.edges
            .iter()
            .filter(|edge| distance.is_none_or(|d| edge.distance == d))
            .collect()
    }

    pub fn distance_between(&self, a: &EntityKey, b: &EntityKey) -> Option<u32> {
        if a == b && self.actors.contains(a) {
            return Some(0);
        }
        self.edges
            .iter()
            .find(|edge| edge.connects(a, b))
            .map(|edge| edge.distance)
    }

    /// Number of edges per distance value
    pub fn histogram(&self) -> BTreeMap<u32, usize> {
        let mut histogram = BTreeMap::new();
        for edge in &self.edges {
            *histogram.entry(edge.distance).or_insert(0) += 1;
        }
        histogram
    }
}

/// Coordinates distance queries over a shared relation cache
pub struct DistanceOrchestrator<F> {
    cache: Arc<RelationCache<F>>,
    limits: SearchLimits,
}

impl<F> Clone for DistanceOrchestrator<F> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            limits: self.limits,
        }
    }
}

impl<F: RelationFetcher + 'static> DistanceOrchestrator<F> {
    /// Orchestrator with unbounded search limits
    pub fn new(cache: Arc<RelationCache<F>>) -> Self {
        Self {
            cache,
            limits: SearchLimits::unbounded(),
        }
    }

    /// Limits applied to every query run by this orchestrator
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> SearchLimits {
        self.limits
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Distance between two actors, with the witness graph
    pub async fn distance(&self, start: EntityKey, end: EntityKey) -> Result<DistanceTrace> {
        let start_time = Instant::now();
        let cache = Arc::clone(&self.cache);
        let limits = self.limits;

        let trace = tokio::task::spawn_blocking(move || {
            DistanceFinder::new(&cache).trace(&start, &end, &limits)
        })
        .await
        .context("Distance task panicked")?
        .context("Distance query failed")?;

        info!(
            "Distance query finished in {:.2?}: {}",
            start_time.elapsed(),
            trace.distance
        );
        Ok(trace)
    }

    /// Distances between every pair of the given actors.
    ///
    /// Duplicate keys are dropped (first occurrence wins). Any fetch failure
    /// fails the whole batch.
    pub async fn pairwise_distances(&self, actors: Vec<EntityKey>) -> Result<ActorDistanceGraph> {
        let start_time = Instant::now();
        let actors = dedup_keys(actors);
        let pairs = unordered_pairs(actors.len());
        info!(
            "Computing {} pairwise distances for {} actors",
            pairs.len(),
            actors.len()
        );

        let cache = Arc::clone(&self.cache);
        let limits = self.limits;
        let task_actors = actors.clone();

        let edges = tokio::task::spawn_blocking(move || {
            pairs
                .par_iter()
                .map(|&(i, j)| -> distance::Result<DistanceEdge> {
                    let (a, b) = (&task_actors[i], &task_actors[j]);
                    let found = DistanceFinder::new(&cache).find_distance_within(a, b, &limits)?;
                    debug!(source = %a, target = %b, distance = %found, "Pair resolved");
                    Ok(DistanceEdge::new(a.clone(), b.clone(), found))
                })
                .collect::<distance::Result<Vec<DistanceEdge>>>()
        })
        .await
        .context("Pairwise distance task panicked")?
        .context("Pairwise distance query failed")?;

        let stats = self.cache.stats();
        info!(
            "Pairwise distances finished in {:.2?} (cache hits={}, fetches={})",
            start_time.elapsed(),
            stats.hits,
            stats.fetches
        );
        Ok(ActorDistanceGraph { actors, edges })
    }
}

/// Drop repeated keys, keeping the first occurrence
fn dedup_keys(keys: Vec<EntityKey>) -> Vec<EntityKey> {
    let mut seen = HashSet::new();
    keys.into_iter()
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

/// All index pairs (i, j) with i < j
fn unordered_pairs(n: usize) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Credit, FilmographyIndex, Person, ReleaseStatus, Role, Title, TitleKind};
    use relations::IndexFetcher;

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    fn key(s: &str) -> EntityKey {
        EntityKey::new(s)
    }

    /// a and b share m1; c played with b's co-star in m2; d is isolated
    fn build_test_index() -> Arc<FilmographyIndex> {
        let mut index = FilmographyIndex::new();
        for id in ["a", "b", "c", "d"] {
            index.insert_person(Person {
                key: key(id),
                name: format!("Actor {}", id.to_uppercase()),
            });
        }
        for id in ["m1", "m2", "m3"] {
            index.insert_title(Title {
                key: key(id),
                title: format!("Movie {}", id),
                year: None,
                kind: TitleKind::Feature,
                status: ReleaseStatus::Released,
            });
        }
        for (person, title) in [("a", "m1"), ("b", "m1"), ("b", "m2"), ("c", "m2"), ("d", "m3")] {
            index.insert_credit(Credit {
                person: key(person),
                title: key(title),
                role: Role::Actor,
            });
        }
        Arc::new(index)
    }

    fn build_test_orchestrator() -> DistanceOrchestrator<IndexFetcher> {
        let cache = Arc::new(RelationCache::new(IndexFetcher::new(build_test_index())));
        DistanceOrchestrator::new(cache)
    }

    // ============================================================================
    // Unit Tests: helpers
    // ============================================================================

    #[test]
    fn test_dedup_keys_keeps_first_occurrence() {
        let keys = vec![key("b"), key("a"), key("b"), key("c"), key("a")];
        assert_eq!(dedup_keys(keys), vec![key("b"), key("a"), key("c")]);
    }

    #[test]
    fn test_unordered_pairs() {
        assert_eq!(unordered_pairs(3), vec![(0, 1), (0, 2), (1, 2)]);
        assert!(unordered_pairs(1).is_empty());
        assert!(unordered_pairs(0).is_empty());
    }

    // ============================================================================
    // Async Tests: orchestrator
    // ============================================================================

    #[tokio::test]
    async fn test_single_distance() {
        let orchestrator = build_test_orchestrator();
        let trace = orchestrator.distance(key("a"), key("b")).await.unwrap();
        assert_eq!(trace.distance, Distance::Exact(1));
    }

    #[tokio::test]
    async fn test_single_distance_reports_fetch_failure() {
        let orchestrator = build_test_orchestrator();
        let result = orchestrator.distance(key("a"), key("ghost")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_pairwise_distances_cover_every_pair() {
        let orchestrator = build_test_orchestrator();
        let graph = orchestrator
            .pairwise_distances(vec![key("a"), key("b"), key("c"), key("d"), key("a")])
            .await
            .unwrap();

        assert_eq!(graph.actors.len(), 4);
        assert_eq!(graph.edges.len(), 6);
        assert_eq!(graph.distance_between(&key("a"), &key("b")), Some(1));
        assert_eq!(graph.distance_between(&key("b"), &key("a")), Some(1));
        assert_eq!(graph.distance_between(&key("a"), &key("c")), Some(2));
        assert_eq!(graph.distance_between(&key("a"), &key("d")), Some(3));
        assert_eq!(graph.distance_between(&key("a"), &key("a")), Some(0));
    }

    #[tokio::test]
    async fn test_edges_at_and_histogram() {
        let orchestrator = build_test_orchestrator();
        let graph = orchestrator
            .pairwise_distances(vec![key("a"), key("b"), key("c"), key("d")])
            .await
            .unwrap();

        // a-b and b-c share a movie
        let direct = graph.edges_at(Some(1));
        assert_eq!(direct.len(), 2);
        assert!(direct.iter().all(|edge| edge.exact));

        // Every pair with d falls back
        let fallback = graph.edges_at(Some(3));
        assert_eq!(fallback.len(), 3);
        assert!(fallback.iter().all(|edge| !edge.exact));

        assert_eq!(graph.edges_at(None).len(), 6);
        let histogram = graph.histogram();
        assert_eq!(histogram.get(&1), Some(&2));
        assert_eq!(histogram.get(&2), Some(&1));
        assert_eq!(histogram.get(&3), Some(&3));
    }

    #[tokio::test]
    async fn test_repeat_batch_is_served_from_cache() {
        let orchestrator = build_test_orchestrator();
        let actors = vec![key("a"), key("b"), key("c")];

        orchestrator.pairwise_distances(actors.clone()).await.unwrap();
        let fetches = orchestrator.cache_stats().fetches;

        orchestrator.pairwise_distances(actors).await.unwrap();
        assert_eq!(orchestrator.cache_stats().fetches, fetches);
    }

    #[tokio::test]
    async fn test_pairwise_fails_on_unknown_actor() {
        let orchestrator = build_test_orchestrator();
        let result = orchestrator
            .pairwise_distances(vec![key("a"), key("ghost")])
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_graph_serializes_keys_as_strings() {
        let orchestrator = build_test_orchestrator();
        let graph = orchestrator
            .pairwise_distances(vec![key("a"), key("b")])
            .await
            .unwrap();

        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json["actors"][0], "a");
        assert_eq!(json["edges"][0]["distance"], 1);
        assert_eq!(json["edges"][0]["exact"], true);
    }
}
