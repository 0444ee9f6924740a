//! Simple test harness for the distance orchestrator.
//!
//! Loads a dataset, then computes the pairwise distance graph for every
//! person in it and logs the result.
//!
//! Usage: server [DATA_DIR]   (defaults to data/sample)

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use data_loader::FilmographyIndex;
use relations::{IndexFetcher, RelationCache};
use server::DistanceOrchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug")),
        )
        .init();

    info!("Starting distance orchestrator test harness");

    let data_dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/sample"));

    info!("Loading filmography index from {}", data_dir.display());
    let index = FilmographyIndex::load_from_files(&data_dir)
        .with_context(|| format!("Failed to load dataset from {}", data_dir.display()))?;
    let index = Arc::new(index);
    let actors = index.person_keys();

    let cache = Arc::new(RelationCache::new(IndexFetcher::new(Arc::clone(&index))));
    let orchestrator = DistanceOrchestrator::new(cache);

    let graph = orchestrator.pairwise_distances(actors).await?;

    info!("Received {} edges:", graph.edges.len());
    for edge in &graph.edges {
        let name = |key| {
            index
                .get_person(key)
                .map(|person| person.name.as_str())
                .unwrap_or("?")
        };
        info!(
            "{} <-> {}: {}{}",
            name(&edge.source),
            name(&edge.target),
            edge.distance,
            if edge.exact { "" } else { "+" }
        );
    }
    for (distance, count) in graph.histogram() {
        info!("distance {}: {} pairs", distance, count);
    }

    let stats = orchestrator.cache_stats();
    info!(
        "Cache: {} hits, {} fetches, {} failures",
        stats.hits, stats.fetches, stats.failures
    );
    Ok(())
}
