//! Example: Walk relation lists through the cache
//!
//! Run with: cargo run --package relations --example warm_cache
//!
//! This example shows how to:
//! 1. Load the sample dataset
//! 2. Put a RelationCache in front of an IndexFetcher
//! 3. Fetch an actor's movies, then every cast of those movies
//! 4. Repeat the walk and watch it come back from the cache

use data_loader::{EntityKey, FilmographyIndex};
use relations::{IndexFetcher, RelationCache};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info,relations=debug")
        .init();

    println!("=== Relation Cache Example ===\n");

    println!("Loading sample dataset...");
    let start = Instant::now();
    let index = Arc::new(FilmographyIndex::load_from_files(Path::new("data/sample"))?);
    println!("Loaded dataset in {:?}\n", start.elapsed());

    let cache = RelationCache::new(IndexFetcher::new(Arc::clone(&index)));
    let actor = EntityKey::parse("https://www.imdb.com/name/nm0000138/")?;

    for round in 1..=2 {
        let start = Instant::now();
        let movies = cache.get(&actor)?;
        let mut co_stars = 0;
        for movie in movies.iter() {
            co_stars += cache.get(&movie.key)?.len();
        }
        println!(
            "Round {}: {} movies, {} cast entries in {:?}",
            round,
            movies.len(),
            co_stars,
            start.elapsed()
        );
        println!("  {:?}", cache.stats());
    }

    Ok(())
}
