//! Times a dataset load, then derives every actor's filmography once.
//!
//! Run with: cargo run --package data-loader --example benchmark_load [DATA_DIR]

use data_loader::{FilmographyIndex, RelationQuery};
use std::path::PathBuf;
use std::time::Instant;

fn main() -> Result<(), data_loader::DataLoadError> {
    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/sample"));

    println!("Loading filmography dataset from {}...", data_dir.display());
    let start = Instant::now();
    let index = FilmographyIndex::load_from_files(&data_dir)?;
    let load_time = start.elapsed();
    let (people, titles, credits) = index.counts();

    let start = Instant::now();
    let query = RelationQuery::all();
    let mut linked_movies = 0;
    for key in index.person_keys() {
        linked_movies += index
            .movies_by_actor(&key, &query)
            .map_or(0, |movies| movies.len());
    }
    let derive_time = start.elapsed();

    println!("\n=== Load ===");
    println!("{} people, {} titles, {} credits in {:?}", people, titles, credits, load_time);
    println!("{:.0} credits/second", credits as f64 / load_time.as_secs_f64());

    println!("\n=== Filmographies ===");
    println!("{} actor-movie links across {} people in {:?}", linked_movies, people, derive_time);
    Ok(())
}
