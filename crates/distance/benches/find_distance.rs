//! Benchmarks for the distance search
//!
//! Run with: cargo bench --package distance
//!
//! Uses the sample dataset at the workspace root. The cold benchmark builds a
//! fresh cache per query; the warm one reuses a cache that already holds
//! every relation list the query needs.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{EntityKey, FilmographyIndex};
use distance::{DistanceFinder, SearchLimits};
use relations::{IndexFetcher, RelationCache};
use std::path::Path;
use std::sync::Arc;

fn load_test_data() -> Arc<FilmographyIndex> {
    let data_dir = Path::new("../../data/sample");
    let index = FilmographyIndex::load_from_files(data_dir).expect("Failed to load test data");
    Arc::new(index)
}

/// First and last person by key, so the pair is stable between runs
fn endpoints(index: &FilmographyIndex) -> (EntityKey, EntityKey) {
    let keys = index.person_keys();
    let first = keys.first().cloned().expect("Sample dataset has no people");
    let last = keys.last().cloned().expect("Sample dataset has no people");
    (first, last)
}

fn bench_cold_cache(c: &mut Criterion) {
    let index = load_test_data();
    let (start, end) = endpoints(&index);
    let limits = SearchLimits::unbounded();

    c.bench_function("find_distance_cold_cache", |b| {
        b.iter(|| {
            let cache = RelationCache::new(IndexFetcher::new(index.clone()));
            let finder = DistanceFinder::new(&cache);
            let distance = finder
                .find_distance_within(black_box(&start), black_box(&end), &limits)
                .unwrap();
            black_box(distance)
        })
    });
}

fn bench_warm_cache(c: &mut Criterion) {
    let index = load_test_data();
    let (start, end) = endpoints(&index);
    let limits = SearchLimits::unbounded();
    let cache = RelationCache::new(IndexFetcher::new(index));
    let finder = DistanceFinder::new(&cache);
    finder.find_distance_within(&start, &end, &limits).unwrap();

    c.bench_function("find_distance_warm_cache", |b| {
        b.iter(|| {
            let distance = finder
                .find_distance_within(black_box(&start), black_box(&end), &limits)
                .unwrap();
            black_box(distance)
        })
    });
}

criterion_group!(benches, bench_cold_cache, bench_warm_cache);
criterion_main!(benches);
