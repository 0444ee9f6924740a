//! Bounded actor-distance search.
//!
//! This crate provides:
//! - DistanceGraph, the witness graph built during one query
//! - SearchLimits, validated per-step exploration caps
//! - DistanceFinder, the level 0 / level 1 search with a depth-3 fallback
//!
//! ## Example Usage
//! ```ignore
//! use distance::{Distance, DistanceFinder};
//! use relations::{IndexFetcher, RelationCache};
//!
//! let cache = RelationCache::new(IndexFetcher::new(index));
//! let finder = DistanceFinder::new(&cache);
//!
//! let distance = finder.find_distance(&start, &end, Some(5), Some(5))?;
//! println!("{} -> {}: {}", start, end, distance);
//! ```

pub mod error;
pub mod limits;
pub mod graph;
pub mod finder;

// Re-export main types
pub use error::{DistanceError, Result};
pub use limits::SearchLimits;
pub use graph::DistanceGraph;
pub use finder::{Distance, DistanceFinder, DistanceTrace};
