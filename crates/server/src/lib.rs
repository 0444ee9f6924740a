//! Server crate for the reel-links distance engine.
//!
//! This crate contains the orchestrator that runs distance queries over a
//! shared relation cache, one at a time or as pairwise batches.

pub mod orchestrator;

pub use orchestrator::{ActorDistanceGraph, DistanceEdge, DistanceOrchestrator};
