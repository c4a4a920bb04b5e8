//! Spatial indexing for star systems
//!
//! This module provides the region quadtree used to answer rectangle and
//! radius queries against placed systems. The index is a derived projection of
//! the scenario: it can always be rebuilt from the system map and is never
//! authoritative.

mod query;
mod quadtree;

// Re-export public types and functions
pub use quadtree::{Datapoint, NodeStats, QuadTree, DEFAULT_CAPACITY, MAX_DEPTH};
pub use query::QueryResult;
