//! Cross-module tests for the scenario core
//!
//! - Script round trips through parse and serialize
//! - Graph invariants under mixed edit sequences
//! - Quadtree completeness and rebuild behaviour against brute force
//! - Loading failures leaving live state untouched
