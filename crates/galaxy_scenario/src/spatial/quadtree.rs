//! Region quadtree for point-keyed payloads
//!
//! Each node owns a bounding rectangle and buffers up to `capacity`
//! datapoints. When the buffer is full the node subdivides once into four
//! equal quadrants and routes further insertions to the child that contains
//! the location. Buffered entries are not redistributed on subdivision, so
//! queries scan the buffer of every node they intersect, ancestors included.

use super::query::{sort_by_distance, QueryResult};
use crate::types::{Point, Rectangle};
use tracing::debug;

/// Default number of datapoints buffered per node.
pub const DEFAULT_CAPACITY: usize = 5;

/// Depth at which nodes stop subdividing and buffer past capacity.
///
/// Guards against unbounded recursion when many datapoints share a location.
pub const MAX_DEPTH: usize = 32;

/// Payload paired with the location it is indexed under.
#[derive(Debug, Clone, PartialEq)]
pub struct Datapoint<T> {
    /// Associated payload (typically a system id)
    pub payload: T,
    /// Indexed location
    pub location: Point,
}

impl<T> Datapoint<T> {
    /// Creates a new datapoint.
    pub fn new(payload: T, location: Point) -> Self {
        Self { payload, location }
    }
}

/// Structural statistics of a quadtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStats {
    /// Datapoints held anywhere in the tree
    pub total_objects: usize,
    /// Deepest node level (root is 0)
    pub max_depth: usize,
    /// Nodes without children
    pub leaf_nodes: usize,
    /// Nodes with children
    pub internal_nodes: usize,
}

/// Region quadtree over a fixed bounding rectangle.
#[derive(Debug, Clone)]
pub struct QuadTree<T> {
    /// Area covered by this node
    bounds: Rectangle,
    /// Datapoints buffered before subdividing
    capacity: usize,
    /// Level of this node (root is 0)
    depth: usize,
    /// Datapoints buffered at this node
    datapoints: Vec<Datapoint<T>>,
    /// Quadrants in tl, tr, bl, br order once subdivided
    children: Option<Box<[QuadTree<T>; 4]>>,
}

impl<T> QuadTree<T> {
    /// Creates an empty tree with the default per-node capacity.
    pub fn new(bounds: Rectangle) -> Self {
        Self::with_capacity(bounds, DEFAULT_CAPACITY)
    }

    /// Creates an empty tree buffering `capacity` datapoints per node.
    ///
    /// A capacity of zero is treated as one.
    pub fn with_capacity(bounds: Rectangle, capacity: usize) -> Self {
        Self::node(bounds, capacity.max(1), 0)
    }

    fn node(bounds: Rectangle, capacity: usize, depth: usize) -> Self {
        Self {
            bounds,
            capacity,
            depth,
            datapoints: Vec::new(),
            children: None,
        }
    }

    /// Area covered by the tree.
    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    /// Per-node capacity used for future subdivision decisions.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Nesting level of this node; the root is 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether this node has been subdivided.
    pub fn is_parent(&self) -> bool {
        self.children.is_some()
    }

    /// Inserts a datapoint.
    ///
    /// Returns `false`, leaving the tree untouched, when the location lies
    /// outside the tree bounds. Locations outside the root rectangle can never
    /// be indexed; choose the bounds generously.
    pub fn insert(&mut self, datapoint: Datapoint<T>) -> bool {
        if !self.bounds.contains(datapoint.location) {
            return false;
        }
        self.place(datapoint);
        true
    }

    /// Stores a datapoint already known to lie inside this node.
    fn place(&mut self, datapoint: Datapoint<T>) {
        if self.datapoints.len() < self.capacity || self.depth >= MAX_DEPTH {
            self.datapoints.push(datapoint);
            return;
        }

        if !self.is_parent() {
            self.subdivide();
        }

        let child = self.children.as_deref_mut().and_then(|children| {
            children
                .iter_mut()
                .find(|child| child.bounds.contains(datapoint.location))
        });
        match child {
            Some(child) => child.place(datapoint),
            // Rounded quadrant edges can leave a sliver next to the boundary.
            None => self.datapoints.push(datapoint),
        }
    }

    /// Turns this leaf into a parent with four empty quadrant children.
    ///
    /// Datapoints already buffered here stay at this level. Calling this on a
    /// parent does nothing.
    pub fn subdivide(&mut self) {
        if self.is_parent() {
            return;
        }

        let depth = self.depth + 1;
        let capacity = self.capacity;
        let [tl, tr, bl, br] = self.bounds.quadrants();
        self.children = Some(Box::new([
            Self::node(tl, capacity, depth),
            Self::node(tr, capacity, depth),
            Self::node(bl, capacity, depth),
            Self::node(br, capacity, depth),
        ]));
    }

    /// Resets the tree to an empty leaf, discarding children.
    pub fn clear(&mut self) {
        self.datapoints.clear();
        self.children = None;
    }

    /// Number of datapoints held anywhere in the tree.
    pub fn len(&self) -> usize {
        let below: usize = self
            .children
            .as_deref()
            .map(|children| children.iter().map(QuadTree::len).sum())
            .unwrap_or(0);
        self.datapoints.len() + below
    }

    /// Returns true if the tree holds no datapoints.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes and re-inserts every datapoint.
    pub fn rebuild(&mut self) {
        let mut datapoints = Vec::with_capacity(self.len());
        self.drain_into(&mut datapoints);
        self.clear();

        let total = datapoints.len();
        let mut dropped = 0;
        for datapoint in datapoints {
            if !self.insert(datapoint) {
                dropped += 1;
            }
        }
        debug!(total, dropped, capacity = self.capacity, "🌳 Quadtree rebuilt");
    }

    /// Changes the per-node capacity and rebuilds the tree.
    ///
    /// Capacity only influences future subdivisions, so the existing structure
    /// is discarded and every datapoint re-inserted.
    pub fn repartition(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.rebuild();
    }

    /// Collects structural statistics for the whole tree.
    pub fn node_stats(&self) -> NodeStats {
        let mut stats = NodeStats::default();
        self.accumulate_stats(&mut stats);
        stats
    }

    fn accumulate_stats(&self, stats: &mut NodeStats) {
        stats.total_objects += self.datapoints.len();
        stats.max_depth = stats.max_depth.max(self.depth);
        match self.children.as_deref() {
            Some(children) => {
                stats.internal_nodes += 1;
                for child in children {
                    child.accumulate_stats(stats);
                }
            }
            None => stats.leaf_nodes += 1,
        }
    }

    fn drain_into(&mut self, out: &mut Vec<Datapoint<T>>) {
        out.append(&mut self.datapoints);
        if let Some(children) = self.children.as_deref_mut() {
            for child in children {
                child.drain_into(out);
            }
        }
    }

    fn visit_in<'a>(&'a self, target: &Rectangle, visit: &mut impl FnMut(&'a Datapoint<T>)) {
        if !self.bounds.intersects(target) {
            return;
        }

        for datapoint in &self.datapoints {
            if target.contains(datapoint.location) {
                visit(datapoint);
            }
        }

        if let Some(children) = self.children.as_deref() {
            for child in children {
                child.visit_in(target, visit);
            }
        }
    }
}

impl<T: Clone> QuadTree<T> {
    /// Returns every datapoint located inside `target`.
    pub fn query(&self, target: &Rectangle) -> Vec<Datapoint<T>> {
        let mut results = Vec::new();
        self.visit_in(target, &mut |datapoint| results.push(datapoint.clone()));
        results
    }

    /// Returns every datapoint located exactly at `point`.
    pub fn query_point(&self, point: Point) -> Vec<Datapoint<T>> {
        self.query(&Rectangle::from_point(point))
    }

    /// Returns every datapoint within Euclidean distance `radius` of `center`.
    ///
    /// Candidates come from the square circumscribing the circle and are then
    /// filtered by exact distance, since the tree only prunes on axis-aligned
    /// rectangles.
    pub fn radial_query(&self, center: Point, radius: f64) -> Vec<Datapoint<T>> {
        let mut results = Vec::new();
        self.visit_in(&Rectangle::around(center, radius), &mut |datapoint| {
            if center.distance(datapoint.location) <= radius {
                results.push(datapoint.clone());
            }
        });
        results
    }

    /// Radial query returning results ordered by ascending distance.
    pub fn radial_query_ranked(&self, center: Point, radius: f64) -> Vec<QueryResult<T>> {
        let mut results = Vec::new();
        self.visit_in(&Rectangle::around(center, radius), &mut |datapoint| {
            let distance = center.distance(datapoint.location);
            if distance <= radius {
                results.push(QueryResult {
                    payload: datapoint.payload.clone(),
                    location: datapoint.location,
                    distance,
                });
            }
        });
        sort_by_distance(&mut results);
        results
    }

    /// Closest datapoint inside the square of half-size `reach` around
    /// `center`, if any.
    pub fn nearest_within(&self, center: Point, reach: f64) -> Option<QueryResult<T>> {
        let mut best: Option<QueryResult<T>> = None;
        self.visit_in(&Rectangle::around(center, reach), &mut |datapoint| {
            let distance = center.distance(datapoint.location);
            if best.as_ref().map_or(true, |current| distance < current.distance) {
                best = Some(QueryResult {
                    payload: datapoint.payload.clone(),
                    location: datapoint.location,
                    distance,
                });
            }
        });
        best
    }

    /// Returns every datapoint held anywhere in the tree.
    pub fn dump(&self) -> Vec<Datapoint<T>> {
        let mut datapoints = Vec::with_capacity(self.len());
        self.dump_into(&mut datapoints);
        datapoints
    }

    fn dump_into(&self, out: &mut Vec<Datapoint<T>>) {
        out.extend(self.datapoints.iter().cloned());
        if let Some(children) = self.children.as_deref() {
            for child in children {
                child.dump_into(out);
            }
        }
    }
}
