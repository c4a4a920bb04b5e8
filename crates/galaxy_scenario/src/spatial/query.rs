/// Spatial query result types
use crate::types::Point;

/// A datapoint found by a radial query, together with its distance to the
/// query center.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<T> {
    /// Payload of the matched datapoint
    pub payload: T,
    /// Location of the matched datapoint
    pub location: Point,
    /// Euclidean distance from the query center
    pub distance: f64,
}

/// Orders results by ascending distance; equal distances keep their
/// discovery order.
pub(crate) fn sort_by_distance<T>(results: &mut [QueryResult<T>]) {
    results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
}
