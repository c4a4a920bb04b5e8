//! Nebula annotations: spatial regions independent of the lane graph.

use crate::types::{AnnotationId, Point};

/// A circular nebula region.
///
/// The id is derived from location and radius, so it is recomputed whenever
/// an annotation is constructed and never stored independently.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    id: AnnotationId,
    /// Display name
    pub name: String,
    location: Point,
    radius: f64,
}

impl Annotation {
    /// Creates a nebula and derives its id.
    pub fn new(name: impl Into<String>, location: Point, radius: f64) -> Self {
        Self {
            id: AnnotationId::derive(location, radius),
            name: name.into(),
            location,
            radius,
        }
    }

    /// Identifier derived from location and radius.
    pub fn id(&self) -> &AnnotationId {
        &self.id
    }

    /// Center in editor coordinates.
    pub fn location(&self) -> Point {
        self.location
    }

    /// Radius in map units.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Whether `point` lies inside the nebula.
    pub fn covers(&self, point: Point) -> bool {
        self.location.distance(point) <= self.radius
    }
}
