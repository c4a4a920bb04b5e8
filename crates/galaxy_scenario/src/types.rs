//! # Core Type Definitions
//!
//! Fundamental types shared by the spatial index, the scenario graph and the
//! script codec.
//!
//! ## Key Types
//!
//! - [`SystemId`] - Identifier of a star system (graph vertex)
//! - [`AnnotationId`] - Identifier of a nebula annotation
//! - [`Point`] - 2D position with double precision
//! - [`Rectangle`] - Axis-aligned region used by the quadtree
//!
//! ## Orientation
//!
//! The editor world is y-up everywhere. A [`Rectangle`] is anchored at its
//! top-left corner, i.e. the corner with the smallest x and the largest y, and
//! extends right (+x) and down (-y) from there. The only axis flip in the
//! crate happens in the codec, where the script format mirrors the x axis.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier of a star system.
///
/// System ids are assigned externally (by the scenario script or by the
/// editor) and are stable for the lifetime of the system. Their ordering is
/// meaningful: canonical lane storage keys an edge by its smaller endpoint.
///
/// # Examples
///
/// ```rust
/// use galaxy_scenario::SystemId;
///
/// let id: SystemId = "42".parse()?;
/// assert_eq!(id, SystemId(42));
/// assert_eq!(id.to_string(), "42");
/// # Ok::<(), std::num::ParseIntError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemId(pub u32);

impl FromStr for SystemId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SystemId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// Unique identifier of a nebula annotation.
///
/// Annotation ids are derived from the annotation's own location and radius
/// (see [`AnnotationId::derive`]), so two nebulae occupying the same circle
/// collapse into one entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(pub String);

impl AnnotationId {
    /// Derives the id of an annotation centred at `location` with `radius`.
    pub fn derive(location: Point, radius: f64) -> Self {
        Self(format!("n.{}.{}.{}", location.x, location.y, radius))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// A 2D position in the galaxy plane.
///
/// # Examples
///
/// ```rust
/// use galaxy_scenario::Point;
///
/// let origin = Point::new(0.0, 0.0);
/// assert_eq!(origin.distance(Point::new(3.0, 4.0)), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate (grows to the right)
    pub x: f64,
    /// Y coordinate (grows upward)
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
///
/// Covers `x ∈ [top_left.x, top_left.x + width]` and
/// `y ∈ [top_left.y - height, top_left.y]`. Both intervals are closed, so
/// points on an edge belong to the rectangle and zero-area rectangles are
/// valid query targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    /// Corner with the smallest x and the largest y
    pub top_left: Point,
    /// Extent along +x
    pub width: f64,
    /// Extent along -y
    pub height: f64,
}

impl Rectangle {
    /// Creates a rectangle from its top-left corner and extents.
    pub const fn new(top_left: Point, width: f64, height: f64) -> Self {
        Self {
            top_left,
            width,
            height,
        }
    }

    /// Zero-area rectangle located exactly at `point`.
    pub const fn from_point(point: Point) -> Self {
        Self::new(point, 0.0, 0.0)
    }

    /// Square circumscribing the circle of `radius` around `center`.
    pub fn around(center: Point, radius: f64) -> Self {
        Self::new(
            Point::new(center.x - radius, center.y + radius),
            2.0 * radius,
            2.0 * radius,
        )
    }

    /// Smallest x covered.
    pub fn left(&self) -> f64 {
        self.top_left.x
    }

    /// Largest x covered.
    pub fn right(&self) -> f64 {
        self.top_left.x + self.width
    }

    /// Largest y covered.
    pub fn top(&self) -> f64 {
        self.top_left.y
    }

    /// Smallest y covered.
    pub fn bottom(&self) -> f64 {
        self.top_left.y - self.height
    }

    /// Returns true if `point` lies inside or on the edge of the rectangle.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y <= self.top()
            && point.y >= self.bottom()
    }

    /// Returns true if the two rectangles overlap or touch.
    pub fn intersects(&self, other: &Rectangle) -> bool {
        !(self.right() < other.left()
            || self.left() > other.right()
            || self.bottom() > other.top()
            || self.top() < other.bottom())
    }

    /// Splits the rectangle into its four equal quadrants, in
    /// top-left, top-right, bottom-left, bottom-right order.
    ///
    /// Far edges are measured from the parent's own edges, so the outer
    /// children reach the parent boundary as closely as floating point allows.
    pub fn quadrants(&self) -> [Rectangle; 4] {
        let (left, top) = (self.left(), self.top());
        let mid_x = left + self.width / 2.0;
        let mid_y = top - self.height / 2.0;
        let (west, east) = (mid_x - left, self.right() - mid_x);
        let (north, south) = (top - mid_y, mid_y - self.bottom());

        [
            Rectangle::new(Point::new(left, top), west, north),
            Rectangle::new(Point::new(mid_x, top), east, north),
            Rectangle::new(Point::new(left, mid_y), west, south),
            Rectangle::new(Point::new(mid_x, mid_y), east, south),
        ]
    }
}
