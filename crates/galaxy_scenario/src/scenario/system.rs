//! Star systems: the vertices of the scenario graph.

use crate::spatial::Datapoint;
use crate::types::{Point, SystemId};
use serde::{Deserialize, Serialize};

/// Raw `{ min = .. max = .. }` position encoding read from a script.
///
/// Kept alongside the collapsed location so the range is written back
/// unchanged on export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRange {
    /// Lower bound as written in the script
    pub min: i64,
    /// Upper bound as written in the script
    pub max: i64,
}

impl PositionRange {
    fn sum(&self) -> i128 {
        i128::from(self.min) + i128::from(self.max)
    }

    /// Floor of the midpoint, `floor((min + max) / 2)`.
    ///
    /// Computed without intermediate overflow; `None` when the result does
    /// not fit in an `i64`.
    pub fn floor_midpoint(&self) -> Option<i64> {
        i64::try_from(self.sum().div_euclid(2)).ok()
    }

    /// Floor of the negated midpoint, `floor(-(min + max) / 2)`.
    ///
    /// Used for the mirrored x axis of the script format. `None` when the
    /// result does not fit in an `i64`, which happens for `min = max = i64::MIN`.
    pub fn floor_mirrored_midpoint(&self) -> Option<i64> {
        i64::try_from((-self.sum()).div_euclid(2)).ok()
    }
}

/// `spawn_weight = { base = .. modifier = { add = .. has_country_flag = .. } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnWeight {
    /// Base spawn weight
    pub base: i64,
    /// Weight added when the country flag is set
    pub add: i64,
    /// Country flag gating the modifier
    pub country_flag: String,
}

/// A star system placed on the galaxy map.
#[derive(Debug, Clone, PartialEq)]
pub struct System {
    /// Unique, externally assigned id
    pub id: SystemId,
    /// Display name
    pub name: String,
    /// Location in editor coordinates
    pub location: Point,
    /// Script-level x range, when the system was loaded with one
    pub x_range: Option<PositionRange>,
    /// Script-level y range, when the system was loaded with one
    pub y_range: Option<PositionRange>,
    /// Optional system initializer
    pub initializer: Option<String>,
    /// Optional empire spawn weight
    pub spawn_weight: Option<SpawnWeight>,
}

impl System {
    /// Creates a plain system at a fixed location.
    pub fn new(id: SystemId, name: impl Into<String>, location: Point) -> Self {
        Self {
            id,
            name: name.into(),
            location,
            x_range: None,
            y_range: None,
            initializer: None,
            spawn_weight: None,
        }
    }

    /// Builder-style initializer setter.
    pub fn with_initializer(mut self, initializer: impl Into<String>) -> Self {
        self.initializer = Some(initializer.into());
        self
    }

    /// Builder-style spawn weight setter.
    pub fn with_spawn_weight(mut self, spawn_weight: SpawnWeight) -> Self {
        self.spawn_weight = Some(spawn_weight);
        self
    }

    /// Index entry for this system.
    pub fn datapoint(&self) -> Datapoint<SystemId> {
        Datapoint::new(self.id, self.location)
    }

    /// Moves the system, dropping any script range that no longer describes
    /// the new location.
    pub(crate) fn relocate(&mut self, location: Point) {
        if location.x != self.location.x {
            self.x_range = None;
        }
        if location.y != self.location.y {
            self.y_range = None;
        }
        self.location = location;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_midpoints_floor() {
        let range = PositionRange { min: -5, max: 10 };
        assert_eq!(range.floor_midpoint(), Some(2));
        assert_eq!(range.floor_mirrored_midpoint(), Some(-3));

        let even = PositionRange { min: 10, max: 20 };
        assert_eq!(even.floor_midpoint(), Some(15));
        assert_eq!(even.floor_mirrored_midpoint(), Some(-15));
    }

    #[test]
    fn test_range_midpoints_at_integer_limits() {
        let wide = PositionRange { min: i64::MAX, max: 1 };
        assert_eq!(wide.floor_midpoint(), Some(1 << 62));
        assert_eq!(wide.floor_mirrored_midpoint(), Some(-(1 << 62)));

        let lowest = PositionRange { min: i64::MIN, max: i64::MIN };
        assert_eq!(lowest.floor_midpoint(), Some(i64::MIN));
        assert_eq!(lowest.floor_mirrored_midpoint(), None);

        let highest = PositionRange { min: i64::MAX, max: i64::MAX };
        assert_eq!(highest.floor_mirrored_midpoint(), Some(-i64::MAX));
    }

    #[test]
    fn test_relocate_drops_stale_ranges() {
        let mut system = System::new(SystemId(1), "Sol", Point::new(-15.0, 15.0));
        system.x_range = Some(PositionRange { min: 10, max: 20 });
        system.y_range = Some(PositionRange { min: 10, max: 20 });

        system.relocate(Point::new(-15.0, 40.0));
        assert!(system.x_range.is_some());
        assert!(system.y_range.is_none());
        assert_eq!(system.datapoint().location, Point::new(-15.0, 40.0));
    }
}
