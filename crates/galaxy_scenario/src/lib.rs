//! # Galaxy Scenario
//!
//! Data model, spatial index and script codec for static galaxy scenarios:
//! star systems placed on a 2D map, hyperlanes connecting them and nebulae
//! layered on top.
//!
//! ## Core Features
//!
//! - **Spatial Index**: Capacity-bounded quadtree with rectangle, point and
//!   radial queries
//! - **Scenario Graph**: Systems, undirected hyperlanes and nebulae kept
//!   mutually consistent behind a single aggregate
//! - **Script Codec**: Loss-free round trip to `static_galaxy_scenario`
//!   scripts, with all-or-nothing loading
//! - **Editor Session**: Picking, locking and radius-based lane editing on top
//!   of the scenario and its index
//! - **Snapshots**: Versioned JSON copies of a whole session
//!
//! ## Architecture Overview
//!
//! The [`Scenario`] owns every entity. The [`QuadTree`] is a derived
//! projection of system locations and is rebuilt from the scenario whenever
//! systems move or disappear. The codec produces a [`ParsedScenario`] in a
//! scratch buffer first and only then replaces the live scenario.
//!
//! ## Quick Start Example
//!
//! ```rust
//! use galaxy_scenario::*;
//!
//! let bounds = Rectangle::new(Point::new(-500.0, 500.0), 1000.0, 1000.0);
//! let mut editor = Editor::new(bounds, DEFAULT_CAPACITY);
//!
//! editor.add_system(System::new(SystemId(1), "Sol", Point::new(0.0, 0.0)));
//! editor.add_system(System::new(SystemId(2), "Vega", Point::new(30.0, 40.0)));
//!
//! editor.set_active(Some(SystemId(1)));
//! assert_eq!(editor.link_nearby(60.0), 1);
//! assert!(editor.scenario().linked(SystemId(2), SystemId(1)));
//!
//! let script = editor.export();
//! let mut reloaded = Scenario::new();
//! reloaded.load_str(&script)?;
//! assert_eq!(reloaded.export_lanes(), editor.scenario().export_lanes());
//! # Ok::<(), FormatError>(())
//! ```

pub mod codec;
pub mod editor;
pub mod error;
pub mod scenario;
pub mod snapshot;
pub mod spatial;
pub mod types;

#[cfg(test)]
mod tests;

pub use codec::{parse_str, serialize, ParsedScenario, SourceText};
pub use editor::Editor;
pub use error::{FormatError, SnapshotError, ValidationError};
pub use scenario::{
    Annotation, Lane, PositionRange, Scenario, SettingKey, SettingValue, Settings, SpawnWeight,
    System,
};
pub use snapshot::{AnnotationRecord, ScenarioSnapshot, SystemRecord, SNAPSHOT_VERSION};
pub use spatial::{Datapoint, NodeStats, QuadTree, QueryResult, DEFAULT_CAPACITY, MAX_DEPTH};
pub use types::{AnnotationId, Point, Rectangle, SystemId};
