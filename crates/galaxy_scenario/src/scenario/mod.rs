//! Scenario graph model
//!
//! Systems are the vertices, hyperlanes the undirected edges and nebulae free
//! standing spatial annotations. [`Scenario`] owns all of them together with
//! the [`Settings`] record and enforces the cross-container invariants.

mod annotation;
mod graph;
mod settings;
mod system;

pub use annotation::Annotation;
pub use graph::{Lane, Scenario};
pub use settings::{SettingKey, SettingValue, Settings};
pub use system::{PositionRange, SpawnWeight, System};
