//! Versioned session snapshots.
//!
//! A snapshot is a plain-data copy of a scenario plus the editor's lock set,
//! written as JSON. Locations are flattened into `x`/`y` fields in editor
//! orientation, so no axis mirroring happens here.

use crate::codec::ParsedScenario;
use crate::error::SnapshotError;
use crate::scenario::{Annotation, PositionRange, Scenario, Settings, SpawnWeight, System};
use crate::types::{Point, SystemId};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Format revision written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Flattened [`System`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemRecord {
    pub id: SystemId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_range: Option<PositionRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_range: Option<PositionRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_weight: Option<SpawnWeight>,
}

impl From<&System> for SystemRecord {
    fn from(system: &System) -> Self {
        Self {
            id: system.id,
            name: system.name.clone(),
            x: system.location.x,
            y: system.location.y,
            x_range: system.x_range,
            y_range: system.y_range,
            initializer: system.initializer.clone(),
            spawn_weight: system.spawn_weight.clone(),
        }
    }
}

impl From<SystemRecord> for System {
    fn from(record: SystemRecord) -> Self {
        let mut system = System::new(record.id, record.name, Point::new(record.x, record.y));
        system.x_range = record.x_range;
        system.y_range = record.y_range;
        system.initializer = record.initializer;
        system.spawn_weight = record.spawn_weight;
        system
    }
}

/// Flattened [`Annotation`]. The id is derived again on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl From<&Annotation> for AnnotationRecord {
    fn from(annotation: &Annotation) -> Self {
        let location = annotation.location();
        Self {
            name: annotation.name.clone(),
            x: location.x,
            y: location.y,
            radius: annotation.radius(),
        }
    }
}

impl From<AnnotationRecord> for Annotation {
    fn from(record: AnnotationRecord) -> Self {
        Annotation::new(record.name, Point::new(record.x, record.y), record.radius)
    }
}

/// Whole-session snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSnapshot {
    pub version: u32,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub systems: Vec<SystemRecord>,
    /// Canonical `[from, to]` pairs
    #[serde(default)]
    pub lanes: Vec<[u32; 2]>,
    #[serde(default)]
    pub annotations: Vec<AnnotationRecord>,
    #[serde(default)]
    pub locked: Vec<SystemId>,
}

impl ScenarioSnapshot {
    /// Captures a scenario and the ids locked against editing.
    pub fn capture(scenario: &Scenario, locked: impl IntoIterator<Item = SystemId>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            settings: scenario.settings().clone(),
            systems: scenario
                .export_systems()
                .into_iter()
                .map(SystemRecord::from)
                .collect(),
            lanes: scenario
                .export_lanes()
                .into_iter()
                .map(|lane| [lane.from.0, lane.to.0])
                .collect(),
            annotations: scenario
                .export_annotations()
                .into_iter()
                .map(AnnotationRecord::from)
                .collect(),
            locked: locked.into_iter().collect(),
        }
    }

    /// Entity records in the form [`Scenario::import`] consumes.
    pub fn to_parsed(&self) -> ParsedScenario {
        ParsedScenario {
            settings: self.settings.clone(),
            systems: self.systems.iter().cloned().map(System::from).collect(),
            lanes: self
                .lanes
                .iter()
                .map(|[from, to]| (SystemId(*from), SystemId(*to)))
                .collect(),
            annotations: self
                .annotations
                .iter()
                .cloned()
                .map(Annotation::from)
                .collect(),
        }
    }

    /// Rebuilds a standalone scenario.
    pub fn to_scenario(&self) -> Scenario {
        let mut scenario = Scenario::new();
        scenario.import(self.to_parsed());
        scenario
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes a snapshot, checking the version before the body.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let found = value
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0);
        if found != u64::from(SNAPSHOT_VERSION) {
            return Err(SnapshotError::UnsupportedVersion {
                found: u32::try_from(found).unwrap_or(u32::MAX),
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Writes the snapshot as pretty-printed JSON.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        tokio::fs::write(path, self.to_json()?).await?;
        info!(
            path = %path.display(),
            systems = self.systems.len(),
            lanes = self.lanes.len(),
            "💾 Snapshot saved"
        );
        Ok(())
    }

    /// Reads a snapshot written by [`ScenarioSnapshot::save`].
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await?;
        let snapshot = Self::from_json(&json)?;
        debug!(path = %path.display(), "Snapshot loaded");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Scenario {
        let mut scenario = Scenario::new();
        scenario.settings_mut().name = "Snapshot Test".into();
        let mut drift = System::new(SystemId(1), "Drift", Point::new(-13.0, 2.0));
        drift.x_range = Some(PositionRange { min: 10, max: 15 });
        scenario.add_system(drift);
        scenario.add_system(
            System::new(SystemId(2), "Beta", Point::new(10.5, -3.25)).with_initializer("beta_init"),
        );
        scenario.add_lane(SystemId(2), SystemId(1));
        scenario.add_annotation(Annotation::new("Veil", Point::new(4.0, 4.0), 12.0));
        scenario
    }

    #[test]
    fn test_capture_flattens_entities() {
        let snapshot = ScenarioSnapshot::capture(&sample(), [SystemId(2)]);

        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.systems.len(), 2);
        assert_eq!(snapshot.systems[1].x, 10.5);
        assert_eq!(snapshot.lanes, vec![[1, 2]]);
        assert_eq!(snapshot.annotations[0].radius, 12.0);
        assert_eq!(snapshot.locked, vec![SystemId(2)]);
    }

    #[test]
    fn test_json_round_trip_restores_scenario() {
        let original = sample();
        let json = ScenarioSnapshot::capture(&original, Vec::new()).to_json().unwrap();
        let restored = ScenarioSnapshot::from_json(&json).unwrap().to_scenario();

        assert_eq!(restored.settings(), original.settings());
        assert_eq!(restored.export_systems(), original.export_systems());
        assert_eq!(restored.export_lanes(), original.export_lanes());
        assert_eq!(restored.export_annotations(), original.export_annotations());
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let err = ScenarioSnapshot::from_json(r#"{ "version": 7, "systems": [] }"#).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::UnsupportedVersion { found: 7, expected: 1 }
        ));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let err = ScenarioSnapshot::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SnapshotError::Json(_)));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");

        let snapshot = ScenarioSnapshot::capture(&sample(), [SystemId(1)]);
        snapshot.save(&path).await.unwrap();
        let loaded = ScenarioSnapshot::load(&path).await.unwrap();

        assert_eq!(loaded, snapshot);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = ScenarioSnapshot::load(dir.path().join("absent.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, SnapshotError::Io(_)));
    }
}
