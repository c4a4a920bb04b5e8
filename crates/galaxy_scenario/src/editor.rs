//! Editing session.
//!
//! An [`Editor`] owns a [`Scenario`] together with the spatial index derived
//! from its system locations and the transient editing state: the active
//! system and the set of systems locked against lane edits.
//!
//! The index has no removal operation. Any change that moves or removes a
//! system rebuilds it from the scenario, so it never holds stale entries.

use crate::codec::{self, ParsedScenario, SourceText};
use crate::error::FormatError;
use crate::scenario::{Scenario, Settings, System};
use crate::snapshot::ScenarioSnapshot;
use crate::spatial::{Datapoint, QuadTree};
use crate::types::{Point, Rectangle, SystemId};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Scenario plus derived index and editing state.
#[derive(Debug, Clone)]
pub struct Editor {
    scenario: Scenario,
    index: QuadTree<SystemId>,
    locked: BTreeSet<SystemId>,
    active: Option<SystemId>,
}

impl Editor {
    /// Creates an empty session whose index covers `bounds`.
    pub fn new(bounds: Rectangle, capacity: usize) -> Self {
        Self {
            scenario: Scenario::new(),
            index: QuadTree::with_capacity(bounds, capacity),
            locked: BTreeSet::new(),
            active: None,
        }
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn index(&self) -> &QuadTree<SystemId> {
        &self.index
    }

    /// Scenario settings. Settings do not affect the index.
    pub fn settings_mut(&mut self) -> &mut Settings {
        self.scenario.settings_mut()
    }

    /// Adds a system to the scenario and the index.
    ///
    /// A system outside the index bounds is still added to the scenario but
    /// cannot be picked or found by nearby queries; this is reported as
    /// `false`, as is a duplicate id.
    pub fn add_system(&mut self, system: System) -> bool {
        let (id, location) = (system.id, system.location);
        if !self.scenario.add_system(system) {
            return false;
        }
        if !self.index.insert(Datapoint::new(id, location)) {
            warn!(id = %id, x = location.x, y = location.y, "System lies outside the index bounds");
            return false;
        }
        true
    }

    /// Removes a system, its lanes, its lock and its active status.
    pub fn remove_system(&mut self, id: SystemId) -> Option<System> {
        let removed = self.scenario.remove_system(id)?;
        self.locked.remove(&id);
        if self.active == Some(id) {
            self.active = None;
        }
        self.reindex();
        Some(removed)
    }

    /// Moves a system and refreshes the index.
    pub fn relocate_system(&mut self, id: SystemId, location: Point) -> bool {
        if !self.scenario.relocate_system(id, location) {
            return false;
        }
        self.reindex();
        true
    }

    /// Nearest system within the square of half-size `tolerance` around
    /// `point`.
    pub fn pick(&self, point: Point, tolerance: f64) -> Option<SystemId> {
        self.index
            .nearest_within(point, tolerance)
            .map(|found| found.payload)
    }

    /// Makes a system active, or clears the selection with `None`.
    ///
    /// Returns `false` and leaves the selection alone for unknown ids.
    pub fn set_active(&mut self, id: Option<SystemId>) -> bool {
        match id {
            Some(id) if !self.scenario.contains_system(id) => false,
            _ => {
                self.active = id;
                true
            }
        }
    }

    pub fn active(&self) -> Option<SystemId> {
        self.active
    }

    /// Flips the lock on a system. Returns whether it is now locked.
    pub fn toggle_lock(&mut self, id: SystemId) -> bool {
        if !self.scenario.contains_system(id) {
            return false;
        }
        if self.locked.remove(&id) {
            false
        } else {
            self.locked.insert(id);
            true
        }
    }

    pub fn is_locked(&self, id: SystemId) -> bool {
        self.locked.contains(&id)
    }

    /// Locked system ids in ascending order.
    pub fn locked(&self) -> impl Iterator<Item = SystemId> + '_ {
        self.locked.iter().copied()
    }

    /// Adds the lane between two systems, or removes it if present.
    ///
    /// Refuses self pairs, unknown systems and locked endpoints. Returns
    /// whether anything changed.
    pub fn toggle_lane(&mut self, a: SystemId, b: SystemId) -> bool {
        if a == b || self.is_locked(a) || self.is_locked(b) {
            return false;
        }
        if self.scenario.linked(a, b) {
            self.scenario.remove_lane(a, b)
        } else {
            self.scenario.add_lane(a, b)
        }
    }

    /// Links the active system to every unlocked system within `radius`.
    ///
    /// Returns the number of lanes created.
    pub fn link_nearby(&mut self, radius: f64) -> usize {
        let changed = self
            .nearby_unlocked(radius)
            .into_iter()
            .filter(|(origin, other)| self.scenario.add_lane(*origin, *other))
            .count();
        debug!(radius, changed, "Linked nearby systems");
        changed
    }

    /// Removes lanes from the active system to unlocked systems within
    /// `radius`. Returns the number of lanes removed.
    pub fn unlink_nearby(&mut self, radius: f64) -> usize {
        let changed = self
            .nearby_unlocked(radius)
            .into_iter()
            .filter(|(origin, other)| self.scenario.remove_lane(*origin, *other))
            .count();
        debug!(radius, changed, "Unlinked nearby systems");
        changed
    }

    /// (active, other) pairs for every unlocked system near the active one.
    fn nearby_unlocked(&self, radius: f64) -> Vec<(SystemId, SystemId)> {
        let Some(origin) = self.active else {
            return Vec::new();
        };
        if self.is_locked(origin) {
            return Vec::new();
        }
        let Some(center) = self.scenario.get_system(origin).map(|s| s.location) else {
            return Vec::new();
        };

        self.index
            .radial_query(center, radius)
            .into_iter()
            .map(|datapoint| datapoint.payload)
            .filter(|id| *id != origin && !self.is_locked(*id))
            .map(|id| (origin, id))
            .collect()
    }

    /// Replaces the session with a parsed script.
    ///
    /// Locks and the active system are cleared. On error nothing changes.
    pub fn load_str(&mut self, text: &str) -> Result<(), FormatError> {
        let parsed = codec::parse_str(text)?;
        self.import(parsed);
        Ok(())
    }

    /// Reads a script file and replaces the session with it.
    pub async fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), FormatError> {
        let parsed = SourceText::load(path).await?.parse();
        self.import(parsed);
        Ok(())
    }

    /// Replaces the session with already parsed records.
    pub fn import(&mut self, parsed: ParsedScenario) {
        self.scenario.import(parsed);
        self.locked.clear();
        self.active = None;
        self.reindex();
    }

    /// Renders the scenario as a script.
    pub fn export(&self) -> String {
        self.scenario.serialize()
    }

    pub fn snapshot(&self) -> ScenarioSnapshot {
        ScenarioSnapshot::capture(&self.scenario, self.locked())
    }

    /// Replaces the session with a snapshot. Locks naming unknown systems are
    /// dropped.
    pub fn restore(&mut self, snapshot: &ScenarioSnapshot) {
        self.scenario.import(snapshot.to_parsed());
        self.locked = snapshot
            .locked
            .iter()
            .copied()
            .filter(|id| self.scenario.contains_system(*id))
            .collect();
        self.active = None;
        self.reindex();
        info!(locked = self.locked.len(), "♻️ Session restored from snapshot");
    }

    /// Rebuilds the index from the scenario's system locations.
    pub fn reindex(&mut self) {
        self.index.clear();
        let mut outside = 0usize;
        for datapoint in self.scenario.system_datapoints() {
            if !self.index.insert(datapoint) {
                outside += 1;
            }
        }
        if outside > 0 {
            warn!(outside, "Systems outside the index bounds were not indexed");
        }
        debug!(indexed = self.index.len(), "Index rebuilt from scenario");
    }

    /// Changes the index node capacity.
    pub fn repartition(&mut self, capacity: usize) {
        self.index.repartition(capacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> Editor {
        let mut editor = Editor::new(Rectangle::new(Point::new(-100.0, 100.0), 200.0, 200.0), 2);
        editor.add_system(System::new(SystemId(1), "Hub", Point::new(0.0, 0.0)));
        editor.add_system(System::new(SystemId(2), "East", Point::new(10.0, 0.0)));
        editor.add_system(System::new(SystemId(3), "North", Point::new(0.0, 20.0)));
        editor.add_system(System::new(SystemId(4), "Far", Point::new(80.0, 80.0)));
        editor
    }

    #[test]
    fn test_out_of_bounds_system_kept_in_scenario() {
        let mut editor = editor();
        assert!(!editor.add_system(System::new(SystemId(9), "Outlier", Point::new(500.0, 0.0))));
        assert!(editor.scenario().contains_system(SystemId(9)));
        assert_eq!(editor.index().len(), 4);
    }

    #[test]
    fn test_pick_returns_nearest() {
        let editor = editor();
        assert_eq!(editor.pick(Point::new(8.0, 1.0), 5.0), Some(SystemId(2)));
        assert_eq!(editor.pick(Point::new(1.0, 1.0), 5.0), Some(SystemId(1)));
        assert_eq!(editor.pick(Point::new(40.0, 40.0), 2.5), None);
    }

    #[test]
    fn test_link_nearby_respects_locks() {
        let mut editor = editor();
        assert!(editor.set_active(Some(SystemId(1))));
        assert!(editor.toggle_lock(SystemId(3)));

        assert_eq!(editor.link_nearby(25.0), 1);
        assert!(editor.scenario().linked(SystemId(1), SystemId(2)));
        assert!(!editor.scenario().linked(SystemId(1), SystemId(3)));

        assert!(!editor.toggle_lock(SystemId(3)));
        assert_eq!(editor.link_nearby(25.0), 1);
        assert_eq!(editor.scenario().lane_count(), 2);

        assert_eq!(editor.unlink_nearby(15.0), 1);
        assert_eq!(editor.scenario().export_lanes().len(), 1);
    }

    #[test]
    fn test_nearby_edits_need_unlocked_active_system() {
        let mut editor = editor();
        assert_eq!(editor.link_nearby(50.0), 0);

        editor.set_active(Some(SystemId(1)));
        editor.toggle_lock(SystemId(1));
        assert_eq!(editor.link_nearby(50.0), 0);
        assert_eq!(editor.scenario().lane_count(), 0);
    }

    #[test]
    fn test_toggle_lane() {
        let mut editor = editor();
        assert!(editor.toggle_lane(SystemId(1), SystemId(4)));
        assert!(editor.scenario().linked(SystemId(4), SystemId(1)));
        assert!(editor.toggle_lane(SystemId(4), SystemId(1)));
        assert!(!editor.scenario().linked(SystemId(1), SystemId(4)));

        assert!(!editor.toggle_lane(SystemId(2), SystemId(2)));
        editor.toggle_lock(SystemId(2));
        assert!(!editor.toggle_lane(SystemId(1), SystemId(2)));
    }

    #[test]
    fn test_remove_system_clears_session_state() {
        let mut editor = editor();
        editor.set_active(Some(SystemId(2)));
        editor.toggle_lock(SystemId(2));
        editor.toggle_lane(SystemId(1), SystemId(3));

        assert!(editor.remove_system(SystemId(2)).is_some());
        assert_eq!(editor.active(), None);
        assert!(!editor.is_locked(SystemId(2)));
        assert_eq!(editor.index().len(), 3);
        assert_eq!(editor.pick(Point::new(10.0, 0.0), 1.0), None);
        assert!(editor.scenario().linked(SystemId(1), SystemId(3)));
    }

    #[test]
    fn test_relocate_refreshes_index() {
        let mut editor = editor();
        assert!(editor.relocate_system(SystemId(4), Point::new(-50.0, -50.0)));
        assert_eq!(editor.pick(Point::new(80.0, 80.0), 1.0), None);
        assert_eq!(editor.pick(Point::new(-50.0, -50.0), 1.0), Some(SystemId(4)));
        assert_eq!(editor.index().len(), 4);
    }

    #[test]
    fn test_set_active_rejects_unknown_system() {
        let mut editor = editor();
        editor.set_active(Some(SystemId(1)));
        assert!(!editor.set_active(Some(SystemId(42))));
        assert_eq!(editor.active(), Some(SystemId(1)));
        assert!(editor.set_active(None));
        assert_eq!(editor.active(), None);
    }

    #[test]
    fn test_snapshot_restore_keeps_locks() {
        let mut editor = editor();
        editor.toggle_lock(SystemId(4));
        editor.toggle_lane(SystemId(1), SystemId(2));
        let snapshot = editor.snapshot();

        let mut restored = Editor::new(editor.index().bounds(), 5);
        restored.restore(&snapshot);

        assert!(restored.is_locked(SystemId(4)));
        assert_eq!(restored.scenario().export_lanes(), editor.scenario().export_lanes());
        assert_eq!(restored.index().len(), 4);
    }

    #[test]
    fn test_failed_load_leaves_session_untouched() {
        let mut editor = editor();
        editor.toggle_lock(SystemId(1));

        assert!(editor.load_str("static_galaxy_scenario = {\n").is_err());
        assert_eq!(editor.scenario().system_count(), 4);
        assert!(editor.is_locked(SystemId(1)));
    }

    #[test]
    fn test_load_resets_session_state() {
        let mut editor = editor();
        editor.toggle_lock(SystemId(1));
        editor.set_active(Some(SystemId(1)));

        let script = "static_galaxy_scenario = {\n\
                      \tsystem = { id = \"5\" name = \"Solo\" position = { x = -5 y = 5 } }\n\
                      }";
        editor.load_str(script).unwrap();

        assert_eq!(editor.scenario().system_count(), 1);
        assert_eq!(editor.active(), None);
        assert_eq!(editor.locked().count(), 0);
        assert_eq!(editor.pick(Point::new(5.0, 5.0), 1.0), Some(SystemId(5)));
    }

    #[tokio::test]
    async fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pair.txt");
        tokio::fs::write(
            &path,
            "static_galaxy_scenario = {\r\n\
             \tsystem = { id = \"1\" name = \"A\" position = { x = 0 y = 0 } }\r\n\
             \tsystem = { id = \"2\" name = \"B\" position = { x = 3 y = 4 } }\r\n\
             \tadd_hyperlane = { from = \"2\" to = \"1\" }\r\n\
             }\r\n",
        )
        .await
        .unwrap();

        let mut editor = editor();
        editor.load_file(&path).await.unwrap();
        assert_eq!(editor.scenario().system_count(), 2);
        assert!(editor.scenario().linked(SystemId(1), SystemId(2)));
        assert_eq!(editor.pick(Point::new(-3.0, 4.0), 0.5), Some(SystemId(2)));
    }

    #[test]
    fn test_repartition_keeps_every_system() {
        let mut editor = editor();
        editor.repartition(1);
        assert_eq!(editor.index().capacity(), 1);
        assert_eq!(editor.index().len(), 4);
    }
}
