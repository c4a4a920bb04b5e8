//! The scenario aggregate: systems, hyperlanes, nebulae and settings.
//!
//! Hyperlanes are undirected and stored twice over:
//!
//! * an adjacency set per system, symmetric, for O(log n) neighbour lookups
//!   and link checks;
//! * a canonical set keyed by the smaller endpoint and pointing at the larger
//!   one, for enumeration and export without duplicates.
//!
//! Every mutator updates both representations in lockstep; the containers are
//! private so they cannot drift apart.

use super::annotation::Annotation;
use super::settings::Settings;
use super::system::System;
use crate::codec::{self, ParsedScenario};
use crate::error::FormatError;
use crate::spatial::Datapoint;
use crate::types::{AnnotationId, Point, SystemId};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Undirected hyperlane in canonical form (`from < to`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lane {
    /// Smaller endpoint
    pub from: SystemId,
    /// Larger endpoint
    pub to: SystemId,
}

impl Lane {
    /// Canonical lane between two distinct systems, or `None` for a self pair.
    pub fn between(a: SystemId, b: SystemId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { from: a, to: b }),
            std::cmp::Ordering::Greater => Some(Self { from: b, to: a }),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Static galaxy scenario.
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    settings: Settings,
    systems: BTreeMap<SystemId, System>,
    adjacency: BTreeMap<SystemId, BTreeSet<SystemId>>,
    lanes: BTreeMap<SystemId, BTreeSet<SystemId>>,
    annotations: BTreeMap<AnnotationId, Annotation>,
}

impl Scenario {
    /// Creates an empty scenario with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores default settings and removes every entity.
    pub fn reset(&mut self) {
        self.settings = Settings::default();
        self.systems.clear();
        self.adjacency.clear();
        self.lanes.clear();
        self.annotations.clear();
    }

    /// Scenario settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Mutable scenario settings.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    // ------------------------------------------------------------------
    // Systems
    // ------------------------------------------------------------------

    /// Adds a system. Returns `false` if the id is already taken.
    pub fn add_system(&mut self, system: System) -> bool {
        if self.systems.contains_key(&system.id) {
            debug!(id = %system.id, "System already present, ignoring");
            return false;
        }

        let id = system.id;
        self.systems.insert(id, system);
        self.adjacency.insert(id, BTreeSet::new());
        self.lanes.insert(id, BTreeSet::new());
        true
    }

    /// Removes a system and every hyperlane touching it.
    pub fn remove_system(&mut self, id: SystemId) -> Option<System> {
        let system = self.systems.remove(&id)?;

        let neighbors = self.adjacency.remove(&id).unwrap_or_default();
        for neighbor in &neighbors {
            if let Some(adjacent) = self.adjacency.get_mut(neighbor) {
                adjacent.remove(&id);
            }
            if let Some(lane) = Lane::between(id, *neighbor) {
                if let Some(destinations) = self.lanes.get_mut(&lane.from) {
                    destinations.remove(&lane.to);
                }
            }
        }
        self.lanes.remove(&id);

        debug!(id = %id, severed = neighbors.len(), "System removed");
        Some(system)
    }

    /// Looks up a system.
    pub fn get_system(&self, id: SystemId) -> Option<&System> {
        self.systems.get(&id)
    }

    /// Whether a system with this id exists.
    pub fn contains_system(&self, id: SystemId) -> bool {
        self.systems.contains_key(&id)
    }

    /// Moves a system. Returns `false` if the system does not exist.
    pub fn relocate_system(&mut self, id: SystemId, location: Point) -> bool {
        match self.systems.get_mut(&id) {
            Some(system) => {
                system.relocate(location);
                true
            }
            None => false,
        }
    }

    /// Number of systems.
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// System ids in ascending order.
    pub fn system_ids(&self) -> impl Iterator<Item = SystemId> + '_ {
        self.systems.keys().copied()
    }

    /// Index entries for every system.
    pub fn system_datapoints(&self) -> Vec<Datapoint<SystemId>> {
        self.systems.values().map(System::datapoint).collect()
    }

    // ------------------------------------------------------------------
    // Hyperlanes
    // ------------------------------------------------------------------

    /// Links two systems.
    ///
    /// Self pairs and pairs involving an unknown system are ignored.
    /// Returns `true` if a new lane was created.
    pub fn add_lane(&mut self, a: SystemId, b: SystemId) -> bool {
        let Some(lane) = Lane::between(a, b) else {
            return false;
        };
        if !self.contains_system(a) || !self.contains_system(b) {
            warn!(from = %lane.from, to = %lane.to, "Ignoring hyperlane to unknown system");
            return false;
        }

        let created = self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
        self.lanes.entry(lane.from).or_default().insert(lane.to);
        created
    }

    /// Unlinks two systems. Returns `true` if a lane was removed.
    pub fn remove_lane(&mut self, a: SystemId, b: SystemId) -> bool {
        let Some(lane) = Lane::between(a, b) else {
            return false;
        };

        let removed = self
            .adjacency
            .get_mut(&a)
            .map_or(false, |adjacent| adjacent.remove(&b));
        if let Some(adjacent) = self.adjacency.get_mut(&b) {
            adjacent.remove(&a);
        }
        if let Some(destinations) = self.lanes.get_mut(&lane.from) {
            destinations.remove(&lane.to);
        }
        removed
    }

    /// Whether two systems are directly linked.
    pub fn linked(&self, a: SystemId, b: SystemId) -> bool {
        self.adjacency
            .get(&a)
            .map_or(false, |adjacent| adjacent.contains(&b))
    }

    /// Systems directly linked to `id`, in ascending order.
    pub fn neighbors(&self, id: SystemId) -> impl Iterator<Item = SystemId> + '_ {
        self.adjacency.get(&id).into_iter().flatten().copied()
    }

    /// Number of hyperlanes.
    pub fn lane_count(&self) -> usize {
        self.lanes.values().map(BTreeSet::len).sum()
    }

    // ------------------------------------------------------------------
    // Nebulae
    // ------------------------------------------------------------------

    /// Adds a nebula. Returns `false` if its id is already taken.
    pub fn add_annotation(&mut self, annotation: Annotation) -> bool {
        if self.annotations.contains_key(annotation.id()) {
            return false;
        }
        self.annotations.insert(annotation.id().clone(), annotation);
        true
    }

    /// Removes a nebula by id.
    pub fn remove_annotation(&mut self, id: &AnnotationId) -> Option<Annotation> {
        self.annotations.remove(id)
    }

    /// Looks up a nebula.
    pub fn get_annotation(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.annotations.get(id)
    }

    /// Number of nebulae.
    pub fn annotation_count(&self) -> usize {
        self.annotations.len()
    }

    // ------------------------------------------------------------------
    // Export / import
    // ------------------------------------------------------------------

    /// Systems in ascending id order.
    pub fn export_systems(&self) -> Vec<&System> {
        self.systems.values().collect()
    }

    /// Canonical hyperlanes, ordered by `(from, to)`.
    pub fn export_lanes(&self) -> Vec<Lane> {
        self.lanes
            .iter()
            .flat_map(|(from, destinations)| {
                destinations.iter().map(move |to| Lane {
                    from: *from,
                    to: *to,
                })
            })
            .collect()
    }

    /// Nebulae in ascending id order.
    pub fn export_annotations(&self) -> Vec<&Annotation> {
        self.annotations.values().collect()
    }

    /// Renders the scenario as a `static_galaxy_scenario` script.
    pub fn serialize(&self) -> String {
        codec::serialize(self)
    }

    /// Replaces the whole scenario with already parsed records.
    pub fn import(&mut self, parsed: ParsedScenario) {
        self.reset();
        self.settings = parsed.settings;

        for system in parsed.systems {
            self.add_system(system);
        }
        for (a, b) in parsed.lanes {
            self.add_lane(a, b);
        }
        for annotation in parsed.annotations {
            self.add_annotation(annotation);
        }

        info!(
            systems = self.system_count(),
            lanes = self.lane_count(),
            nebulae = self.annotation_count(),
            "📥 Scenario imported"
        );
    }

    /// Parses a script and replaces the scenario with its contents.
    ///
    /// On error the scenario is left exactly as it was.
    pub fn load_str(&mut self, text: &str) -> Result<(), FormatError> {
        let parsed = codec::parse_str(text)?;
        self.import(parsed);
        Ok(())
    }
}
