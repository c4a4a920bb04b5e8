//! Record extraction passes over a [`SourceText`].
//!
//! Every record kind has its own pass. Settings take the first matching line,
//! systems, hyperlanes and nebulae collect every match in file order. A field
//! that does not match leaves its attribute unset; it never aborts a pass.

use super::source::SourceText;
use super::{mirror_axis, ParsedScenario};
use crate::scenario::{Annotation, PositionRange, SettingKey, Settings, SpawnWeight, System};
use crate::types::{Point, SystemId};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, warn};

const NUMBER: &str = r"-?[0-9]+(?:\.[0-9]+)?";
const INTEGER: &str = r"-?[0-9]+";
const UNSIGNED: &str = r"[0-9]+(?:\.[0-9]+)?";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("scenario grammar patterns are valid")
}

/// Single-value settings: key, script keyword, value pattern.
static SCALAR_SETTINGS: Lazy<Vec<(SettingKey, Regex)>> = Lazy::new(|| {
    [
        (SettingKey::Name, "name", r#""(?P<value>[^"]*)""#),
        (SettingKey::Priority, "priority", r"(?P<value>-?[0-9]+)"),
        (SettingKey::IsDefault, "default", r"(?P<value>yes|no)\b"),
        (SettingKey::NumEmpireDefault, "num_empire_default", r"(?P<value>-?[0-9]+)"),
        (SettingKey::FallenEmpireDefault, "fallen_empire_default", r"(?P<value>-?[0-9]+)"),
        (SettingKey::FallenEmpireMax, "fallen_empire_max", r"(?P<value>-?[0-9]+)"),
        (SettingKey::AdvancedEmpireDefault, "advanced_empire_default", r"(?P<value>-?[0-9]+)"),
        (SettingKey::ColonizablePlanetOdds, "colonizable_planet_odds", r"(?P<value>-?[0-9]*\.?[0-9]+)"),
        (SettingKey::RandomHyperlanes, "random_hyperlanes", r"(?P<value>yes|no)\b"),
    ]
    .into_iter()
    .map(|(key, keyword, value)| (key, compile(&format!(r"^\s*{keyword}\s*=\s*{value}"))))
    .collect()
});

static NUM_EMPIRES: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"^\s*num_empires\s*=\s*\{{\s*min\s*=\s*(?P<min>{INTEGER})\s*max\s*=\s*(?P<max>{INTEGER})"
    ))
});

static SYSTEM: Lazy<Regex> = Lazy::new(|| {
    compile(r#"\bsystem\s*=\s*\{\s*id\s*=\s*"(?P<id>[0-9]+)"\s*name\s*=\s*"(?P<name>[^"]*)""#)
});

static SYSTEM_X: Lazy<Regex> = Lazy::new(|| axis_pattern("x"));
static SYSTEM_Y: Lazy<Regex> = Lazy::new(|| axis_pattern("y"));

static SYSTEM_INITIALIZER: Lazy<Regex> = Lazy::new(|| {
    compile(r#"\binitializer\s*=\s*(?:"(?P<quoted>[A-Za-z0-9_]*)"|(?P<bare>[A-Za-z0-9_]+))"#)
});

static SYSTEM_SPAWN: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"\bspawn_weight\s*=\s*\{{\s*base\s*=\s*(?P<base>{INTEGER})\s*modifier\s*=\s*\{{\s*add\s*=\s*(?P<add>{INTEGER})\s*has_country_flag\s*=\s*(?P<flag>[A-Za-z0-9_]*)"
    ))
});

static HYPERLANE: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r#"\badd_hyperlane\s*=\s*\{{\s*from\s*=\s*"(?P<from>{INTEGER})"\s*to\s*=\s*"(?P<to>{INTEGER})""#
    ))
});

static NEBULA: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r#"\bnebula\s*=\s*\{{\s*name\s*=\s*"(?P<name>[^"]*)"\s*position\s*=\s*\{{\s*x\s*=\s*(?P<x>{NUMBER})\s*y\s*=\s*(?P<y>{NUMBER})\s*\}}\s*radius\s*=\s*(?P<radius>{UNSIGNED})"#
    ))
});

/// `x = 12`, `x = -3.5` or `x = { min = -10 max = 10 }`.
fn axis_pattern(axis: &str) -> Regex {
    compile(&format!(
        r"\b{axis}\s*=\s*(?:(?P<value>{NUMBER})|\{{\s*min\s*=\s*(?P<min>{INTEGER})\s*max\s*=\s*(?P<max>{INTEGER})\s*\}})"
    ))
}

/// Coordinate of one axis as read from a system line.
enum AxisValue {
    Fixed(f64),
    Range(PositionRange),
}

fn parse_axis(pattern: &Regex, text: &str) -> Option<AxisValue> {
    let caps = pattern.captures(text)?;
    if let Some(value) = caps.name("value") {
        return value.as_str().parse().ok().map(AxisValue::Fixed);
    }
    let min = caps.name("min")?.as_str().parse().ok()?;
    let max = caps.name("max")?.as_str().parse().ok()?;
    Some(AxisValue::Range(PositionRange { min, max }))
}

fn first_match<'a>(lines: &'a [String], pattern: &Regex) -> Option<Captures<'a>> {
    lines.iter().find_map(|line| pattern.captures(line))
}

impl SourceText {
    /// Runs every extraction pass.
    pub fn parse(&self) -> ParsedScenario {
        ParsedScenario {
            settings: self.parse_settings(),
            systems: self.parse_systems(),
            lanes: self.parse_lanes(),
            annotations: self.parse_annotations(),
        }
    }

    /// Settings found in the script, defaults for everything else.
    pub fn parse_settings(&self) -> Settings {
        let lines = self.lines();
        let mut settings = Settings::default();

        for (key, pattern) in SCALAR_SETTINGS.iter() {
            if let Some(caps) = first_match(lines, pattern) {
                if settings.set_from_str(key.as_str(), &caps["value"]).is_err() {
                    warn!(setting = %key, "Ignoring malformed setting");
                }
            }
        }

        if let Some(caps) = first_match(lines, &NUM_EMPIRES) {
            if let (Ok(min), Ok(max)) = (caps["min"].parse(), caps["max"].parse()) {
                settings.num_empires_min = min;
                settings.num_empires_max = max;
            }
        }

        settings
    }

    /// Every `system = { ... }` record, in file order.
    pub fn parse_systems(&self) -> Vec<System> {
        let systems: Vec<System> = self
            .lines()
            .iter()
            .filter_map(|line| parse_system_line(line))
            .collect();
        debug!(count = systems.len(), "Systems parsed");
        systems
    }

    /// Every `add_hyperlane = { ... }` record as an unordered id pair.
    pub fn parse_lanes(&self) -> Vec<(SystemId, SystemId)> {
        let mut lanes = Vec::new();
        for line in self.lines() {
            let Some(caps) = HYPERLANE.captures(line) else {
                continue;
            };
            match (caps["from"].parse::<SystemId>(), caps["to"].parse::<SystemId>()) {
                (Ok(from), Ok(to)) => lanes.push((from, to)),
                _ => warn!(
                    from = &caps["from"],
                    to = &caps["to"],
                    "Skipping hyperlane with invalid system id"
                ),
            }
        }
        debug!(count = lanes.len(), "Hyperlanes parsed");
        lanes
    }

    /// Every `nebula = { ... }` record, in file order.
    pub fn parse_annotations(&self) -> Vec<Annotation> {
        let mut nebulae = Vec::new();
        for line in self.lines() {
            let Some(caps) = NEBULA.captures(line) else {
                continue;
            };
            let x = caps["x"].parse::<f64>();
            let y = caps["y"].parse::<f64>();
            let radius = caps["radius"].parse::<f64>();
            if let (Ok(x), Ok(y), Ok(radius)) = (x, y, radius) {
                nebulae.push(Annotation::new(
                    &caps["name"],
                    Point::new(mirror_axis(x), y),
                    radius,
                ));
            }
        }
        debug!(count = nebulae.len(), "Nebulae parsed");
        nebulae
    }
}

fn parse_system_line(line: &str) -> Option<System> {
    let caps = SYSTEM.captures(line)?;
    let id = match caps["id"].parse::<SystemId>() {
        Ok(id) => id,
        Err(_) => {
            warn!(id = &caps["id"], "Skipping system with out-of-range id");
            return None;
        }
    };
    let mut system = System::new(id, &caps["name"], Point::default());

    // Field patterns only look past the name so that names cannot shadow them.
    let rest = &line[caps.get(0).map_or(0, |m| m.end())..];

    match parse_axis(&SYSTEM_X, rest) {
        Some(AxisValue::Fixed(x)) => system.location.x = mirror_axis(x),
        Some(AxisValue::Range(range)) => match range.floor_mirrored_midpoint() {
            Some(x) => {
                system.location.x = x as f64;
                system.x_range = Some(range);
            }
            None => warn!(id = %id, "System x range is out of bounds, using 0"),
        },
        None => warn!(id = %id, "System has no x position, using 0"),
    }

    match parse_axis(&SYSTEM_Y, rest) {
        Some(AxisValue::Fixed(y)) => system.location.y = y,
        Some(AxisValue::Range(range)) => match range.floor_midpoint() {
            Some(y) => {
                system.location.y = y as f64;
                system.y_range = Some(range);
            }
            None => warn!(id = %id, "System y range is out of bounds, using 0"),
        },
        None => warn!(id = %id, "System has no y position, using 0"),
    }

    if let Some(init) = SYSTEM_INITIALIZER.captures(rest) {
        system.initializer = init
            .name("quoted")
            .or_else(|| init.name("bare"))
            .map(|value| value.as_str().to_string());
    }

    if let Some(spawn) = SYSTEM_SPAWN.captures(rest) {
        if let (Ok(base), Ok(add)) = (spawn["base"].parse(), spawn["add"].parse()) {
            system.spawn_weight = Some(SpawnWeight {
                base,
                add,
                country_flag: spawn["flag"].to_string(),
            });
        }
    }

    Some(system)
}
