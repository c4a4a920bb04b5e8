//! Scenario-wide settings record.
//!
//! The key set is closed. Typed access goes through the struct fields; string
//! keyed access (used by forms and the command line) goes through
//! [`Settings::get`] and [`Settings::set`], which reject unknown keys loudly.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::error;

/// Flat configuration bag attached to a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Scenario display name
    pub name: String,
    /// Sort priority in the scenario list
    pub priority: i64,
    /// Whether this scenario is the default pick
    pub is_default: bool,
    /// Minimum selectable empire count
    pub num_empires_min: i64,
    /// Maximum selectable empire count
    pub num_empires_max: i64,
    /// Default empire count
    pub num_empire_default: i64,
    /// Default fallen empire count
    pub fallen_empire_default: i64,
    /// Maximum fallen empire count
    pub fallen_empire_max: i64,
    /// Default advanced empire count
    pub advanced_empire_default: i64,
    /// Odds of colonizable planets
    pub colonizable_planet_odds: f64,
    /// Whether extra random hyperlanes are generated
    pub random_hyperlanes: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            name: "defaultName".to_string(),
            priority: 0,
            is_default: false,
            num_empires_min: 1,
            num_empires_max: 10,
            num_empire_default: 1,
            fallen_empire_default: 0,
            fallen_empire_max: 0,
            advanced_empire_default: 0,
            colonizable_planet_odds: 0.0,
            random_hyperlanes: false,
        }
    }
}

/// Name of a single setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Name,
    Priority,
    IsDefault,
    NumEmpiresMin,
    NumEmpiresMax,
    NumEmpireDefault,
    FallenEmpireDefault,
    FallenEmpireMax,
    AdvancedEmpireDefault,
    ColonizablePlanetOdds,
    RandomHyperlanes,
}

impl SettingKey {
    /// Every key, in serialization order.
    pub const ALL: [SettingKey; 11] = [
        SettingKey::Name,
        SettingKey::Priority,
        SettingKey::IsDefault,
        SettingKey::NumEmpiresMin,
        SettingKey::NumEmpiresMax,
        SettingKey::NumEmpireDefault,
        SettingKey::FallenEmpireDefault,
        SettingKey::FallenEmpireMax,
        SettingKey::AdvancedEmpireDefault,
        SettingKey::ColonizablePlanetOdds,
        SettingKey::RandomHyperlanes,
    ];

    /// Canonical snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::Name => "name",
            SettingKey::Priority => "priority",
            SettingKey::IsDefault => "is_default",
            SettingKey::NumEmpiresMin => "num_empires_min",
            SettingKey::NumEmpiresMax => "num_empires_max",
            SettingKey::NumEmpireDefault => "num_empire_default",
            SettingKey::FallenEmpireDefault => "fallen_empire_default",
            SettingKey::FallenEmpireMax => "fallen_empire_max",
            SettingKey::AdvancedEmpireDefault => "advanced_empire_default",
            SettingKey::ColonizablePlanetOdds => "colonizable_planet_odds",
            SettingKey::RandomHyperlanes => "random_hyperlanes",
        }
    }

    fn legacy_name(&self) -> &'static str {
        match self {
            SettingKey::Name => "name",
            SettingKey::Priority => "priority",
            SettingKey::IsDefault => "isDefault",
            SettingKey::NumEmpiresMin => "numEmpiresMin",
            SettingKey::NumEmpiresMax => "numEmpiresMax",
            SettingKey::NumEmpireDefault => "numEmpireDefault",
            SettingKey::FallenEmpireDefault => "fallenEmpireDefault",
            SettingKey::FallenEmpireMax => "fallenEmpireMax",
            SettingKey::AdvancedEmpireDefault => "advancedEmpireDefault",
            SettingKey::ColonizablePlanetOdds => "colonizablePlanetOdds",
            SettingKey::RandomHyperlanes => "randomHyperlanes",
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            SettingKey::Name => "text",
            SettingKey::IsDefault | SettingKey::RandomHyperlanes => "flag",
            SettingKey::ColonizablePlanetOdds => "number",
            _ => "integer",
        }
    }
}

impl FromStr for SettingKey {
    type Err = ValidationError;

    /// Accepts both the snake_case and the legacy camelCase spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s || key.legacy_name() == s)
            .ok_or_else(|| ValidationError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar stored under a setting key.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Flag(bool),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Text(text) => f.write_str(text),
            SettingValue::Integer(value) => write!(f, "{value}"),
            SettingValue::Number(value) => write!(f, "{value}"),
            SettingValue::Flag(value) => f.write_str(if *value { "yes" } else { "no" }),
        }
    }
}

impl Settings {
    /// Reads a setting by key.
    ///
    /// Unknown keys are logged and yield `None`.
    pub fn get(&self, key: &str) -> Option<SettingValue> {
        match key.parse::<SettingKey>() {
            Ok(key) => Some(self.value(key)),
            Err(e) => {
                error!("❌ {e}");
                None
            }
        }
    }

    /// Writes a setting by key.
    ///
    /// Unknown keys and values of the wrong kind are logged and leave the
    /// record untouched. Integers are accepted for number settings.
    pub fn set(&mut self, key: &str, value: SettingValue) -> Result<(), ValidationError> {
        let result = key
            .parse::<SettingKey>()
            .and_then(|key| self.assign(key, value));
        if let Err(e) = &result {
            error!("❌ {e}");
        }
        result
    }

    /// Parses `raw` according to the kind of `key` and writes it.
    ///
    /// Flags accept `yes`/`no`/`true`/`false`.
    pub fn set_from_str(&mut self, key: &str, raw: &str) -> Result<(), ValidationError> {
        let parsed = key.parse::<SettingKey>().and_then(|setting| {
            let wrong_kind = || ValidationError::WrongKind {
                key: setting.as_str(),
                expected: setting.kind(),
            };
            let raw = raw.trim();
            match setting.kind() {
                "text" => Ok(SettingValue::Text(raw.to_string())),
                "flag" => match raw {
                    "yes" | "true" => Ok(SettingValue::Flag(true)),
                    "no" | "false" => Ok(SettingValue::Flag(false)),
                    _ => Err(wrong_kind()),
                },
                "number" => raw.parse().map(SettingValue::Number).map_err(|_| wrong_kind()),
                _ => raw.parse().map(SettingValue::Integer).map_err(|_| wrong_kind()),
            }
        });

        match parsed {
            Ok(value) => self.set(key, value),
            Err(e) => {
                error!("❌ {e}");
                Err(e)
            }
        }
    }

    /// Typed read of a known key.
    pub fn value(&self, key: SettingKey) -> SettingValue {
        match key {
            SettingKey::Name => SettingValue::Text(self.name.clone()),
            SettingKey::Priority => SettingValue::Integer(self.priority),
            SettingKey::IsDefault => SettingValue::Flag(self.is_default),
            SettingKey::NumEmpiresMin => SettingValue::Integer(self.num_empires_min),
            SettingKey::NumEmpiresMax => SettingValue::Integer(self.num_empires_max),
            SettingKey::NumEmpireDefault => SettingValue::Integer(self.num_empire_default),
            SettingKey::FallenEmpireDefault => SettingValue::Integer(self.fallen_empire_default),
            SettingKey::FallenEmpireMax => SettingValue::Integer(self.fallen_empire_max),
            SettingKey::AdvancedEmpireDefault => {
                SettingValue::Integer(self.advanced_empire_default)
            }
            SettingKey::ColonizablePlanetOdds => SettingValue::Number(self.colonizable_planet_odds),
            SettingKey::RandomHyperlanes => SettingValue::Flag(self.random_hyperlanes),
        }
    }

    fn assign(&mut self, key: SettingKey, value: SettingValue) -> Result<(), ValidationError> {
        let wrong_kind = ValidationError::WrongKind {
            key: key.as_str(),
            expected: key.kind(),
        };

        match (key, value) {
            (SettingKey::Name, SettingValue::Text(text)) => self.name = text,
            (SettingKey::IsDefault, SettingValue::Flag(flag)) => self.is_default = flag,
            (SettingKey::RandomHyperlanes, SettingValue::Flag(flag)) => {
                self.random_hyperlanes = flag
            }
            (SettingKey::ColonizablePlanetOdds, SettingValue::Number(odds)) => {
                self.colonizable_planet_odds = odds
            }
            (SettingKey::ColonizablePlanetOdds, SettingValue::Integer(odds)) => {
                self.colonizable_planet_odds = odds as f64
            }
            (key, SettingValue::Integer(value)) => match self.integer_slot(key) {
                Some(slot) => *slot = value,
                None => return Err(wrong_kind),
            },
            _ => return Err(wrong_kind),
        }
        Ok(())
    }

    fn integer_slot(&mut self, key: SettingKey) -> Option<&mut i64> {
        match key {
            SettingKey::Priority => Some(&mut self.priority),
            SettingKey::NumEmpiresMin => Some(&mut self.num_empires_min),
            SettingKey::NumEmpiresMax => Some(&mut self.num_empires_max),
            SettingKey::NumEmpireDefault => Some(&mut self.num_empire_default),
            SettingKey::FallenEmpireDefault => Some(&mut self.fallen_empire_default),
            SettingKey::FallenEmpireMax => Some(&mut self.fallen_empire_max),
            SettingKey::AdvancedEmpireDefault => Some(&mut self.advanced_empire_default),
            _ => None,
        }
    }
}
