//! Configuration management for Galaxy Forge.
//!
//! Settings come from a TOML file (created with defaults when missing) and are
//! then overridden by command-line flags.

use galaxy_scenario::{Point, Rectangle, SettingKey, DEFAULT_CAPACITY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

fn default_top_left_x() -> f64 {
    -1000.0
}
fn default_top_left_y() -> f64 {
    1000.0
}
fn default_extent() -> f64 {
    2000.0
}
fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}
fn default_link_radius() -> f64 {
    50.0
}
fn default_pick_tolerance() -> f64 {
    2.5
}
fn default_log_level() -> String {
    "info".to_string()
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Spatial index layout
    #[serde(default)]
    pub index: IndexSettings,
    /// Editing defaults
    #[serde(default)]
    pub editor: EditorSettings,
    /// Scenario settings applied to every loaded script
    #[serde(default)]
    pub scenario: ScenarioOverrides,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Area covered by the quadtree and its node capacity.
///
/// The rectangle is anchored at its top-left corner (smallest x, largest y)
/// in editor coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSettings {
    #[serde(default = "default_top_left_x")]
    pub top_left_x: f64,
    #[serde(default = "default_top_left_y")]
    pub top_left_y: f64,
    #[serde(default = "default_extent")]
    pub width: f64,
    #[serde(default = "default_extent")]
    pub height: f64,
    /// Datapoints buffered per node before it subdivides
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

/// Editing defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Radius used by `link` when `--radius` is not given
    #[serde(default = "default_link_radius")]
    pub link_radius: f64,
    /// Half-size of the square searched when picking a system
    #[serde(default = "default_pick_tolerance")]
    pub pick_tolerance: f64,
}

/// Scenario settings forced onto every loaded script, keyed by setting name.
///
/// ```toml
/// [scenario.overrides]
/// priority = "3"
/// random_hyperlanes = "yes"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioOverrides {
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
    /// Optional file path for log output (None means stdout only)
    #[serde(default)]
    pub file_path: Option<String>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            top_left_x: default_top_left_x(),
            top_left_y: default_top_left_y(),
            width: default_extent(),
            height: default_extent(),
            capacity: default_capacity(),
        }
    }
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            link_radius: default_link_radius(),
            pick_tolerance: default_pick_tolerance(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            file_path: None,
        }
    }
}

impl IndexSettings {
    /// Index rectangle in editor coordinates.
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(
            Point::new(self.top_left_x, self.top_left_y),
            self.width,
            self.height,
        )
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, writes the default configuration there and
    /// returns it.
    pub async fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Checks the configuration for values the editor cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.index.width > 0.0 && self.index.height > 0.0) {
            return Err(format!(
                "Index area must have a positive size, got {} x {}",
                self.index.width, self.index.height
            ));
        }
        if self.index.capacity == 0 {
            return Err("index.capacity must be greater than 0".to_string());
        }

        if !(self.editor.link_radius > 0.0) {
            return Err("editor.link_radius must be greater than 0".to_string());
        }
        if self.editor.pick_tolerance < 0.0 {
            return Err("editor.pick_tolerance cannot be negative".to_string());
        }

        for key in self.scenario.overrides.keys() {
            if let Err(e) = key.parse::<SettingKey>() {
                return Err(format!("Invalid scenario override: {e}"));
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert_eq!(config.index.top_left_x, -1000.0);
        assert_eq!(config.index.top_left_y, 1000.0);
        assert_eq!(config.index.width, 2000.0);
        assert_eq!(config.index.height, 2000.0);
        assert_eq!(config.index.capacity, 5);
        assert_eq!(config.editor.link_radius, 50.0);
        assert_eq!(config.editor.pick_tolerance, 2.5);
        assert!(config.scenario.overrides.is_empty());
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);
        assert!(config.logging.file_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_index_bounds_are_anchored_top_left() {
        let bounds = AppConfig::default().index.bounds();
        assert!(bounds.contains(Point::new(-1000.0, 1000.0)));
        assert!(bounds.contains(Point::new(1000.0, -1000.0)));
        assert!(!bounds.contains(Point::new(0.0, 1000.5)));
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [index]
            capacity = 12

            [scenario.overrides]
            random_hyperlanes = "yes"
            "#,
        )
        .unwrap();

        assert_eq!(config.index.capacity, 12);
        assert_eq!(config.index.width, 2000.0);
        assert_eq!(config.editor.link_radius, 50.0);
        assert_eq!(config.scenario.overrides["random_hyperlanes"], "yes");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.index.width = 0.0;
        assert!(config.validate().is_err());

        config.index.width = 10.0;
        config.index.capacity = 0;
        assert!(config.validate().is_err());

        config.index.capacity = 4;
        config.editor.link_radius = -1.0;
        assert!(config.validate().is_err());

        config.editor.link_radius = 10.0;
        config
            .scenario
            .overrides
            .insert("warp_speed".to_string(), "9".to_string());
        assert!(config.validate().is_err());

        config.scenario.overrides.clear();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "warn".to_string();
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_from_nonexistent_file_creates_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("galaxy_forge.toml");

        let config = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config.index.capacity, 5);
        assert!(path.exists());

        let reloaded = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(reloaded.editor.pick_tolerance, 2.5);
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        tokio::fs::write(&path, "[index\ncapacity = ").await.unwrap();

        assert!(AppConfig::load_from_file(&path).await.is_err());
    }
}
