//! Main application logic.
//!
//! `Application` merges the configuration with command-line overrides and
//! executes one scenario command against an [`Editor`] session.

use crate::cli::{CliArgs, ForgeCommand};
use crate::config::AppConfig;
use crate::logging::display_banner;
use galaxy_scenario::{Editor, ScenarioSnapshot, SystemId};
use std::path::Path;
use tracing::{info, warn};

/// A configured command, ready to run.
pub struct Application {
    /// Loaded application configuration
    config: AppConfig,
    /// Command selected on the command line
    command: ForgeCommand,
}

impl Application {
    /// Loads configuration, applies CLI overrides and validates the result.
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }
        if args.json_logs {
            config.logging.json_format = true;
        }

        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {e}").into());
        }
        info!("✅ Configuration loaded and validated successfully");

        display_banner();

        Ok(Self {
            config,
            command: args.command,
        })
    }

    /// The merged configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Executes the command.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ForgeCommand::Inspect { input } => {
                let editor = self.open(input).await?;
                self.log_summary(&editor);
            }
            ForgeCommand::Export { input, output } => {
                let editor = self.open(input).await?;
                write_script(output, &editor).await?;
            }
            ForgeCommand::Link {
                input,
                output,
                system,
                radius,
                unlink,
            } => {
                let mut editor = self.open(input).await?;
                let id = SystemId(*system);
                if !editor.set_active(Some(id)) {
                    return Err(format!("System {id} does not exist in {}", input.display()).into());
                }

                let radius = radius.unwrap_or(self.config.editor.link_radius);
                let changed = if *unlink {
                    editor.unlink_nearby(radius)
                } else {
                    editor.link_nearby(radius)
                };
                info!(
                    "🔗 {} {changed} hyperlane(s) around system {id} within {radius}",
                    if *unlink { "Removed" } else { "Created" }
                );
                write_script(output, &editor).await?;
            }
            ForgeCommand::Snapshot { input, output } => {
                let editor = self.open(input).await?;
                editor.snapshot().save(output).await?;
            }
            ForgeCommand::Restore { snapshot, output } => {
                let snapshot = ScenarioSnapshot::load(snapshot).await?;
                let mut editor = self.new_editor();
                editor.restore(&snapshot);
                write_script(output, &editor).await?;
            }
        }

        Ok(())
    }

    fn new_editor(&self) -> Editor {
        Editor::new(self.config.index.bounds(), self.config.index.capacity)
    }

    /// Loads a script into a fresh session and applies configured overrides.
    async fn open(&self, path: &Path) -> Result<Editor, Box<dyn std::error::Error>> {
        let mut editor = self.new_editor();
        editor.load_file(path).await?;

        for (key, value) in &self.config.scenario.overrides {
            editor.settings_mut().set_from_str(key, value)?;
        }

        info!("📂 Loaded scenario from {}", path.display());
        Ok(editor)
    }

    fn log_summary(&self, editor: &Editor) {
        let scenario = editor.scenario();
        let settings = scenario.settings();
        let stats = editor.index().node_stats();

        info!("📋 Scenario Summary:");
        info!("  - Name: {} (priority {})", settings.name, settings.priority);
        info!(
            "  - Empires: {}..={} (default {})",
            settings.num_empires_min, settings.num_empires_max, settings.num_empire_default
        );
        info!("  - Systems: {}", scenario.system_count());
        info!("  - Hyperlanes: {}", scenario.lane_count());
        info!("  - Nebulae: {}", scenario.annotation_count());
        info!(
            "  - Index: {} indexed, depth {}, {} leaves",
            stats.total_objects, stats.max_depth, stats.leaf_nodes
        );

        let unindexed = scenario.system_count() - editor.index().len();
        if unindexed > 0 {
            warn!("⚠️ {unindexed} system(s) lie outside the configured index bounds");
        }

        let tolerance = self.config.editor.pick_tolerance;
        let crowded = scenario
            .export_systems()
            .into_iter()
            .filter(|system| editor.index().radial_query(system.location, tolerance).len() > 1)
            .count();
        if crowded > 0 {
            warn!("⚠️ {crowded} system(s) sit within {tolerance} of another system");
        }
    }
}

async fn write_script(path: &Path, editor: &Editor) -> Result<(), Box<dyn std::error::Error>> {
    tokio::fs::write(path, editor.export()).await?;
    info!("💾 Scenario written to {}", path.display());
    Ok(())
}
