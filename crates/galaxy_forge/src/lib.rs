//! # Galaxy Forge - Main Entry Point
//!
//! Command-line front end for editing `static_galaxy_scenario` scripts. This
//! entry point handles CLI parsing, configuration loading and running the
//! selected command.
//!
//! ## Quick Start
//!
//! ```bash
//! # Log what a scenario contains
//! galaxy_forge inspect my_galaxy.txt
//!
//! # Normalize a hand-written script
//! galaxy_forge export my_galaxy.txt clean.txt
//!
//! # Connect system 12 to everything within 80 units
//! galaxy_forge link my_galaxy.txt linked.txt --system 12 --radius 80
//!
//! # Keep a session between runs
//! galaxy_forge snapshot my_galaxy.txt session.json
//! galaxy_forge restore session.json my_galaxy.txt
//! ```
//!
//! ## Configuration
//!
//! Settings are read from a TOML file (default: `galaxy_forge.toml`). If the
//! file doesn't exist, a default configuration is created.

use tracing::error;

mod app;
mod cli;
mod config;
mod logging;

use app::Application;
use cli::CliArgs;
use config::AppConfig;

/// Main entry point for Galaxy Forge.
///
/// # Exit Codes
///
/// * **0**: Command completed
/// * **1**: Error during configuration or while running the command
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Logging settings come from the file before CLI overrides are merged.
    let mut logging = AppConfig::load_from_file(&args.config_path)
        .await
        .unwrap_or_default()
        .logging;
    if let Some(level) = &args.log_level {
        logging.level = level.clone();
    }

    if let Err(e) = logging::setup_logging(&logging, args.json_logs) {
        eprintln!("❌ Failed to setup logging: {e}");
        std::process::exit(1);
    }

    match Application::new(args).await {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("❌ Command failed: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("❌ Failed to start application: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}

pub use cli::ForgeCommand;
pub use config::{EditorSettings, IndexSettings, LoggingSettings, ScenarioOverrides};

#[cfg(test)]
mod tests {
    use super::*;
    use galaxy_scenario::{Scenario, ScenarioSnapshot, SystemId};
    use std::path::{Path, PathBuf};
    use tempfile::{tempdir, TempDir};

    const SCRIPT: &str = "static_galaxy_scenario = {\r\n\
        \tname = \"Test Cluster\"\r\n\
        \tpriority = 1\r\n\
        \tsystem = { id = \"1\" name = \"Hub\" position = { x = 0 y = 0 } }\r\n\
        \tsystem = { id = \"2\" name = \"Near\" position = { x = -10 y = 0 } }\r\n\
        \tsystem = { id = \"3\" name = \"Mid\" position = { x = 0 y = 30 } }\r\n\
        \tsystem = { id = \"4\" name = \"Far\" position = { x = 400 y = 400 } }\r\n\
        \tadd_hyperlane = { from = \"1\" to = \"3\" }\r\n\
        \tnebula = { name = \"Haze\" position = { x = 20 y = 20 } radius = 15 }\r\n\
        }\r\n";

    async fn workspace() -> (TempDir, PathBuf, PathBuf) {
        let dir = tempdir().unwrap();
        let config = dir.path().join("galaxy_forge.toml");
        let input = dir.path().join("scenario.txt");
        tokio::fs::write(&input, SCRIPT).await.unwrap();
        (dir, config, input)
    }

    fn args(config: &Path, command: ForgeCommand) -> CliArgs {
        CliArgs {
            config_path: config.to_path_buf(),
            log_level: None,
            json_logs: false,
            command,
        }
    }

    async fn read_scenario(path: &Path) -> Scenario {
        let mut scenario = Scenario::new();
        scenario
            .load_str(&tokio::fs::read_to_string(path).await.unwrap())
            .unwrap();
        scenario
    }

    #[tokio::test]
    async fn test_application_creates_default_config() {
        let (dir, config, input) = workspace().await;
        let mut cli = args(&config, ForgeCommand::Inspect { input });
        cli.log_level = Some("debug".to_string());

        let app = Application::new(cli).await.unwrap();
        assert_eq!(app.config().logging.level, "debug");
        assert!(config.exists());

        app.run().await.unwrap();
        drop(dir);
    }

    #[tokio::test]
    async fn test_invalid_override_is_rejected() {
        let (_dir, config, input) = workspace().await;
        let mut cli = args(&config, ForgeCommand::Inspect { input });
        cli.log_level = Some("loud".to_string());

        assert!(Application::new(cli).await.is_err());
    }

    #[tokio::test]
    async fn test_export_normalizes_script() {
        let (dir, config, input) = workspace().await;
        let output = dir.path().join("out.txt");

        Application::new(args(&config, ForgeCommand::Export { input, output: output.clone() }))
            .await
            .unwrap()
            .run()
            .await
            .unwrap();

        let text = tokio::fs::read_to_string(&output).await.unwrap();
        assert!(text.starts_with("static_galaxy_scenario = {\r\n"));
        assert!(text.contains("\tname = \"Test Cluster\"\r\n"));

        let scenario = read_scenario(&output).await;
        assert_eq!(scenario.system_count(), 4);
        assert_eq!(scenario.lane_count(), 1);
        assert_eq!(scenario.annotation_count(), 1);
    }

    #[tokio::test]
    async fn test_link_and_unlink_nearby() {
        let (dir, config, input) = workspace().await;
        let linked = dir.path().join("linked.txt");
        let unlinked = dir.path().join("unlinked.txt");

        let link = ForgeCommand::Link {
            input,
            output: linked.clone(),
            system: 1,
            radius: None,
            unlink: false,
        };
        Application::new(args(&config, link)).await.unwrap().run().await.unwrap();

        let scenario = read_scenario(&linked).await;
        assert!(scenario.linked(SystemId(1), SystemId(2)));
        assert!(scenario.linked(SystemId(1), SystemId(3)));
        assert!(!scenario.linked(SystemId(1), SystemId(4)));

        let unlink = ForgeCommand::Link {
            input: linked,
            output: unlinked.clone(),
            system: 1,
            radius: Some(15.0),
            unlink: true,
        };
        Application::new(args(&config, unlink)).await.unwrap().run().await.unwrap();

        let scenario = read_scenario(&unlinked).await;
        assert!(!scenario.linked(SystemId(1), SystemId(2)));
        assert!(scenario.linked(SystemId(1), SystemId(3)));
    }

    #[tokio::test]
    async fn test_link_unknown_system_fails() {
        let (dir, config, input) = workspace().await;
        let link = ForgeCommand::Link {
            input,
            output: dir.path().join("never.txt"),
            system: 99,
            radius: None,
            unlink: false,
        };

        let app = Application::new(args(&config, link)).await.unwrap();
        assert!(app.run().await.is_err());
        assert!(!dir.path().join("never.txt").exists());
    }

    #[tokio::test]
    async fn test_snapshot_then_restore() {
        let (dir, config, input) = workspace().await;
        let snapshot = dir.path().join("session.json");
        let restored = dir.path().join("restored.txt");

        Application::new(args(&config, ForgeCommand::Snapshot { input, output: snapshot.clone() }))
            .await
            .unwrap()
            .run()
            .await
            .unwrap();
        let saved = ScenarioSnapshot::load(&snapshot).await.unwrap();
        assert_eq!(saved.systems.len(), 4);

        Application::new(args(
            &config,
            ForgeCommand::Restore {
                snapshot,
                output: restored.clone(),
            },
        ))
        .await
        .unwrap()
        .run()
        .await
        .unwrap();

        let scenario = read_scenario(&restored).await;
        assert_eq!(scenario.settings().name, "Test Cluster");
        assert_eq!(scenario.system_count(), 4);
        assert!(scenario.linked(SystemId(3), SystemId(1)));
    }

    #[tokio::test]
    async fn test_scenario_overrides_are_applied() {
        let (dir, config, input) = workspace().await;
        tokio::fs::write(
            &config,
            "[scenario.overrides]\npriority = \"7\"\nrandom_hyperlanes = \"yes\"\n",
        )
        .await
        .unwrap();
        let output = dir.path().join("out.txt");

        Application::new(args(&config, ForgeCommand::Export { input, output: output.clone() }))
            .await
            .unwrap()
            .run()
            .await
            .unwrap();

        let scenario = read_scenario(&output).await;
        assert_eq!(scenario.settings().priority, 7);
        assert!(scenario.settings().random_hyperlanes);
    }

    #[tokio::test]
    async fn test_missing_input_fails() {
        let (dir, config, _input) = workspace().await;
        let cli = args(
            &config,
            ForgeCommand::Inspect {
                input: dir.path().join("absent.txt"),
            },
        );
        let app = Application::new(cli).await.unwrap();
        assert!(app.run().await.is_err());
    }
}
