//! Command-line interface handling for Galaxy Forge.
//!
//! Global options override configuration file settings; the subcommand picks
//! the scenario operation to run.

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::path::PathBuf;

/// Scenario operation selected on the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum ForgeCommand {
    /// Load a script and report what it contains
    Inspect { input: PathBuf },
    /// Load a script and write it back in normalized form
    Export { input: PathBuf, output: PathBuf },
    /// Link (or unlink) one system to every system within a radius
    Link {
        input: PathBuf,
        output: PathBuf,
        system: u32,
        radius: Option<f64>,
        unlink: bool,
    },
    /// Save a script as a JSON session snapshot
    Snapshot { input: PathBuf, output: PathBuf },
    /// Turn a JSON session snapshot back into a script
    Restore { snapshot: PathBuf, output: PathBuf },
}

/// Command line arguments parsed from user input.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    /// Operation to run
    pub command: ForgeCommand,
}

fn path_arg(name: &'static str, value_name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .value_name(value_name)
        .help(help)
        .required(true)
        .value_parser(value_parser!(PathBuf))
}

fn command() -> Command {
    Command::new("Galaxy Forge")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Static galaxy scenario editor toolkit")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .global(true)
                .default_value("galaxy_forge.toml"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
                .global(true),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .help("Output logs in JSON format")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("inspect")
                .about("Load a scenario script and log its contents")
                .arg(path_arg("input", "FILE", "Scenario script to read")),
        )
        .subcommand(
            Command::new("export")
                .about("Load a scenario script and write it back normalized")
                .arg(path_arg("input", "FILE", "Scenario script to read"))
                .arg(path_arg("output", "OUT", "Destination script")),
        )
        .subcommand(
            Command::new("link")
                .about("Link a system to every unlocked system within a radius")
                .arg(path_arg("input", "FILE", "Scenario script to read"))
                .arg(path_arg("output", "OUT", "Destination script"))
                .arg(
                    Arg::new("system")
                        .short('s')
                        .long("system")
                        .value_name("ID")
                        .help("Id of the system to link from")
                        .required(true)
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    Arg::new("radius")
                        .short('r')
                        .long("radius")
                        .value_name("RADIUS")
                        .help("Search radius (defaults to editor.link_radius)")
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("unlink")
                        .long("unlink")
                        .help("Remove lanes instead of creating them")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("snapshot")
                .about("Save a scenario script as a JSON snapshot")
                .arg(path_arg("input", "FILE", "Scenario script to read"))
                .arg(path_arg("output", "OUT", "Destination snapshot")),
        )
        .subcommand(
            Command::new("restore")
                .about("Write a scenario script from a JSON snapshot")
                .arg(path_arg("snapshot", "SNAPSHOT", "Snapshot to read"))
                .arg(path_arg("output", "OUT", "Destination script")),
        )
}

fn path(matches: &ArgMatches, name: &str) -> PathBuf {
    matches
        .get_one::<PathBuf>(name)
        .cloned()
        .expect("required path arguments are enforced by clap")
}

impl ForgeCommand {
    fn from_matches(name: &str, matches: &ArgMatches) -> Option<Self> {
        let command = match name {
            "inspect" => Self::Inspect {
                input: path(matches, "input"),
            },
            "export" => Self::Export {
                input: path(matches, "input"),
                output: path(matches, "output"),
            },
            "link" => Self::Link {
                input: path(matches, "input"),
                output: path(matches, "output"),
                system: *matches.get_one::<u32>("system")?,
                radius: matches.get_one::<f64>("radius").copied(),
                unlink: matches.get_flag("unlink"),
            },
            "snapshot" => Self::Snapshot {
                input: path(matches, "input"),
                output: path(matches, "output"),
            },
            "restore" => Self::Restore {
                snapshot: path(matches, "snapshot"),
                output: path(matches, "output"),
            },
            _ => return None,
        };
        Some(command)
    }
}

impl CliArgs {
    /// Parses the process arguments, exiting with usage on error.
    pub fn parse() -> Self {
        match Self::try_parse_from(std::env::args_os()) {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    /// Parses an explicit argument list.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut cli = command();
        let matches = cli.try_get_matches_from_mut(args)?;

        let command = matches
            .subcommand()
            .and_then(|(name, sub)| ForgeCommand::from_matches(name, sub))
            .ok_or_else(|| cli.error(clap::error::ErrorKind::MissingSubcommand, "a subcommand is required"))?;

        Ok(Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("galaxy_forge.toml")),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            command,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_with_defaults() {
        let args = CliArgs::try_parse_from(["galaxy_forge", "inspect", "map.txt"]).unwrap();
        assert_eq!(args.config_path, PathBuf::from("galaxy_forge.toml"));
        assert_eq!(args.log_level, None);
        assert!(!args.json_logs);
        assert_eq!(
            args.command,
            ForgeCommand::Inspect {
                input: PathBuf::from("map.txt")
            }
        );
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let args = CliArgs::try_parse_from([
            "galaxy_forge",
            "export",
            "in.txt",
            "out.txt",
            "--config",
            "custom.toml",
            "-l",
            "debug",
            "--json-logs",
        ])
        .unwrap();

        assert_eq!(args.config_path, PathBuf::from("custom.toml"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.json_logs);
    }

    #[test]
    fn test_link_arguments() {
        let args = CliArgs::try_parse_from([
            "galaxy_forge",
            "link",
            "in.txt",
            "out.txt",
            "--system",
            "12",
            "--radius",
            "75.5",
            "--unlink",
        ])
        .unwrap();

        assert_eq!(
            args.command,
            ForgeCommand::Link {
                input: PathBuf::from("in.txt"),
                output: PathBuf::from("out.txt"),
                system: 12,
                radius: Some(75.5),
                unlink: true,
            }
        );
    }

    #[test]
    fn test_link_requires_system() {
        assert!(CliArgs::try_parse_from(["galaxy_forge", "link", "in.txt", "out.txt"]).is_err());
    }

    #[test]
    fn test_missing_subcommand_is_rejected() {
        assert!(CliArgs::try_parse_from(["galaxy_forge", "-c", "x.toml"]).is_err());
    }
}
