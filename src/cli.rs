//! Command-line interface definition for loghub.
//!
//! This module defines the CLI structure using clap derive macros,
//! including all subcommands and their arguments.

use crate::config::LogLevel;
use crate::logconf::LoggingConfigRequest;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Default controller address for client commands.
pub const DEFAULT_TARGET: &str = "http://localhost:8080";

/// loghub - Log collection configuration controller
///
/// Routes per-project logging configurations to collector agents, records
/// them durably and re-sends them after a restart.
#[derive(Debug, Parser)]
#[command(name = "loghub")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "LOGHUB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Returns the log level requested by the verbose/quiet flags, or
    /// `None` to use the configured level.
    pub fn log_level(&self) -> Option<LogLevel> {
        if self.quiet {
            return Some(LogLevel::Error);
        }

        match self.verbose {
            0 => None,
            1 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the controller HTTP server
    Serve(ServeArgs),

    /// Send a logging configuration to a running controller
    Configure(ConfigureArgs),

    /// Start collection for a clustered project
    Start(StartArgs),

    /// List projects or show one project's assignment
    Projects(ProjectsArgs),

    /// Show controller status
    Status(StatusArgs),

    /// Configuration file operations
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Arguments for the `serve` subcommand.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Bind address (overrides server.bind)
    #[arg(long)]
    pub bind: Option<String>,

    /// Listen port (overrides server.port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Data directory (overrides controller.data_dir)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

/// Address of the controller a client command talks to.
#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Controller address (URL or host:port)
    #[arg(short, long, env = "LOGHUB_TARGET", default_value = DEFAULT_TARGET)]
    pub target: String,
}

impl TargetArgs {
    /// Returns the target as a base URL.
    pub fn url(&self) -> String {
        target_url(&self.target)
    }
}

/// Turns a controller address into a base URL, adding `http://` when no
/// scheme is given.
pub fn target_url(target: &str) -> String {
    if target.contains("://") {
        target.to_string()
    } else {
        format!("http://{}", target)
    }
}

/// Arguments for the `configure` subcommand.
#[derive(Debug, Args)]
pub struct ConfigureArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Project id
    #[arg(short, long, allow_negative_numbers = true)]
    pub project: i64,

    /// Collection mode (k8s or logtail)
    #[arg(long = "type", value_name = "TYPE")]
    pub mode: String,

    /// Regular expression of lines to drop
    #[arg(long)]
    pub exclude: Option<String>,

    /// Lines per shipped batch
    #[arg(long)]
    pub batch: Option<u32>,

    /// Read buffer size
    #[arg(long)]
    pub buffer: Option<u32>,

    /// Flush interval in seconds
    #[arg(long)]
    pub interval: Option<u32>,

    /// Kubernetes namespace (k8s)
    #[arg(long)]
    pub namespace: Option<String>,

    /// Workload names, comma separated (k8s)
    #[arg(long, value_delimiter = ',')]
    pub names: Vec<String>,

    /// Log directory
    #[arg(long)]
    pub dir: Option<String>,

    /// Kubernetes API endpoint (k8s)
    #[arg(long)]
    pub api: Option<String>,

    /// Kubernetes API token (k8s)
    #[arg(long)]
    pub token: Option<String>,
}

impl ConfigureArgs {
    /// Builds the request body sent to the controller.
    pub fn to_request(&self) -> LoggingConfigRequest {
        LoggingConfigRequest {
            project_id: Some(self.project),
            mode: Some(self.mode.clone()),
            exclude: self.exclude.clone(),
            batch: self.batch,
            buffer: self.buffer,
            interval: self.interval,
            namespace: self.namespace.clone(),
            names: (!self.names.is_empty()).then(|| self.names.clone()),
            dir: self.dir.clone(),
            api: self.api.clone(),
            token: self.token.clone(),
        }
    }
}

/// Arguments for the `start` subcommand.
#[derive(Debug, Args)]
pub struct StartArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Project id
    #[arg(short, long, allow_negative_numbers = true)]
    pub project: i64,
}

/// Arguments for the `projects` subcommand.
#[derive(Debug, Args)]
pub struct ProjectsArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Show only this project, with its full configuration
    #[arg(short, long, allow_negative_numbers = true)]
    pub project: Option<i64>,
}

/// Arguments for the `status` subcommand.
#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Remote controller address; shows the local configuration when absent
    #[arg(short, long)]
    pub target: Option<String>,
}

/// Configuration subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Validate the configuration file
    Validate,

    /// Show the current configuration
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_debug() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_command() {
        let cli = Cli::parse_from(["loghub", "serve"]);

        match cli.command {
            Commands::Serve(args) => {
                assert!(args.bind.is_none());
                assert!(args.port.is_none());
                assert!(args.data_dir.is_none());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_serve_with_args() {
        let cli = Cli::parse_from([
            "loghub",
            "serve",
            "--bind",
            "127.0.0.1",
            "--port",
            "9090",
            "--data-dir",
            "/tmp/loghub",
        ]);

        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.bind.as_deref(), Some("127.0.0.1"));
                assert_eq!(args.port, Some(9090));
                assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/loghub")));
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_configure_command() {
        let cli = Cli::parse_from([
            "loghub",
            "configure",
            "-t",
            "hub.local:8080",
            "-p",
            "3",
            "--type",
            "k8s",
            "--namespace",
            "prod",
            "--names",
            "api,worker",
            "--batch",
            "200",
        ]);

        match cli.command {
            Commands::Configure(args) => {
                assert_eq!(args.target.url(), "http://hub.local:8080");

                let request = args.to_request();
                assert_eq!(request.project_id, Some(3));
                assert_eq!(request.mode.as_deref(), Some("k8s"));
                assert_eq!(request.namespace.as_deref(), Some("prod"));
                assert_eq!(
                    request.names,
                    Some(vec!["api".to_string(), "worker".to_string()])
                );
                assert_eq!(request.batch, Some(200));
                assert!(request.buffer.is_none());
            }
            _ => panic!("Expected Configure command"),
        }
    }

    #[test]
    fn test_configure_without_names() {
        let cli = Cli::parse_from([
            "loghub",
            "configure",
            "-p",
            "7",
            "--type",
            "logtail",
            "--dir",
            "/var/log/app",
        ]);

        match cli.command {
            Commands::Configure(args) => {
                assert_eq!(args.target.url(), DEFAULT_TARGET);
                let request = args.to_request();
                assert!(request.names.is_none());
                assert_eq!(request.dir.as_deref(), Some("/var/log/app"));
            }
            _ => panic!("Expected Configure command"),
        }
    }

    #[test]
    fn test_target_url() {
        assert_eq!(target_url("hub:8080"), "http://hub:8080");
        assert_eq!(target_url("https://hub:8443"), "https://hub:8443");
    }

    #[test]
    fn test_start_command() {
        let cli = Cli::parse_from(["loghub", "start", "-p", "-4"]);

        match cli.command {
            Commands::Start(args) => assert_eq!(args.project, -4),
            _ => panic!("Expected Start command"),
        }
    }

    #[test]
    fn test_projects_command() {
        let cli = Cli::parse_from(["loghub", "projects"]);
        match cli.command {
            Commands::Projects(args) => assert!(args.project.is_none()),
            _ => panic!("Expected Projects command"),
        }

        let cli = Cli::parse_from(["loghub", "projects", "--project", "9"]);
        match cli.command {
            Commands::Projects(args) => assert_eq!(args.project, Some(9)),
            _ => panic!("Expected Projects command"),
        }
    }

    #[test]
    fn test_status_command() {
        let cli = Cli::parse_from(["loghub", "status", "--target", "https://hub:8443"]);

        match cli.command {
            Commands::Status(args) => {
                assert_eq!(args.target.as_deref(), Some("https://hub:8443"));
            }
            _ => panic!("Expected Status command"),
        }
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::parse_from(["loghub", "config", "validate"]);
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigCommands::Validate)
        ));

        let cli = Cli::parse_from(["loghub", "config", "show"]);
        assert!(matches!(cli.command, Commands::Config(ConfigCommands::Show)));
    }

    #[test]
    fn test_global_config_option() {
        let cli = Cli::parse_from(["loghub", "-c", "/custom/config.yaml", "serve"]);

        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.yaml")));
    }

    #[test]
    fn test_verbose_levels() {
        let cli = Cli::parse_from(["loghub", "serve"]);
        assert_eq!(cli.log_level(), None);

        let cli = Cli::parse_from(["loghub", "-v", "serve"]);
        assert_eq!(cli.log_level(), Some(LogLevel::Debug));

        let cli = Cli::parse_from(["loghub", "-vv", "serve"]);
        assert_eq!(cli.log_level(), Some(LogLevel::Trace));
    }

    #[test]
    fn test_quiet_mode() {
        let cli = Cli::parse_from(["loghub", "-q", "serve"]);
        assert_eq!(cli.log_level(), Some(LogLevel::Error));
    }
}
