//! loghub - Log collection configuration controller
//!
//! Entry point for the loghub application.

use clap::Parser;
use loghub::cli::{
    target_url, Cli, Commands, ConfigCommands, ConfigureArgs, ProjectsArgs, ServeArgs, StartArgs,
    StatusArgs,
};
use loghub::config::{Config, LoggingConfig};
use loghub::error::exit_code;
use loghub::server::response::{ProjectOperationData, ProjectSummary};
use loghub::LoghubClient;
use std::future::Future;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging settings come from the config file when it loads; a broken
    // file is reported by the command that needs it.
    let loaded = Config::load(cli.config.as_deref());
    let logging = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_else(|_| LoggingConfig::default());

    if let Err(e) = logging.install(cli.log_level()) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(exit_code::GENERAL_ERROR as u8);
    }

    match run(&cli, loaded) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// Main application logic.
fn run(cli: &Cli, loaded: loghub::Result<Config>) -> loghub::Result<()> {
    match &cli.command {
        Commands::Serve(args) => cmd_serve(loaded?, args),
        Commands::Configure(args) => cmd_configure(args),
        Commands::Start(args) => cmd_start(args),
        Commands::Projects(args) => cmd_projects(args),
        Commands::Status(args) => cmd_status(loaded, args),
        Commands::Config(subcmd) => cmd_config(loaded, subcmd),
    }
}

/// Runs a future to completion on a fresh multi-threaded runtime.
fn block_on<F: Future>(future: F) -> loghub::Result<F::Output> {
    let runtime = tokio::runtime::Runtime::new()?;
    Ok(runtime.block_on(future))
}

/// Handle the `serve` command.
fn cmd_serve(mut config: Config, args: &ServeArgs) -> loghub::Result<()> {
    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(data_dir) = &args.data_dir {
        config.controller.data_dir = data_dir.clone();
    }
    config.validate()?;

    tracing::info!(
        controller = %config.controller_name(),
        listen = %config.server.listen_addr(),
        data_dir = %config.controller.data_dir.display(),
        agents = config.agents.len(),
        "Starting loghub controller"
    );

    block_on(loghub::serve(&config))?
}

/// Handle the `configure` command.
fn cmd_configure(args: &ConfigureArgs) -> loghub::Result<()> {
    let client = LoghubClient::new(args.target.url())?;
    let result = block_on(client.configure(&args.to_request()))??;
    print_operation(&result);
    Ok(())
}

/// Handle the `start` command.
fn cmd_start(args: &StartArgs) -> loghub::Result<()> {
    let client = LoghubClient::new(args.target.url())?;
    let result = block_on(client.start(args.project))??;
    print_operation(&result);
    Ok(())
}

/// Handle the `projects` command.
fn cmd_projects(args: &ProjectsArgs) -> loghub::Result<()> {
    let client = LoghubClient::new(args.target.url())?;

    match args.project {
        Some(project_id) => {
            let detail = block_on(client.get_project(project_id))??;
            print_summary(&detail.project);
            println!("Exclude: {}", detail.args.exclude);
            println!("Batch: {}", detail.args.batch);
            println!("Buffer: {}", detail.args.buffer);
            println!("Interval: {}s", detail.args.interval);
            let payload = serde_json::to_string_pretty(&detail.args.mode)?;
            println!("Payload: {}", payload);
        }
        None => {
            let list = block_on(client.list_projects())??;
            println!("{:<12} {:<8} {:<8} COLLECTOR", "PROJECT", "TYPE", "STARTED");
            for project in &list.projects {
                println!(
                    "{:<12} {:<8} {:<8} {}",
                    project.project_id,
                    project.mode,
                    project.started,
                    project.collector.as_deref().unwrap_or("-")
                );
            }
            println!("\nTotal: {}", list.total);
        }
    }

    Ok(())
}

/// Handle the `status` command.
fn cmd_status(loaded: loghub::Result<Config>, args: &StatusArgs) -> loghub::Result<()> {
    if let Some(target) = &args.target {
        tracing::info!(target = %target, "Checking controller status");

        let client = LoghubClient::new(target_url(target))?;
        let status = block_on(client.status())??;

        println!("Controller Status");
        println!("=================");
        println!("Name: {}", status.controller.name);
        println!("Server: {}:{}", status.server.bind, status.server.port);
        println!("Report Endpoint: {}", status.controller.report_endpoint);
        println!("Version: {}", status.version);
        println!("Uptime: {}s", status.uptime_seconds);
        println!("\nLogging:");
        println!("  Agents: {}", status.logging.agents);
        println!("  Projects: {}", status.logging.projects);
        println!("  Started: {}", status.logging.started);
        println!("\nStatistics:");
        println!("  Total Requests: {}", status.stats.requests_total);
        println!("  Successful: {}", status.stats.requests_success);
        println!("  Failed: {}", status.stats.requests_failed);
    } else {
        let config = loaded?;
        println!("Controller Configuration");
        println!("========================");
        println!("Name: {}", config.controller_name());
        println!("Server: {}:{}", config.server.bind, config.server.port);
        println!("Data Dir: {}", config.controller.data_dir.display());
        println!("Report Endpoint: {}", config.controller.report_endpoint);
        println!(
            "Timeouts: ack {}s, http {}s",
            config.timeout.ack_seconds, config.timeout.http_seconds
        );

        if !config.agents.is_empty() {
            println!("\nAgents:");
            for agent in &config.agents {
                if agent.tags.is_empty() {
                    println!("  - {} ({})", agent.id, agent.address);
                } else {
                    println!(
                        "  - {} ({}) [{}]",
                        agent.id,
                        agent.address,
                        agent.tags.join(", ")
                    );
                }
            }
        }
    }

    Ok(())
}

/// Handle the `config` subcommand.
fn cmd_config(loaded: loghub::Result<Config>, subcmd: &ConfigCommands) -> loghub::Result<()> {
    match subcmd {
        ConfigCommands::Validate => match loaded {
            Ok(config) => {
                println!("✓ Configuration is valid");
                tracing::debug!(?config, "Validated configuration");
                Ok(())
            }
            Err(e) => {
                println!("✗ Configuration is invalid: {}", e);
                Err(e)
            }
        },
        ConfigCommands::Show => {
            let yaml = serde_yaml::to_string(&loaded?).map_err(|e| {
                loghub::LoghubError::config_with_source("Failed to serialize configuration", e)
            })?;
            println!("{}", yaml);
            Ok(())
        }
    }
}

fn print_summary(project: &ProjectSummary) {
    println!("Project: {}", project.project_id);
    println!("Type: {}", project.mode);
    println!(
        "Collector: {}",
        project.collector.as_deref().unwrap_or("(all agents)")
    );
    println!("Started: {}", project.started);
}

fn print_operation(result: &ProjectOperationData) {
    println!("Request ID: {}", result.request_id);
    println!("Action: {}", result.action);
    print_summary(&result.project);
    println!("Duration: {}ms", result.duration_ms);
}
