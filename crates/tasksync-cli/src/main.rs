//! tasksync CLI
//!
//! Command-line interface for tasksync - a to-do list kept in a realtime
//! database.

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tasksync_core::Config;

mod commands;
mod output;

use commands::Reported;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "tasksync")]
#[command(about = "tasksync - a to-do list synced through a realtime database")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log more (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use this config file instead of the default
    #[arg(long = "config", global = true, value_name = "PATH")]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all tasks
    #[command(alias = "ls")]
    List,
    /// Add a new task
    Add {
        /// Task title
        title: String,
        /// Due date (dd/mm/yyyy, yyyy-mm-dd, today, tomorrow)
        #[arg(short = 'D', long)]
        deadline: String,
        /// Longer description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Edit a task
    Edit {
        /// Task ID (full key, prefix or trailing characters)
        id: String,
        /// New title
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New due date
        #[arg(short = 'D', long)]
        deadline: Option<String>,
    },
    /// Delete a task
    #[command(alias = "rm")]
    Delete {
        /// Task ID (full key, prefix or trailing characters)
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Mark a task as done
    Done {
        /// Task ID (full key, prefix or trailing characters)
        id: String,
    },
    /// Mark a task as not done
    Undone {
        /// Task ID (full key, prefix or trailing characters)
        id: String,
    },
    /// Show the list and keep it updated as it changes
    Watch,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (database_url, auth_token, tasks_path, log_file)
        key: String,
        /// Configuration value ("none" clears optional keys)
        value: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        // Already shown by the task list
        Err(e) if e.is::<Reported>() => {
            debug!("{:#}", e);
            if let Some(hint) = e.downcast_ref::<Reported>().and_then(Reported::hint) {
                eprintln!("  {}", hint);
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config_file.as_ref();

    // Config commands don't need the database
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::List => commands::task::list(&config, &output).await,
        Commands::Add {
            title,
            deadline,
            description,
        } => commands::task::add(&config, title, description, deadline, &output).await,
        Commands::Edit {
            id,
            title,
            description,
            deadline,
        } => commands::task::edit(&config, id, title, description, deadline, &output).await,
        Commands::Delete { id, yes } => commands::task::delete(&config, id, yes, &output).await,
        Commands::Done { id } => commands::task::set_completed(&config, id, true, &output).await,
        Commands::Undone { id } => {
            commands::task::set_completed(&config, id, false, &output).await
        }
        Commands::Watch => commands::watch::watch(&config, &output).await,
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize logging
///
/// The level comes from `--verbose`, else `RUST_LOG`, else warnings only.
/// Logs go to `config.log_file` when set, stderr otherwise.
fn init_logging(config: &Config, verbose: u8) {
    let env_filter = match verbose {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("tasksync_core=warn,tasksync_cli=warn")),
        1 => EnvFilter::new("tasksync_core=debug,tasksync_cli=debug"),
        _ => EnvFilter::new("tasksync_core=trace,tasksync_cli=trace"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    // Ignore error if already initialized
    match &config.log_file {
        Some(log_path) => match File::options().create(true).append(true).open(log_path) {
            Ok(file) => {
                let _ = builder.with_ansi(false).with_writer(file).try_init();
            }
            Err(e) => {
                eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
                let _ = builder.with_writer(std::io::stderr).try_init();
            }
        },
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
}
