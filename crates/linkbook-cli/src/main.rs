//! linkbook CLI
//!
//! Command-line and terminal interface for linkbook - a local list of
//! named links.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use linkbook_core::{Config, LinkListController};

mod commands;
mod display;
mod output;
mod prompt;
mod tui;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "linkbook")]
#[command(about = "linkbook - keep a list of named links")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface (default)
    Tui,
    /// Add a link
    #[command(alias = "create")]
    Add {
        /// Display name (may be empty)
        name: String,
        /// URL (stored as given, not validated)
        url: String,
    },
    /// List links sorted by name
    #[command(alias = "ls")]
    List,
    /// Delete a link
    #[command(alias = "rm")]
    Delete {
        /// Link ID (full UUID or prefix)
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
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
        /// Configuration key (data_dir, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands don't need the link database
    if let Some(Commands::Config { command }) = &cli.command {
        return match command {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, &output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key.clone(), value.clone(), config_path, &output)
            }
        };
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    let command = cli.command.unwrap_or(Commands::Tui);
    if matches!(command, Commands::Tui) {
        return tui::run(&config);
    }

    init_cli_logging();
    let mut links = LinkListController::open(&config)?;

    match command {
        Commands::Add { name, url } => commands::link::add(&mut links, name, url, &output),
        Commands::List => commands::link::list(&links, &output),
        Commands::Delete { id, yes } => commands::link::delete(&mut links, id, yes, &output),
        Commands::Tui | Commands::Config { .. } => unreachable!(), // Handled above
    }
}

/// Initialize stderr logging for one-shot commands
///
/// Only initializes if LINKBOOK_LOG environment variable is set.
fn init_cli_logging() {
    let Ok(log_level) = std::env::var("LINKBOOK_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!(
        "linkbook_core={},linkbook_cli={}",
        log_level, log_level
    ));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
