//! Deskbot CLI
//!
//! Main entry point for the deskbot command-line tool.
//! Provides department-scoped company Q&A backed by an external generation
//! provider, with conversation history stored locally.

mod commands;

use clap::{Parser, Subcommand};
use commands::{ChatCommand, DepartmentsCommand, HistoryCommand, InitCommand};
use deskbot_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Deskbot CLI - department-scoped company Q&A assistant
#[derive(Parser, Debug)]
#[command(name = "deskbot")]
#[command(about = "Department-scoped company Q&A assistant", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "DESKBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the SQLite database
    #[arg(long, global = true, env = "DESKBOT_DB")]
    db: Option<PathBuf>,

    /// Generation provider (perplexity)
    #[arg(short, long, global = true, env = "DESKBOT_PROVIDER")]
    provider: Option<String>,

    /// Model identifier dispatched to the provider
    #[arg(short, long, global = true, env = "DESKBOT_MODEL")]
    model: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question within a department
    Chat(ChatCommand),

    /// List departments visible to a user
    Departments(DepartmentsCommand),

    /// Conversation history management
    History(HistoryCommand),

    /// Seed the database with a default admin user and sample departments
    Init(InitCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from environment and config file
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.config,
        cli.provider,
        cli.model,
        cli.db,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Deskbot CLI starting");
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);
    tracing::debug!("Database: {:?}", config.database);

    let command_name = match &cli.command {
        Commands::Chat(_) => "chat",
        Commands::Departments(_) => "departments",
        Commands::History(_) => "history",
        Commands::Init(_) => "init",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Departments(cmd) => cmd.execute(&config).await,
        Commands::History(cmd) => cmd.execute(&config).await,
        Commands::Init(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
