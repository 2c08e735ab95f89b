//! SafeCircle CLI - Command-line interface for the SafeCircle personal
//! safety client.
//!
//! Manages the trust partner list, emergency message settings, and the
//! "Get Help" flow from the terminal. The platform collaborators (contact
//! picker, location provider, message composer) are stood in by terminal
//! implementations; see the `providers` module.

mod commands;
mod providers;

use clap::{Parser, Subcommand};
use console::style;
use tracing::info;

use sc_core::config::{AppConfig, ConfigHandle};
use sc_core::constants::{self, keys};
use sc_core::error::ScResult;
use sc_core::logging;
use sc_models::{Database, Storage};
use sc_services::event_bus::EventBus;

/// SafeCircle - emergency trust partner messaging.
#[derive(Parser)]
#[command(
    name = "safecircle",
    version,
    about = "SafeCircle personal safety CLI",
    long_about = "Manage your Trust Partners (emergency contacts) and send the\n\
                  \"Get Help\" emergency message to your primary partner, optionally\n\
                  including your current location."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage trust partners.
    Partners {
        #[command(subcommand)]
        action: commands::partners::PartnersAction,
    },
    /// View and modify emergency message settings.
    Message {
        #[command(subcommand)]
        action: commands::message::MessageAction,
    },
    /// Send the emergency message to the primary trust partner.
    #[command(name = "get-help")]
    GetHelp {
        /// Location acquisition timeout in seconds (overrides config).
        #[arg(short, long)]
        timeout: Option<u64>,
        /// Send without the confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Show partner, permission, and database status.
    Status,
    /// Database management commands.
    Db {
        #[command(subcommand)]
        action: commands::db::DbAction,
    },
}

#[tokio::main]
async fn main() -> ScResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = if let Some(path) = cli.config.as_deref() {
        AppConfig::load_from_file(std::path::Path::new(path))?
    } else {
        AppConfig::load_default()?
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    // Initialize logging
    let log_dir = config
        .effective_log_dir()
        .unwrap_or_else(|_| std::path::PathBuf::from("logs"));
    let _guard = logging::init_logging(&config.logging, &log_dir)?;

    info!("SafeCircle CLI v{}", constants::APP_VERSION);

    // Open the database
    let db_path = config.effective_db_path()?;
    let database = Database::init(&db_path, &config.database)?;

    let event_bus = EventBus::new(64);
    let config_handle = ConfigHandle::new(config);

    maybe_show_welcome(&database)?;

    // Dispatch to command handlers
    match cli.command {
        Commands::Partners { action } => {
            commands::partners::run(database, event_bus, action, cli.format).await
        }
        Commands::Message { action } => {
            commands::message::run(database, action, cli.format).await
        }
        Commands::GetHelp { timeout, yes } => {
            commands::get_help::run(config_handle, database, event_bus, timeout, yes, cli.format)
                .await
        }
        Commands::Status => {
            commands::status::run(config_handle, database, event_bus, cli.format).await
        }
        Commands::Db { action } => commands::db::run(database, action, cli.format).await,
    }
}

/// Print the one-time welcome explanation on first run.
fn maybe_show_welcome(database: &Database) -> ScResult<()> {
    let conn = database.conn()?;
    if Storage::get_bool(&conn, keys::WELCOME_SHOWN)?.unwrap_or(false) {
        return Ok(());
    }

    println!("{}", style("Welcome to Trust Partners!").bold());
    println!(
        "Add individuals you trust and set one as primary. The `get-help` command\n\
         will use the primary partner to send an emergency message with your location.\n"
    );

    Storage::set_bool(&conn, keys::WELCOME_SHOWN, true)
}
