//! Database management commands.

use clap::Subcommand;
use console::style;

use sc_core::error::{ScError, ScResult};
use sc_models::Database;

use crate::OutputFormat;

#[derive(Subcommand)]
pub enum DbAction {
    /// Show database statistics.
    Stats,
    /// Run a database integrity check.
    Check,
    /// Drop and recreate all tables. All data is lost.
    Reset {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(database: Database, action: DbAction, format: OutputFormat) -> ScResult<()> {
    match action {
        DbAction::Stats => {
            let stats = database.stats()?;
            match format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::json!({
                            "storage_entries": stats.storage_entries,
                            "schema_version": stats.schema_version,
                        })
                    );
                }
                OutputFormat::Text => {
                    println!("{stats}");
                }
            }
        }
        DbAction::Check => match database.run_integrity_check() {
            Ok(()) => println!("{} integrity check passed", style("OK").green().bold()),
            Err(ScError::IntegrityCheck(detail)) => {
                println!("{} integrity check failed: {detail}", style("ERROR").red().bold());
            }
            Err(e) => return Err(e),
        },
        DbAction::Reset { yes } => {
            if !yes {
                let confirmed = dialoguer::Confirm::new()
                    .with_prompt("Reset the database? All partners and settings will be lost.")
                    .default(false)
                    .interact()
                    .map_err(|e| ScError::Internal(e.to_string()))?;
                if !confirmed {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            database.reset()?;
            println!("{} database reset", style("OK").green().bold());
        }
    }

    Ok(())
}
