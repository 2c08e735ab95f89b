//! Status command: partner summary, permission state, database stats.

use std::sync::Arc;

use console::style;

use sc_core::config::ConfigHandle;
use sc_core::constants::APP_VERSION;
use sc_core::error::ScResult;
use sc_core::platform::Platform;
use sc_models::Database;
use sc_services::event_bus::EventBus;
use sc_services::location::{LocationService, PermissionStatus};
use sc_services::partner::PartnerService;
use sc_services::service::Service;

use crate::providers::ConfigLocationProvider;
use crate::OutputFormat;

// Notice text shown while app-level location permission is unusable.
const DENIED_NOTICE: &str =
    "To include your location in emergency messages, please enable Location Services for this app in Settings. Location will not be sent until enabled.";
const RESTRICTED_NOTICE: &str =
    "Location services are restricted on this device (e.g., by Screen Time or parental controls) and cannot be enabled for this app at this time. Emergency messages will not include location.";

pub async fn run(
    config: ConfigHandle,
    database: Database,
    event_bus: EventBus,
    format: OutputFormat,
) -> ScResult<()> {
    let provider = {
        let cfg = config.read().await;
        ConfigLocationProvider::new(&cfg.location)
    };

    let mut partners = PartnerService::new(database.clone(), event_bus);
    partners.init()?;

    let mut location = LocationService::new(Arc::new(provider));
    location.init()?;

    let stats = database.stats()?;
    let permission = location.authorization_status();
    let primary = partners.primary_partner().map(|p| p.name.clone());
    let get_help_ready = partners.has_primary_selected();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "version": APP_VERSION,
                    "platform": Platform::current().name(),
                    "partner_count": partners.count(),
                    "primary_partner": primary,
                    "get_help_ready": get_help_ready,
                    "location_permission": permission.to_string(),
                    "database": {
                        "storage_entries": stats.storage_entries,
                        "schema_version": stats.schema_version,
                    },
                    "services": {
                        "partner": partners.state().to_string(),
                        "location": location.state().to_string(),
                    },
                })
            );
        }
        OutputFormat::Text => {
            println!(
                "{} v{} on {}",
                style("SafeCircle").bold(),
                APP_VERSION,
                Platform::current()
            );
            println!();

            println!("{}", style("Trust Partners").bold().underlined());
            println!("  partners        {}", partners.count());
            println!(
                "  primary         {}",
                primary.as_deref().unwrap_or("(none)")
            );
            println!(
                "  get-help ready  {}",
                if get_help_ready { "yes" } else { "no" }
            );
            println!();

            println!("{}", style("Location").bold().underlined());
            println!("  permission      {permission}");
            match permission {
                PermissionStatus::Denied => {
                    println!();
                    println!("  {}", style("Location Disabled").yellow().bold());
                    println!("  {DENIED_NOTICE}");
                }
                PermissionStatus::Restricted => {
                    println!();
                    println!("  {}", style("Location Restricted").red().bold());
                    println!("  {RESTRICTED_NOTICE}");
                }
                _ => {}
            }
            println!();

            println!("{}", style("Database").bold().underlined());
            println!("  storage entries {}", stats.storage_entries);
            println!("  schema version  {}", stats.schema_version);
            println!();

            println!("{}", style("Services").bold().underlined());
            println!("  partner         {}", partners.state());
            println!("  location        {}", location.state());
        }
    }

    Ok(())
}
