//! The "Get Help" command: compose and send the emergency message.

use std::sync::Arc;
use std::time::Duration;

use console::style;
use indicatif::ProgressBar;

use sc_core::config::ConfigHandle;
use sc_core::error::{ScError, ScResult};
use sc_models::Database;
use sc_services::event_bus::EventBus;
use sc_services::location::{LocationService, PermissionStatus};
use sc_services::message::{ComposeResult, MessageService};
use sc_services::partner::PartnerService;
use sc_services::service::Service;

use crate::providers::{ConfigLocationProvider, ConsoleComposer};
use crate::OutputFormat;

pub async fn run(
    config: ConfigHandle,
    database: Database,
    event_bus: EventBus,
    timeout_override: Option<u64>,
    yes: bool,
    format: OutputFormat,
) -> ScResult<()> {
    let (timeout, provider) = {
        let cfg = config.read().await;
        let timeout = Duration::from_secs(timeout_override.unwrap_or(cfg.location.timeout_secs));
        (timeout, ConfigLocationProvider::new(&cfg.location))
    };

    let mut partners = PartnerService::new(database.clone(), event_bus.clone());
    partners.init()?;

    let mut location = LocationService::new(Arc::new(provider));
    location.init()?;
    if location.authorization_status() == PermissionStatus::NotDetermined {
        location.request_permission();
    }

    let mut messages = MessageService::new(database, event_bus, location);
    messages.init()?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Preparing message...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    // The composer clears the spinner before it takes over the terminal.
    let composer = ConsoleComposer::new(yes, spinner.clone());

    match messages.get_help(&partners, &composer, timeout).await {
        Ok(result) => {
            spinner.finish_and_clear();
            report_result(result, format);
            Ok(())
        }
        Err(ScError::NoPrimaryPartner) => {
            spinner.finish_and_clear();
            println!(
                "{} No primary trust partner is selected.",
                style("ERROR").red().bold()
            );
            println!("  Add one with `safecircle partners add` and designate it with `safecircle partners set-primary`.");
            Ok(())
        }
        Err(ScError::CannotSendMessages) => {
            spinner.finish_and_clear();
            println!(
                "{} This device cannot send text messages.",
                style("ERROR").red().bold()
            );
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e)
        }
    }
}

fn report_result(result: ComposeResult, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "result": result.to_string() }));
        }
        OutputFormat::Text => match result {
            ComposeResult::Sent => {
                println!(
                    "{} Emergency message handed off to your primary partner.",
                    style("SENT").green().bold()
                );
            }
            ComposeResult::Cancelled => {
                println!("{} Message not sent.", style("CANCELLED").yellow().bold());
            }
            ComposeResult::Failed => {
                println!(
                    "{} The message could not be sent. Try again.",
                    style("FAILED").red().bold()
                );
            }
        },
    }
}
