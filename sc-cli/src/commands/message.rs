//! Emergency message settings commands.

use clap::Subcommand;
use console::style;

use sc_core::constants::keys;
use sc_core::error::ScResult;
use sc_models::{Database, Storage};
use sc_services::message::{MessagePreferences, MessageService};

use crate::OutputFormat;

#[derive(Subcommand)]
pub enum MessageAction {
    /// Show the message settings and an outgoing message preview.
    Show,
    /// Enable or disable the custom message.
    UseCustom {
        /// true to use the custom message, false for the default template.
        enabled: bool,
    },
    /// Set the custom message text ({NAME} is replaced with the partner's name).
    SetText {
        /// The custom message text.
        text: String,
    },
    /// Enable or disable location sharing in the message.
    IncludeLocation {
        /// true to append the current location to the message.
        enabled: bool,
    },
}

pub async fn run(database: Database, action: MessageAction, format: OutputFormat) -> ScResult<()> {
    let conn = database.conn()?;

    match action {
        MessageAction::Show => {
            let prefs = MessagePreferences::resolve(&conn)?;
            let preview = MessageService::base_message(&prefs, "[Partner's Name]");

            match format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::json!({
                            "use_custom_message": prefs.use_custom_message,
                            "custom_message_text": prefs.custom_message_text,
                            "include_location": prefs.include_location,
                            "preview": preview,
                        })
                    );
                }
                OutputFormat::Text => {
                    println!("{}", style("Emergency Message Content").bold().underlined());
                    println!("  use_custom_message   {}", prefs.use_custom_message);
                    println!("  custom_message_text  {}", prefs.custom_message_text);
                    println!();
                    println!("{}", style("Location Sharing In Message").bold().underlined());
                    println!("  include_location     {}", prefs.include_location);
                    println!();
                    println!("{}", style("Outgoing message preview").bold().underlined());
                    println!("  {preview}");
                }
            }
        }
        MessageAction::UseCustom { enabled } => {
            Storage::set_bool(&conn, keys::USE_CUSTOM_MESSAGE, enabled)?;
            println!(
                "{} use_custom_message = {enabled}",
                style("SET").green().bold()
            );
        }
        MessageAction::SetText { text } => {
            Storage::set(&conn, keys::CUSTOM_MESSAGE_TEXT, &text)?;
            println!(
                "{} custom_message_text = {text}",
                style("SET").green().bold()
            );
        }
        MessageAction::IncludeLocation { enabled } => {
            Storage::set_bool(&conn, keys::INCLUDE_LOCATION, enabled)?;
            println!(
                "{} include_location = {enabled}",
                style("SET").green().bold()
            );
        }
    }

    Ok(())
}
