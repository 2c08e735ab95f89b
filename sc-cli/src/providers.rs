//! Terminal implementations of the platform collaborator traits.
//!
//! A desktop terminal has no GPS, contact picker, or SMS composer; these
//! stand-ins serve static coordinates from the config file, prompt on
//! stdin, and print the outgoing message to the console.

use async_trait::async_trait;
use console::style;
use indicatif::ProgressBar;
use tracing::info;

use sc_core::config::LocationConfig;
use sc_core::error::{LocationError, ScError, ScResult};
use sc_services::location::{GeoFix, LocationProvider, PermissionStatus};
use sc_services::message::{ComposeResult, MessageComposer};
use sc_services::partner::{ContactPicker, PickedContact};

/// Location provider serving the static coordinates from `[location]`.
///
/// Coordinates configured means the user granted this install access to
/// their location; unset coordinates report a not-determined status.
pub struct ConfigLocationProvider {
    fix: Option<GeoFix>,
}

impl ConfigLocationProvider {
    pub fn new(config: &LocationConfig) -> Self {
        let fix = match (config.latitude, config.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoFix {
                latitude,
                longitude,
            }),
            _ => None,
        };
        Self { fix }
    }
}

#[async_trait]
impl LocationProvider for ConfigLocationProvider {
    fn authorization_status(&self) -> PermissionStatus {
        if self.fix.is_some() {
            PermissionStatus::Authorized
        } else {
            PermissionStatus::NotDetermined
        }
    }

    fn request_permission(&self) {
        info!(
            "no static location configured; set location.latitude and \
             location.longitude in the config file to enable location sharing"
        );
    }

    async fn current_location(&self) -> Result<Option<GeoFix>, LocationError> {
        Ok(self.fix)
    }
}

/// Message composer that prints the outgoing message and asks to confirm.
pub struct ConsoleComposer {
    auto_confirm: bool,
    spinner: ProgressBar,
}

impl ConsoleComposer {
    pub fn new(auto_confirm: bool, spinner: ProgressBar) -> Self {
        Self {
            auto_confirm,
            spinner,
        }
    }
}

#[async_trait]
impl MessageComposer for ConsoleComposer {
    fn can_send_messages(&self) -> bool {
        true
    }

    async fn compose(&self, recipients: &[String], body: &str) -> ScResult<ComposeResult> {
        self.spinner.finish_and_clear();

        println!();
        println!("{}", style("Outgoing emergency message").bold().underlined());
        println!("  To: {}", recipients.join(", "));
        println!();
        for line in body.lines() {
            println!("  {line}");
        }
        println!();

        if self.auto_confirm {
            return Ok(ComposeResult::Sent);
        }

        let confirmed = dialoguer::Confirm::new()
            .with_prompt("Send this message?")
            .default(true)
            .interact()
            .map_err(|e| ScError::Internal(e.to_string()))?;

        Ok(if confirmed {
            ComposeResult::Sent
        } else {
            ComposeResult::Cancelled
        })
    }
}

/// Contact picker prompting for a name and phone number on stdin.
pub struct PromptContactPicker;

impl ContactPicker for PromptContactPicker {
    fn pick(&self) -> ScResult<Option<PickedContact>> {
        let name: String = dialoguer::Input::new()
            .with_prompt("Contact name (empty to cancel)")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| ScError::Internal(e.to_string()))?;
        if name.trim().is_empty() {
            return Ok(None);
        }

        let phone_number: String = dialoguer::Input::new()
            .with_prompt("Phone number")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| ScError::Internal(e.to_string()))?;
        if phone_number.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(PickedContact {
            name: name.trim().to_string(),
            phone_number,
        }))
    }
}
